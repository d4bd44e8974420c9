//! Analyze command: wires ingestion, scoring and the report sink together

use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use threatmap_core::{Analysis, InputSpec, ThreatPipeline, TracingAuditSink};

use super::{load_config, resolve_format, Format};
use crate::output;
use crate::report::{write_reports, ReportPaths};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeExitCode {
    Success,
    ThresholdExceeded,
}

pub struct AnalyzeOptions<'a> {
    pub inputs: &'a [InputSpec],
    pub out: Option<&'a Path>,
    pub min_score: Option<f64>,
    pub strict: bool,
}

pub fn run(opts: &AnalyzeOptions<'_>, cli: &crate::Cli) -> Result<AnalyzeExitCode> {
    let start = Instant::now();

    // ── 1. Config ────────────────────────────────────────────────
    let config = load_config(cli)?;
    let format = resolve_format(cli, &config);
    let min_score = opts.min_score.unwrap_or(config.output.min_score);
    let out_dir = opts
        .out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.output.dir));

    let pipeline = ThreatPipeline::from_config(&config)?.with_audit_sink(Arc::new(TracingAuditSink));

    if format == Format::Terminal {
        println!(
            "{}",
            format!("  threatmap v{} - analyzing {} input(s)", threatmap_core::VERSION, opts.inputs.len())
                .bold()
        );
        println!();
    }

    // ── 2. Ingest + score ────────────────────────────────────────
    let analysis = if opts.strict {
        pipeline.run_strict(opts.inputs)?
    } else {
        pipeline.run(opts.inputs)
    };

    // ── 3. Report sink ───────────────────────────────────────────
    let paths = write_reports(&out_dir, &analysis)?;

    // ── 4. Output ────────────────────────────────────────────────
    match format {
        Format::Json => print_json(&analysis)?,
        Format::Terminal => print_terminal(&analysis, &paths, start),
    }

    if analysis.summary.exceeds_threshold(min_score) {
        if format == Format::Terminal {
            println!(
                "  {}",
                format!(
                    "max score {:.2} reaches --min-score {:.2}",
                    analysis.summary.max_score, min_score
                )
                .red()
            );
        }
        return Ok(AnalyzeExitCode::ThresholdExceeded);
    }
    Ok(AnalyzeExitCode::Success)
}

fn print_terminal(analysis: &Analysis, paths: &ReportPaths, start: Instant) {
    for skipped in &analysis.skipped {
        println!("  {}: {}", "skipped".yellow(), skipped);
    }
    if !analysis.skipped.is_empty() {
        println!();
    }

    if analysis.threats.is_empty() {
        println!("  {}", "No components or flows to score.".dimmed());
    }
    for threat in &analysis.threats {
        println!("{}", output::terminal::format_threat(threat));
    }
    if !analysis.threats.is_empty() {
        println!();
    }

    println!("  {}", "\u{2500}".repeat(60).dimmed());
    for line in output::terminal::format_summary(&analysis.summary) {
        println!("{}", line);
    }
    println!("  Report: {}", paths.report.display());
    println!("  Diagram: {}", paths.diagram.display());
    println!("  Time: {:.1}s", start.elapsed().as_secs_f64());
}

fn print_json(analysis: &Analysis) -> Result<()> {
    let out = output::json::JsonOutput {
        threats: analysis.threats.clone(),
        summary: analysis.summary.clone(),
        skipped: analysis.skipped.clone(),
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
