//! Write a starter .threatmap.toml

use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};
use threatmap_core::config::CONFIG_FILE_NAME;
use threatmap_core::ThreatmapConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Created(PathBuf),
    /// An existing file is never overwritten
    AlreadyExists(PathBuf),
}

pub fn run(path: Option<&Path>) -> Result<InitOutcome> {
    let config_path = path.unwrap_or_else(|| Path::new(".")).join(CONFIG_FILE_NAME);

    if config_path.exists() {
        println!(
            "  {} {} is already present, leaving it untouched",
            "skip".yellow(),
            config_path.display()
        );
        return Ok(InitOutcome::AlreadyExists(config_path));
    }

    let config = ThreatmapConfig::default();
    config.save(&config_path)?;

    println!("  {} {}", "created".green(), config_path.display());
    println!();
    for line in next_steps(&config) {
        println!("  {}", line);
    }

    Ok(InitOutcome::Created(config_path))
}

/// Short walkthrough printed after the file is written
pub fn next_steps(config: &ThreatmapConfig) -> Vec<String> {
    vec![
        "Tune [engine.weights] or map element kinds to STRIDE subsets in [engine.templates].".to_string(),
        "Check what each artifact contributes:".to_string(),
        "    threatmap parse -i architecture.drawio -i openapi:api.yaml".to_string(),
        "Score the merged model:".to_string(),
        "    threatmap analyze -i architecture.drawio -i iac:stack.yaml -i app.py".to_string(),
        format!(
            "Reports land in {}/ (threat_report.json, annotated_diagram.dot).",
            config.output.dir
        ),
        "Gate CI with --min-score or [output].min_score; a breach exits with code 2.".to_string(),
    ]
}
