//! Report sink: persists a finished analysis into the output directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use threatmap_core::render::to_dot;
use threatmap_core::Analysis;

pub const REPORT_FILE: &str = "threat_report.json";
pub const DIAGRAM_FILE: &str = "annotated_diagram.dot";

/// Where the report files were written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub report: PathBuf,
    pub diagram: PathBuf,
}

/// Write the ranked threat list as JSON and the annotated graph as DOT.
pub fn write_reports(out_dir: &Path, analysis: &Analysis) -> Result<ReportPaths> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir {}", out_dir.display()))?;

    let report = out_dir.join(REPORT_FILE);
    let json = serde_json::to_string_pretty(&analysis.threats)?;
    std::fs::write(&report, json).with_context(|| format!("write {}", report.display()))?;

    let diagram = out_dir.join(DIAGRAM_FILE);
    let dot = to_dot(&analysis.model, &analysis.threats);
    std::fs::write(&diagram, dot).with_context(|| format!("write {}", diagram.display()))?;

    Ok(ReportPaths { report, diagram })
}
