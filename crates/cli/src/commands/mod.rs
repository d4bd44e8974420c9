//! CLI commands

pub mod analyze;
pub mod init;
pub mod parse;

use anyhow::Result;
use std::path::Path;
use threatmap_core::ThreatmapConfig;

/// Explicit `--config` file, else the nearest .threatmap.toml, else defaults
pub fn load_config(cli: &crate::Cli) -> Result<ThreatmapConfig> {
    match &cli.config {
        Some(path) => ThreatmapConfig::from_file(path),
        None => ThreatmapConfig::find_and_load(Path::new(".")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Terminal,
    Json,
}

pub fn resolve_format(cli: &crate::Cli, config: &ThreatmapConfig) -> Format {
    if let Some(f) = cli.format {
        return match f {
            crate::OutputFormat::Json => Format::Json,
            crate::OutputFormat::Terminal => Format::Terminal,
        };
    }
    match config.output.format.as_str() {
        "json" => Format::Json,
        _ => Format::Terminal,
    }
}
