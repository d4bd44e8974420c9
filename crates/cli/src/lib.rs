//! Threatmap CLI library, exposed for integration tests

pub mod commands;
pub mod output;
pub mod report;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use threatmap_core::InputSpec;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "threatmap")]
#[command(about = "STRIDE/DREAD threat modeling from architecture artifacts", long_about = None)]
#[command(version = threatmap_core::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Config file (default: nearest .threatmap.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest artifacts, score threats and write the report
    Analyze {
        /// Input as `[format:]path`; formats: diagram, dsl, openapi, iac, source
        #[arg(short, long = "input", required = true)]
        inputs: Vec<InputSpec>,

        /// Output directory for threat_report.json and annotated_diagram.dot
        #[arg(long)]
        out: Option<PathBuf>,

        /// Exit with code 2 when any threat scores at or above this value
        #[arg(long)]
        min_score: Option<f64>,

        /// Abort on the first input that fails to parse
        #[arg(long)]
        strict: bool,
    },

    /// Ingest artifacts and print the merged model
    Parse {
        /// Input as `[format:]path`
        #[arg(short, long = "input", required = true)]
        inputs: Vec<InputSpec>,

        /// Print the merged model as a graph instead of a listing
        #[arg(long, value_enum)]
        graph: Option<GraphFormat>,
    },

    /// Initialize .threatmap.toml configuration
    Init {
        /// Path to initialize (default: current directory)
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GraphFormat {
    Dot,
    Mermaid,
}

/// Install the global subscriber; logs go to stderr so JSON output stays clean
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "threatmap_core=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
