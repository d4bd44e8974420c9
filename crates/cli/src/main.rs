//! Threatmap CLI - threat modeling from architecture artifacts

use anyhow::Result;
use clap::Parser;
use threatmap_cli::commands::{self, analyze::AnalyzeExitCode};
use threatmap_cli::{init_tracing, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Analyze {
            inputs,
            out,
            min_score,
            strict,
        } => {
            let opts = commands::analyze::AnalyzeOptions {
                inputs,
                out: out.as_deref(),
                min_score: *min_score,
                strict: *strict,
            };
            if commands::analyze::run(&opts, &cli)? == AnalyzeExitCode::ThresholdExceeded {
                std::process::exit(2);
            }
        }
        Commands::Parse { inputs, graph } => {
            commands::parse::run(inputs, *graph, &cli)?;
        }
        Commands::Init { path } => {
            commands::init::run(path.as_deref())?;
        }
    }

    Ok(())
}
