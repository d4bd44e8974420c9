//! Parse command: ingest artifacts and show what each adapter extracted

use anyhow::Result;
use colored::Colorize;
use threatmap_core::graph::ModelNode;
use threatmap_core::render::{to_dot, to_mermaid};
use threatmap_core::{InputSpec, SystemModel, ThreatPipeline};

use super::{load_config, resolve_format, Format};
use crate::output::json::JsonModel;
use crate::GraphFormat;

pub fn run(inputs: &[InputSpec], graph: Option<GraphFormat>, cli: &crate::Cli) -> Result<()> {
    let config = load_config(cli)?;
    let format = resolve_format(cli, &config);
    let pipeline = ThreatPipeline::from_config(&config)?;
    let dispatcher = pipeline.dispatcher();

    // Ingest one at a time so each fragment can be listed on its own
    let mut aggregate = SystemModel::new();
    for input in inputs {
        match dispatcher.ingest(input) {
            Ok(fragment) => {
                if format == Format::Terminal && graph.is_none() {
                    print_fragment(input, &fragment);
                }
                aggregate.merge(fragment);
            }
            Err(e) => eprintln!("  {}: {}: {}", "error".red(), input.path.display(), e),
        }
    }
    let aggregate = config.ingest.dangling_flows.apply(aggregate);

    match (graph, format) {
        (Some(GraphFormat::Dot), _) => println!("{}", to_dot(&aggregate, &[])),
        (Some(GraphFormat::Mermaid), _) => println!("{}", to_mermaid(&aggregate, &[])),
        (None, Format::Json) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&JsonModel::from_model(aggregate))?
            );
        }
        (None, Format::Terminal) => print_aggregate(&aggregate),
    }

    Ok(())
}

fn print_fragment(input: &InputSpec, fragment: &SystemModel) {
    println!("{}", format!("  {}", input.path.display()).bold());
    for component in fragment.components() {
        println!("    {} {}", "component".cyan(), describe(component));
    }
    for store in fragment.datastores() {
        println!("    {} {}", "datastore".magenta(), describe(store));
    }
    for flow in fragment.dataflows() {
        println!("    {} {} → {}", "dataflow".blue(), flow.source(), flow.target());
    }
    println!();
}

fn describe(node: &dyn ModelNode) -> String {
    match node.boundary() {
        Some(boundary) => format!("{} ({}, boundary {})", node.id(), node.kind(), boundary),
        None => format!("{} ({})", node.id(), node.kind()),
    }
}

fn print_aggregate(model: &SystemModel) {
    let index = model.name_index();
    println!("  {}", "\u{2500}".repeat(60).dimmed());
    println!(
        "  {} component(s) \u{00b7} {} datastore(s) \u{00b7} {} dataflow(s)",
        model.components().len(),
        model.datastores().len(),
        model.dataflows().len()
    );

    let dangling = index.dangling_flow_positions().len();
    if dangling > 0 {
        println!(
            "  {}",
            format!("{} flow(s) reference unknown nodes", dangling).yellow()
        );
    }
    let duplicates = index.duplicate_names();
    if !duplicates.is_empty() {
        println!(
            "  {}",
            format!("names declared more than once: {}", duplicates.join(", ")).dimmed()
        );
    }
}
