use clap::Parser;
use std::path::PathBuf;
use tempfile::TempDir;
use threatmap_cli::commands::init::{self, InitOutcome};
use threatmap_cli::output::json::JsonModel;
use threatmap_cli::output::terminal::{format_summary, risk_icon};
use threatmap_cli::report::{write_reports, DIAGRAM_FILE, REPORT_FILE};
use threatmap_cli::{Cli, Commands, GraphFormat, OutputFormat};
use threatmap_core::config::CONFIG_FILE_NAME;
use threatmap_core::graph::{Component, DataFlow};
use threatmap_core::{InputFormat, SystemModel, Threat, ThreatPipeline, ThreatmapConfig};

#[test]
fn test_analyze_args() {
    let cli = Cli::try_parse_from([
        "threatmap",
        "analyze",
        "-i",
        "openapi:specs/api.yaml",
        "--input",
        "design.puml",
        "--min-score",
        "5.5",
        "--out",
        "reports",
        "--format",
        "json",
    ])
    .unwrap();

    assert_eq!(cli.format, Some(OutputFormat::Json));
    match cli.command {
        Commands::Analyze {
            inputs,
            out,
            min_score,
            strict,
        } => {
            assert_eq!(inputs.len(), 2);
            assert_eq!(inputs[0].format, Some(InputFormat::ApiDescriptor));
            assert_eq!(inputs[0].path, PathBuf::from("specs/api.yaml"));
            assert_eq!(inputs[1].format, None);
            assert_eq!(out, Some(PathBuf::from("reports")));
            assert_eq!(min_score, Some(5.5));
            assert!(!strict);
        }
        _ => panic!("expected analyze"),
    }
}

#[test]
fn test_analyze_requires_input() {
    assert!(Cli::try_parse_from(["threatmap", "analyze"]).is_err());
}

#[test]
fn test_parse_graph_flag() {
    let cli =
        Cli::try_parse_from(["threatmap", "parse", "-i", "arch.drawio", "--graph", "mermaid"])
            .unwrap();
    match cli.command {
        Commands::Parse { inputs, graph } => {
            assert_eq!(inputs[0].format, None);
            assert_eq!(graph, Some(GraphFormat::Mermaid));
        }
        _ => panic!("expected parse"),
    }
}

#[test]
fn test_report_files_written() {
    let dir = TempDir::new().unwrap();
    let mut model = SystemModel::new();
    model.add_component(Component::new("Gateway", "api"));
    model.add_dataflow(DataFlow::new("Gateway", "Orders"));

    let pipeline = ThreatPipeline::from_config(&ThreatmapConfig::default()).unwrap();
    let analysis = pipeline.analyze_model(model, &[]);

    let out = dir.path().join("out");
    let paths = write_reports(&out, &analysis).unwrap();
    assert_eq!(paths.report, out.join(REPORT_FILE));
    assert_eq!(paths.diagram, out.join(DIAGRAM_FILE));

    let json = std::fs::read_to_string(&paths.report).unwrap();
    let threats: Vec<Threat> = serde_json::from_str(&json).unwrap();
    assert_eq!(threats, analysis.threats);
    assert_eq!(threats.len(), 7);

    let dot = std::fs::read_to_string(&paths.diagram).unwrap();
    assert!(dot.contains("\"Orders\" [shape=box, style=dashed]"));
}

#[test]
fn test_summary_lines() {
    let mut model = SystemModel::new();
    model.add_component(Component::new("Gateway", "api"));
    let pipeline = ThreatPipeline::from_config(&ThreatmapConfig::default()).unwrap();
    let analysis = pipeline.analyze_model(model, &[]);

    let lines = format_summary(&analysis.summary);
    assert!(lines[0].contains("6 threat(s)"));
    assert!(lines[0].contains("max score 5.60"));
    assert!(lines[2].contains("S:1"));
    assert_eq!(risk_icon(5.6), "❌");
    assert_eq!(risk_icon(3.2), "ℹ️ ");
}

#[test]
fn test_json_model_flags_dangling_and_duplicates() {
    let mut model = SystemModel::new();
    model.add_component(Component::new("User", "class"));
    model.add_component(Component::new("User", "actor"));
    model.add_dataflow(DataFlow::new("User", "print"));

    let json = serde_json::to_value(JsonModel::from_model(model)).unwrap();
    assert_eq!(json["dangling_flows"], 1);
    assert_eq!(json["duplicate_names"][0], "User");
    assert_eq!(json["model"]["components"][1]["type"], "actor");
}

#[test]
fn test_init_writes_once() {
    let dir = TempDir::new().unwrap();
    let expected = dir.path().join(CONFIG_FILE_NAME);

    let first = init::run(Some(dir.path())).unwrap();
    assert_eq!(first, InitOutcome::Created(expected.clone()));
    let written = ThreatmapConfig::from_file(&expected).unwrap();
    assert_eq!(written, ThreatmapConfig::default());

    std::fs::write(&expected, "[output]\nmin_score = 7.0\n").unwrap();
    let second = init::run(Some(dir.path())).unwrap();
    assert_eq!(second, InitOutcome::AlreadyExists(expected.clone()));
    let kept = std::fs::read_to_string(&expected).unwrap();
    assert!(kept.contains("min_score = 7.0"));
}

#[test]
fn test_init_next_steps_use_output_dir() {
    let mut config = ThreatmapConfig::default();
    config.output.dir = "reports".to_string();
    let steps = init::next_steps(&config);
    assert!(steps.iter().any(|line| line.contains("reports/")));
    assert!(steps.iter().any(|line| line.contains("threatmap analyze -i")));
}
