//! Tests for multi-input ingestion, the analysis pipeline and graph export

use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use threatmap_core::graph::ModelNode;
use threatmap_core::render::{to_dot, to_mermaid};
use threatmap_core::{
    DanglingPolicy, InputFormat, InputSpec, MemoryAuditSink, ParseError, ParserDispatcher,
    ThreatEngine, ThreatPipeline, ThreatmapConfig,
};

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Five artifacts, one per adapter
fn fixture_inputs(dir: &Path) -> Vec<InputSpec> {
    let dsl = write(dir, "design.puml", "package Web\nclass Server\nentity DB\nServer --> DB\n");
    let api = write(
        dir,
        "api.yaml",
        "paths:\n  /u:\n    get:\n      responses:\n        '200':\n          content:\n            application/json:\n              schema:\n                $ref: '#/components/schemas/User'\ncomponents:\n  schemas:\n    User: {}\n",
    );
    let tf = write(
        dir,
        "main.tf",
        "resource \"aws_s3_bucket\" \"assets\" {}\nresource \"aws_instance\" \"web\" {}\n",
    );
    let py = write(dir, "app.py", "class UserModel:\n    def save(self):\n        db.commit()\n");
    let drawio = write(
        dir,
        "arch.drawio",
        r#"<mxGraphModel><root><mxCell id="c" value="Edge" style="rounded=1;" vertex="1"/></root></mxGraphModel>"#,
    );

    vec![
        InputSpec::new(dsl, None),
        InputSpec::new(api, Some(InputFormat::ApiDescriptor)),
        InputSpec::new(tf, None),
        InputSpec::new(py, None),
        InputSpec::new(drawio, None),
    ]
}

#[test]
fn test_parallel_ingest_merges_in_input_order() {
    let dir = TempDir::new().unwrap();
    let inputs = fixture_inputs(dir.path());
    let dispatcher = ParserDispatcher::new();

    let (model, errors) = dispatcher.ingest_all(&inputs);
    assert!(errors.is_empty(), "{errors:?}");

    let components: Vec<&str> = model.components().iter().map(|c| c.id()).collect();
    assert_eq!(
        components,
        vec!["Server", "APIService", "assets", "web", "UserModel", "UserModel.save", "Edge"]
    );
    let stores: Vec<&str> = model.datastores().iter().map(|d| d.id()).collect();
    assert_eq!(stores, vec!["DB", "User", "assets", "UserModel"]);

    // Sequential ingestion in the same order produces the same aggregate
    let mut sequential = threatmap_core::SystemModel::new();
    for input in &inputs {
        sequential.merge(dispatcher.ingest(input).unwrap());
    }
    assert_eq!(model, sequential);
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = TempDir::new().unwrap();
    let inputs = fixture_inputs(dir.path());
    let pipeline = ThreatPipeline::from_config(&ThreatmapConfig::default()).unwrap();

    let first = serde_json::to_string(&pipeline.run(&inputs).threats).unwrap();
    for _ in 0..5 {
        let again = serde_json::to_string(&pipeline.run(&inputs).threats).unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn test_failed_input_is_skipped_or_fatal() {
    let dir = TempDir::new().unwrap();
    let good = write(dir.path(), "ok.puml", "class A\n");
    let bad = write(dir.path(), "broken.py", "def broken(:\n");
    let inputs = vec![InputSpec::new(good, None), InputSpec::new(bad, None)];

    let pipeline = ThreatPipeline::from_config(&ThreatmapConfig::default()).unwrap();
    let analysis = pipeline.run(&inputs);
    assert_eq!(analysis.skipped.len(), 1);
    assert!(analysis.skipped[0].contains("broken.py"));
    assert_eq!(analysis.threats.len(), 6);

    assert!(matches!(
        pipeline.run_strict(&inputs),
        Err(ParseError::Syntax { .. })
    ));
}

#[test]
fn test_ambiguous_extension_without_format() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "thing.yaml", "Resources: {}\n");
    let err = ParserDispatcher::new()
        .ingest(&InputSpec::new(path, None))
        .unwrap_err();
    assert!(matches!(err, ParseError::UnknownFormat(_)));
}

#[test]
fn test_pipeline_drop_policy_and_audit() {
    let dir = TempDir::new().unwrap();
    let py = write(dir.path(), "svc.py", "def handler():\n    print('x')\n");
    let inputs = vec![InputSpec::new(py.clone(), None)];

    let sink = Arc::new(MemoryAuditSink::new());
    let mut config = ThreatmapConfig::default();
    config.ingest.dangling_flows = DanglingPolicy::Drop;
    let pipeline = ThreatPipeline::from_config(&config)
        .unwrap()
        .with_audit_sink(sink.clone());

    let analysis = pipeline.run(&inputs);
    assert!(analysis.model.dataflows().is_empty());
    assert_eq!(analysis.threats.len(), 6);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, "analyze");
    assert_eq!(events[0].inputs, vec![py.display().to_string()]);
    assert_eq!(events[0].dataflows, 0);
}

#[test]
fn test_render_highlights_scored_elements() {
    let model = threatmap_core::parser::dsl::DslParser::parse_text(
        "class Web\nentity DB\nWeb --> DB\nWeb --> Cache\n",
    );
    let threats = ThreatEngine::new().analyze(&model);

    let dot = to_dot(&model, &threats);
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("\"Web\" [shape=box, style=\"rounded,filled\", fillcolor=\"#ef4444\"]"));
    // DB is a data store and not scored by default
    assert!(dot.contains("\"DB\" [shape=cylinder, style=filled, fillcolor=\"#e5e7eb\"]"));
    assert!(dot.contains("\"Cache\" [shape=box, style=dashed]"));
    assert!(dot.contains("\"Web\" -> \"Cache\" [label=\"flow_Web_to_Cache\", color=\"#ef4444\""));

    // Web, DB, then the Cache placeholder
    let mermaid = to_mermaid(&model, &threats);
    assert!(mermaid.contains("n0 -->|\"flow_Web_to_DB\"| n1"));
    assert!(mermaid.contains("style n0 fill:#ef4444"));
    assert!(mermaid.contains("style n2 stroke-dasharray:5 5"));
    assert!(mermaid.contains("linkStyle 0,1 stroke:#ef4444"));
}

#[test]
fn test_pipeline_dispatcher_uses_configured_hints() {
    let dir = TempDir::new().unwrap();
    let py = write(dir.path(), "repo.py", "class UserRepo:\n    pass\n\nclass UserModel:\n    pass\n");

    let mut config = ThreatmapConfig::default();
    config.ingest.datastore_name_hints = vec!["Repo".to_string()];
    let pipeline = ThreatPipeline::from_config(&config).unwrap();

    let model = pipeline.dispatcher().ingest(&InputSpec::new(py, None)).unwrap();
    let stores: Vec<&str> = model.datastores().iter().map(|d| d.id()).collect();
    assert_eq!(stores, vec!["UserRepo"]);
    assert_eq!(model.components().len(), 2);
}
