//! End-to-end run: ingest inputs, apply the dangling-flow policy, score

use crate::audit::AuditSink;
use crate::config::{ConfigError, DanglingPolicy, ThreatmapConfig};
use crate::engine::ThreatEngine;
use crate::graph::SystemModel;
use crate::parser::{InputSpec, ParseError, ParserDispatcher};
use crate::threat::{Threat, ThreatSummary};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Aggregate model after the dangling-flow policy
    pub model: SystemModel,
    pub threats: Vec<Threat>,
    pub summary: ThreatSummary,
    /// `path: error` for every input that failed to parse
    pub skipped: Vec<String>,
}

/// Configured ingestion plus scoring
pub struct ThreatPipeline {
    dispatcher: ParserDispatcher,
    engine: ThreatEngine,
    dangling: DanglingPolicy,
}

impl ThreatPipeline {
    pub fn from_config(config: &ThreatmapConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            dispatcher: ParserDispatcher::with_datastore_hints(
                config.ingest.datastore_name_hints.clone(),
            ),
            engine: ThreatEngine::with_config(config.engine.clone())?,
            dangling: config.ingest.dangling_flows,
        })
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.engine = self.engine.with_audit_sink(sink);
        self
    }

    pub fn dispatcher(&self) -> &ParserDispatcher {
        &self.dispatcher
    }

    /// Ingest every input, skipping the ones that fail
    pub fn run(&self, inputs: &[InputSpec]) -> Analysis {
        let (model, skipped) = self.dispatcher.ingest_all(inputs);
        for failure in &skipped {
            warn!(error = %failure, "input skipped");
        }
        let mut analysis = self.analyze_model(model, &input_names(inputs));
        analysis.skipped = skipped;
        analysis
    }

    /// Ingest every input; the first failure aborts the run
    pub fn run_strict(&self, inputs: &[InputSpec]) -> Result<Analysis, ParseError> {
        let model = self.dispatcher.ingest_all_strict(inputs)?;
        Ok(self.analyze_model(model, &input_names(inputs)))
    }

    /// Apply the dangling-flow policy to an already-built model and score it
    pub fn analyze_model(&self, model: SystemModel, inputs: &[String]) -> Analysis {
        let before = model.dataflows().len();
        let model = self.dangling.apply(model);
        if model.dataflows().len() != before {
            info!(
                dropped = before - model.dataflows().len(),
                "dangling flows dropped"
            );
        }

        let threats = self.engine.analyze_inputs(&model, inputs);
        let summary = ThreatSummary::from_threats(&threats);
        Analysis {
            model,
            threats,
            summary,
            skipped: Vec::new(),
        }
    }
}

fn input_names(inputs: &[InputSpec]) -> Vec<String> {
    inputs
        .iter()
        .map(|input| input.path.display().to_string())
        .collect()
}
