//! STRIDE/DREAD threat scoring engine
//!
//! Each component is checked against the STRIDE categories that apply to
//! its kind and every data flow gets one fixed information-disclosure
//! threat. Scores are the weighted DREAD mean; the list is ranked highest
//! first and ties keep their generation order.

pub mod dread;
pub mod mitigation;
pub mod stride;

pub use dread::{BaseScores, DreadWeights};
pub use mitigation::suggest_mitigation;
pub use stride::StrideCategory;

use crate::audit::{AuditEvent, AuditSink};
use crate::config::{ConfigError, EngineConfig};
use crate::graph::{DataFlow, ModelNode, SystemModel, DATASTORE_KIND};
use crate::threat::Threat;
use mitigation::{DATAFLOW_KIND, FLOW_MITIGATION};
use std::sync::Arc;
use tracing::{debug, info};

/// Scores a [`SystemModel`] into a ranked threat list
pub struct ThreatEngine {
    config: EngineConfig,
    audit: Option<Arc<dyn AuditSink>>,
}

impl ThreatEngine {
    /// Engine with the default weights, base scores and no templates
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            audit: None,
        }
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            audit: None,
        })
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score every element and rank the result
    pub fn analyze(&self, model: &SystemModel) -> Vec<Threat> {
        self.analyze_inputs(model, &[])
    }

    /// Like [`analyze`](Self::analyze), naming the inputs in the audit record
    pub fn analyze_inputs(&self, model: &SystemModel, inputs: &[String]) -> Vec<Threat> {
        let mut threats = Vec::new();

        for component in model.components() {
            threats.extend(self.score_node(component, component.kind()));
        }
        if self.config.score_datastores {
            for store in model.datastores() {
                threats.extend(self.score_node(store, DATASTORE_KIND));
            }
        }
        for flow in model.dataflows() {
            threats.push(self.score_flow(flow));
        }

        // sort_by is stable, so equal scores keep generation order
        threats.sort_by(|a, b| b.dread_score.total_cmp(&a.dread_score));

        info!(
            components = model.components().len(),
            dataflows = model.dataflows().len(),
            threats = threats.len(),
            "threat analysis complete"
        );
        if let Some(sink) = &self.audit {
            sink.record(&AuditEvent::analysis(model, &threats, inputs));
        }

        threats
    }

    /// One threat per applicable category. `mitigation_kind` selects the
    /// mitigation row and may differ from the node's own kind.
    pub fn score_node(&self, node: &dyn ModelNode, mitigation_kind: &str) -> Vec<Threat> {
        let categories = self.config.categories_for(node.kind());
        debug!(id = node.id(), kind = node.kind(), categories = categories.len(), "scoring node");

        categories
            .iter()
            .map(|&category| {
                let base = self.config.base_scores.base(category);
                let subscores = dread::node_subscores(base, node.kind());
                Threat {
                    component: node.id().to_string(),
                    component_type: node.kind().to_string(),
                    category,
                    dread_score: self.config.weights.composite(&subscores),
                    dread_subscores: subscores,
                    mitigation: suggest_mitigation(category, mitigation_kind, node.id()),
                }
            })
            .collect()
    }

    pub fn score_flow(&self, flow: &DataFlow) -> Threat {
        let subscores = dread::flow_subscores();
        Threat {
            component: flow.flow_id(),
            component_type: DATAFLOW_KIND.to_string(),
            category: StrideCategory::InformationDisclosure,
            dread_score: self.config.weights.composite(&subscores),
            dread_subscores: subscores,
            mitigation: FLOW_MITIGATION.to_string(),
        }
    }
}

impl Default for ThreatEngine {
    fn default() -> Self {
        Self::new()
    }
}
