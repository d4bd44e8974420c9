//! JSON output formatting

use serde::{Deserialize, Serialize};
use threatmap_core::{SystemModel, Threat, ThreatSummary};

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput {
    pub threats: Vec<Threat>,
    pub summary: ThreatSummary,
    /// Inputs that failed to parse, as `path: error`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonModel {
    pub model: SystemModel,
    pub dangling_flows: usize,
    pub duplicate_names: Vec<String>,
}

impl JsonModel {
    pub fn from_model(model: SystemModel) -> Self {
        let index = model.name_index();
        let dangling_flows = index.dangling_flow_positions().len();
        let duplicate_names = index
            .duplicate_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            model,
            dangling_flows,
            duplicate_names,
        }
    }
}
