//! Data flow edges for the system model

use serde::{Deserialize, Serialize};

/// A directed data flow between two node names.
///
/// Endpoints are plain names resolved by string match when the model is
/// consumed, never by reference. A flow may point at a name that no node
/// carries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataFlow {
    source: String,
    target: String,
}

impl DataFlow {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Synthesized identifier used in threat records and diagram labels
    pub fn flow_id(&self) -> String {
        format!("flow_{}_to_{}", self.source, self.target)
    }
}
