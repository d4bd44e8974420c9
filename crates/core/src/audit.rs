//! Audit trail for analysis runs

use crate::graph::SystemModel;
use crate::threat::{Threat, ThreatSummary};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::info;

/// One auditable action with its sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub action: String,
    pub inputs: Vec<String>,
    pub components: usize,
    pub datastores: usize,
    pub dataflows: usize,
    pub threats: usize,
    pub max_score: f64,
}

impl AuditEvent {
    pub fn analysis(model: &SystemModel, threats: &[Threat], inputs: &[String]) -> Self {
        Self {
            action: "analyze".to_string(),
            inputs: inputs.to_vec(),
            components: model.components().len(),
            datastores: model.datastores().len(),
            dataflows: model.dataflows().len(),
            threats: threats.len(),
            max_score: ThreatSummary::from_threats(threats).max_score,
        }
    }
}

/// Receiver of audit events
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

/// Emits every event as a structured `tracing` event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        info!(
            target: "threatmap::audit",
            action = %event.action,
            inputs = ?event.inputs,
            components = event.components,
            datastores = event.datastores,
            dataflows = event.dataflows,
            threats = event.threats,
            max_score = event.max_score,
            "audit"
        );
    }
}

/// Keeps events in memory
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events, oldest first
    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event.clone());
    }
}
