//! Threatmap Core - architecture ingestion and STRIDE/DREAD threat scoring
//!
//! This crate provides the analysis infrastructure for Threatmap:
//! - Adapters from diagrams, PlantUML, OpenAPI, infra templates and Python
//!   source into one system model
//! - Deterministic merging of model fragments
//! - STRIDE enumeration with weighted DREAD scoring and mitigations
//! - DOT/Mermaid export of the annotated model

pub mod analysis;
pub mod audit;
pub mod config;
pub mod engine;
pub mod graph;
pub mod parser;
pub mod render;
pub mod threat;

pub use analysis::{Analysis, ThreatPipeline};
pub use audit::{AuditEvent, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use config::{ConfigError, DanglingPolicy, EngineConfig, ThreatmapConfig};
pub use engine::{StrideCategory, ThreatEngine};
pub use graph::{Component, DataFlow, DataStore, ModelNode, NameIndex, SystemModel};
pub use parser::{FormatParser, InputFormat, InputSpec, ParseError, ParserDispatcher};
pub use threat::{DreadSubscores, Threat, ThreatSummary};

/// Threatmap version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
