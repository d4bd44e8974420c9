//! Configuration file parsing for .threatmap.toml

use crate::engine::dread::{BaseScores, DreadWeights};
use crate::engine::StrideCategory;
use crate::graph::SystemModel;
use crate::parser::python::default_datastore_hints;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// File name searched for by [`ThreatmapConfig::find_and_load`]
pub const CONFIG_FILE_NAME: &str = ".threatmap.toml";

/// Rejected engine settings
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("DREAD weights must be finite, non-negative and not all zero")]
    InvalidWeights,

    #[error("base score for {0} must be within 0..=10")]
    InvalidBaseScore(StrideCategory),

    #[error("template for kind '{0}' lists no categories")]
    EmptyTemplate(String),
}

/// Main configuration structure for .threatmap.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatmapConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Also run STRIDE over data stores (components only by default)
    #[serde(default)]
    pub score_datastores: bool,

    #[serde(default)]
    pub weights: DreadWeights,

    #[serde(default)]
    pub base_scores: BaseScores,

    /// Per-kind category subsets; kinds not listed get all six
    #[serde(default)]
    pub templates: BTreeMap<String, Vec<StrideCategory>>,
}

/// What to do with flows whose endpoints name no node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanglingPolicy {
    #[default]
    Retain,
    Drop,
}

impl DanglingPolicy {
    pub fn apply(self, model: SystemModel) -> SystemModel {
        match self {
            DanglingPolicy::Retain => model,
            DanglingPolicy::Drop => model.without_dangling_flows(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Class-name substrings that also make a Python class a data store
    #[serde(default = "default_datastore_hints")]
    pub datastore_name_hints: Vec<String>,

    #[serde(default)]
    pub dangling_flows: DanglingPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,

    /// Directory for report files
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// CI gate on the highest score (0 = disabled)
    #[serde(default)]
    pub min_score: f64,
}

fn default_format() -> String {
    "terminal".to_string()
}

fn default_output_dir() -> String {
    "threatmap_output".to_string()
}

impl Default for ThreatmapConfig {
    fn default() -> Self {
        toml::from_str("").expect("empty TOML should parse to defaults")
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            score_datastores: false,
            weights: DreadWeights::default(),
            base_scores: BaseScores::default(),
            templates: BTreeMap::new(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            datastore_name_hints: default_datastore_hints(),
            dangling_flows: DanglingPolicy::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            dir: default_output_dir(),
            min_score: 0.0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.weights.is_valid() {
            return Err(ConfigError::InvalidWeights);
        }
        if let Some(category) = self.base_scores.first_invalid() {
            return Err(ConfigError::InvalidBaseScore(category));
        }
        if let Some((kind, _)) = self.templates.iter().find(|(_, cats)| cats.is_empty()) {
            return Err(ConfigError::EmptyTemplate(kind.clone()));
        }
        Ok(())
    }

    /// Categories analyzed for an element of this kind
    pub fn categories_for(&self, kind: &str) -> &[StrideCategory] {
        match self.templates.get(kind) {
            Some(categories) => categories,
            None => &StrideCategory::ALL,
        }
    }
}

impl ThreatmapConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ThreatmapConfig = toml::from_str(&contents)?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Find and load .threatmap.toml from the current directory or ancestors
    pub fn find_and_load(start_dir: &Path) -> Result<Self> {
        let mut current = start_dir;

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::from_file(&config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        // No config found, use defaults
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
