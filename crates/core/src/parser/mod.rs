//! Format parsers that turn architecture artifacts into a [`SystemModel`]

pub mod diagram;
pub mod dsl;
pub mod infra;
pub mod openapi;
pub mod python;

use crate::graph::SystemModel;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Error types for ingestion
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Malformed diagram XML: {0}")]
    Xml(String),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Unsupported file extension '{0}'")]
    UnsupportedExtension(String),

    #[error("Cannot determine input format for '{0}'; prefix the path with a format")]
    UnknownFormat(String),

    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),
}

/// Input format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputFormat {
    /// draw.io / mxGraph XML export
    Diagram,
    /// PlantUML-style textual description
    TextualDsl,
    /// OpenAPI document
    ApiDescriptor,
    /// Terraform or CloudFormation template
    InfraTemplate,
    /// Python source file
    SourceAst,
}

impl InputFormat {
    pub const ALL: [InputFormat; 5] = [
        InputFormat::Diagram,
        InputFormat::TextualDsl,
        InputFormat::ApiDescriptor,
        InputFormat::InfraTemplate,
        InputFormat::SourceAst,
    ];

    /// Derive the format from a file extension.
    ///
    /// `.yaml`, `.yml` and `.json` are shared by API descriptors and
    /// infrastructure templates, so they yield `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "drawio" | "xml" => Some(InputFormat::Diagram),
            "uml" | "puml" | "plantuml" | "txt" => Some(InputFormat::TextualDsl),
            "tf" => Some(InputFormat::InfraTemplate),
            "py" | "pyi" => Some(InputFormat::SourceAst),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InputFormat::Diagram => "diagram",
            InputFormat::TextualDsl => "dsl",
            InputFormat::ApiDescriptor => "openapi",
            InputFormat::InfraTemplate => "iac",
            InputFormat::SourceAst => "source",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InputFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "diagram" | "drawio" => Ok(InputFormat::Diagram),
            "dsl" | "uml" | "plantuml" | "textual-dsl" => Ok(InputFormat::TextualDsl),
            "openapi" | "api" | "swagger" | "api-descriptor" => Ok(InputFormat::ApiDescriptor),
            "iac" | "infra" | "terraform" | "cloudformation" | "infra-template" => {
                Ok(InputFormat::InfraTemplate)
            }
            "source" | "python" | "source-ast" => Ok(InputFormat::SourceAst),
            other => Err(ParseError::UnknownFormat(other.to_string())),
        }
    }
}

/// One file to ingest, with an optional explicit format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    pub path: PathBuf,
    pub format: Option<InputFormat>,
}

impl InputSpec {
    pub fn new(path: impl Into<PathBuf>, format: Option<InputFormat>) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// The explicit format, or the one implied by the extension
    pub fn resolve_format(&self) -> Result<InputFormat, ParseError> {
        self.format
            .or_else(|| InputFormat::from_path(&self.path))
            .ok_or_else(|| ParseError::UnknownFormat(self.path.display().to_string()))
    }
}

impl FromStr for InputSpec {
    type Err = ParseError;

    /// Accepts `path` or `format:path`. A prefix that is not a known format
    /// is treated as part of the path (e.g. Windows drive letters).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((prefix, rest)) = s.split_once(':') {
            if let Ok(format) = prefix.parse::<InputFormat>() {
                return Ok(InputSpec::new(rest, Some(format)));
            }
        }
        Ok(InputSpec::new(s, None))
    }
}

/// Trait for format-specific parsers
///
/// Each parser produces a fresh [`SystemModel`] fragment from one artifact.
/// A failure leaves no partial fragment behind.
pub trait FormatParser: Send + Sync {
    /// The format this parser handles
    fn format(&self) -> InputFormat;

    /// Parse artifact content. `file_path` is used for dialect selection
    /// and error messages only.
    fn parse_source(&self, source: &str, file_path: &Path) -> Result<SystemModel, ParseError>;

    /// Read and parse an artifact from disk
    fn parse_file(&self, file_path: &Path) -> Result<SystemModel, ParseError> {
        let source = std::fs::read_to_string(file_path)?;
        self.parse_source(&source, file_path)
    }
}

/// Lower-cased extension of `path` with a leading dot, or empty
pub(crate) fn dotted_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Dispatcher that routes inputs to the parser for their format
pub struct ParserDispatcher {
    parsers: Vec<Box<dyn FormatParser>>,
}

impl ParserDispatcher {
    /// Create a dispatcher with the default parsers
    pub fn new() -> Self {
        Self::with_datastore_hints(python::default_datastore_hints())
    }

    /// Create a dispatcher whose source parser uses custom data store naming hints
    pub fn with_datastore_hints(hints: Vec<String>) -> Self {
        Self {
            parsers: vec![
                Box::new(diagram::DiagramParser::new()),
                Box::new(dsl::DslParser::new()),
                Box::new(openapi::OpenApiParser::new()),
                Box::new(infra::InfraParser::new()),
                Box::new(python::PythonParser::with_datastore_hints(hints)),
            ],
        }
    }

    pub fn find_parser(&self, format: InputFormat) -> Option<&dyn FormatParser> {
        self.parsers
            .iter()
            .find(|parser| parser.format() == format)
            .map(|boxed| &**boxed)
    }

    /// Parse one input into a fresh fragment
    pub fn ingest(&self, input: &InputSpec) -> Result<SystemModel, ParseError> {
        let format = input.resolve_format()?;
        let parser = self
            .find_parser(format)
            .ok_or_else(|| ParseError::UnknownFormat(format.to_string()))?;

        let model = parser.parse_file(&input.path)?;
        info!(
            path = %input.path.display(),
            format = %format,
            components = model.components().len(),
            datastores = model.datastores().len(),
            dataflows = model.dataflows().len(),
            "ingested"
        );
        Ok(model)
    }

    /// Parse inputs in parallel, then merge fragments in input order.
    ///
    /// Completion order never leaks into the aggregate, so the ranking
    /// tie-break stays deterministic. Returns `(aggregate, errors)`; a
    /// failed input contributes nothing.
    pub fn ingest_all(&self, inputs: &[InputSpec]) -> (SystemModel, Vec<String>) {
        let per_input: Vec<Result<SystemModel, String>> = inputs
            .par_iter()
            .map(|input| {
                self.ingest(input)
                    .map_err(|e| format!("{}: {}", input.path.display(), e))
            })
            .collect();

        let mut aggregate = SystemModel::new();
        let mut errors = Vec::new();
        for result in per_input {
            match result {
                Ok(fragment) => aggregate.merge(fragment),
                Err(e) => {
                    debug!(error = %e, "input skipped");
                    errors.push(e);
                }
            }
        }

        (aggregate, errors)
    }

    /// Like [`ingest_all`](Self::ingest_all) but fails on the first error in input order
    pub fn ingest_all_strict(&self, inputs: &[InputSpec]) -> Result<SystemModel, ParseError> {
        let per_input: Vec<Result<SystemModel, ParseError>> =
            inputs.par_iter().map(|input| self.ingest(input)).collect();

        let mut aggregate = SystemModel::new();
        for result in per_input {
            aggregate.merge(result?);
        }
        Ok(aggregate)
    }
}

impl Default for ParserDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            InputFormat::from_path(Path::new("arch.drawio")),
            Some(InputFormat::Diagram)
        );
        assert_eq!(
            InputFormat::from_path(Path::new("design.PUML")),
            Some(InputFormat::TextualDsl)
        );
        assert_eq!(
            InputFormat::from_path(Path::new("main.tf")),
            Some(InputFormat::InfraTemplate)
        );
        assert_eq!(InputFormat::from_path(Path::new("api.yaml")), None);
        assert_eq!(InputFormat::from_path(Path::new("stack.json")), None);
    }

    #[test]
    fn test_input_spec_prefix() {
        let spec: InputSpec = "openapi:specs/api.yaml".parse().unwrap();
        assert_eq!(spec.format, Some(InputFormat::ApiDescriptor));
        assert_eq!(spec.path, PathBuf::from("specs/api.yaml"));

        let plain: InputSpec = "C:/work/main.tf".parse().unwrap();
        assert_eq!(plain.format, None);
        assert_eq!(plain.path, PathBuf::from("C:/work/main.tf"));
    }

    #[test]
    fn test_ambiguous_extension_needs_intent() {
        let spec = InputSpec::new("stack.yaml", None);
        assert!(matches!(
            spec.resolve_format(),
            Err(ParseError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_every_format_has_a_parser() {
        let dispatcher = ParserDispatcher::new();
        for format in InputFormat::ALL {
            assert!(dispatcher.find_parser(format).is_some(), "{format}");
        }
    }
}
