//! OpenAPI descriptor parser
//!
//! Servers become `api` components, named schemas become data stores, and
//! every response media type that references a schema becomes a flow from
//! the service to that schema. Request bodies and parameters are not modeled.
//! Swagger 2.0 `definitions` and response-level `schema` references are
//! read the same way.

use super::{dotted_extension, FormatParser, InputFormat, ParseError};
use crate::graph::{Component, DataFlow, DataStore, SystemModel, DATASTORE_KIND};
use serde_yaml::Value;
use std::path::Path;
use tracing::debug;

/// Component synthesized when no server is declared; also the source of
/// every response flow, whatever servers exist
pub const DEFAULT_SERVICE: &str = "APIService";

const UNKNOWN_SERVER: &str = "UnknownServer";

const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Load a YAML or JSON document according to the file extension.
///
/// JSON goes through `serde_json` so that input YAML would tolerate (e.g. a
/// missing value) is still rejected.
pub(crate) fn load_document(source: &str, file_path: &Path) -> Result<Value, ParseError> {
    match dotted_extension(file_path).as_str() {
        ".yaml" | ".yml" => Ok(serde_yaml::from_str(source)?),
        ".json" => Ok(serde_json::from_str(source)?),
        other => Err(ParseError::UnsupportedExtension(other.to_string())),
    }
}

/// Mapping keys are usually strings, but YAML allows `200:` or `1:` too
pub(crate) fn key_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Schema name from a `$ref` such as `#/components/schemas/User`
pub fn schema_name_from_ref(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

fn schema_ref(holder: &Value) -> Option<&str> {
    holder
        .get("schema")
        .and_then(|schema| schema.get("$ref"))
        .and_then(Value::as_str)
}

/// OpenAPI parser
pub struct OpenApiParser;

impl OpenApiParser {
    pub fn new() -> Self {
        Self
    }

    /// Build a model fragment from an already-loaded document
    pub fn parse_document(doc: &Value) -> SystemModel {
        let mut model = SystemModel::new();

        match doc
            .get("servers")
            .and_then(Value::as_sequence)
            .filter(|servers| !servers.is_empty())
        {
            Some(servers) => {
                for server in servers {
                    let url = server
                        .get("url")
                        .and_then(Value::as_str)
                        .unwrap_or(UNKNOWN_SERVER);
                    model.add_component(Component::new(url, "api"));
                }
            }
            None => model.add_component(Component::new(DEFAULT_SERVICE, "api")),
        }

        let schemas = doc
            .get("components")
            .and_then(|components| components.get("schemas"))
            .or_else(|| doc.get("definitions"))
            .and_then(Value::as_mapping);
        for name in schemas.into_iter().flat_map(|m| m.keys()).filter_map(key_name) {
            model.add_datastore(DataStore::new(name, DATASTORE_KIND));
        }

        let paths = doc.get("paths").and_then(Value::as_mapping);
        for (path, item) in paths.into_iter().flatten() {
            let Some(operations) = item.as_mapping() else {
                continue;
            };
            for (method, operation) in operations {
                let is_method = method
                    .as_str()
                    .is_some_and(|m| HTTP_METHODS.contains(&m.to_ascii_lowercase().as_str()));
                if !is_method {
                    continue;
                }
                let responses = operation.get("responses").and_then(Value::as_mapping);
                for response in responses.into_iter().flat_map(|r| r.values()) {
                    for reference in response_refs(response) {
                        debug!(path = ?key_name(path), reference, "response schema flow");
                        model.add_dataflow(DataFlow::new(
                            DEFAULT_SERVICE,
                            schema_name_from_ref(reference),
                        ));
                    }
                }
            }
        }

        model
    }
}

/// Schema references of one response, in media-type order
fn response_refs(response: &Value) -> Vec<&str> {
    match response.get("content").and_then(Value::as_mapping) {
        Some(content) => content.values().filter_map(schema_ref).collect(),
        // Swagger 2.0 puts the schema directly on the response
        None => schema_ref(response).into_iter().collect(),
    }
}

impl Default for OpenApiParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatParser for OpenApiParser {
    fn format(&self) -> InputFormat {
        InputFormat::ApiDescriptor
    }

    fn parse_source(&self, source: &str, file_path: &Path) -> Result<SystemModel, ParseError> {
        let doc = load_document(source, file_path)?;
        Ok(Self::parse_document(&doc))
    }
}
