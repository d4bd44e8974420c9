//! Infrastructure template parser: Terraform and CloudFormation
//!
//! Every declared resource becomes a component; storage resources are also
//! registered as data stores. Flows are synthesized as the full product of
//! non-storage components and data stores. That is a coarse
//! over-approximation, not a trace of real data movement.

use super::openapi::{key_name, load_document};
use super::{dotted_extension, FormatParser, InputFormat, ParseError};
use crate::graph::{Component, DataFlow, DataStore, ModelNode, SystemModel};
use regex::Regex;
use serde_yaml::Value;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Resource types treated as data stores, in both dialects
pub const STORAGE_RESOURCE_TYPES: &[&str] = &[
    "aws_s3_bucket",
    "aws_db_instance",
    "aws_dynamodb_table",
    "AWS::S3::Bucket",
    "AWS::RDS::DBInstance",
    "AWS::DynamoDB::Table",
];

const UNKNOWN_TYPE: &str = "Unknown";

fn resource_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"resource\s+"(\w+)"\s+"(\w+)""#).unwrap())
}

pub fn is_storage_type(resource_type: &str) -> bool {
    STORAGE_RESOURCE_TYPES.contains(&resource_type)
}

/// Terraform / CloudFormation parser
pub struct InfraParser;

impl InfraParser {
    pub fn new() -> Self {
        Self
    }

    /// `(type, name)` pairs of every `resource "<type>" "<name>"` block
    pub fn terraform_resources(source: &str) -> Vec<(String, String)> {
        resource_regex()
            .captures_iter(source)
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
            .collect()
    }

    /// `(type, name)` pairs of the top-level `Resources` mapping
    pub fn cloudformation_resources(doc: &Value) -> Vec<(String, String)> {
        let resources = doc.get("Resources").and_then(Value::as_mapping);
        resources
            .into_iter()
            .flatten()
            .filter_map(|(name, definition)| {
                let name = key_name(name)?;
                let resource_type = definition
                    .get("Type")
                    .and_then(Value::as_str)
                    .unwrap_or(UNKNOWN_TYPE)
                    .to_string();
                Some((resource_type, name))
            })
            .collect()
    }

    /// Build the model from extracted resources
    pub fn build_model(resources: &[(String, String)]) -> SystemModel {
        let mut model = SystemModel::new();

        for (resource_type, name) in resources {
            model.add_component(Component::new(name.as_str(), resource_type.as_str()));
            if is_storage_type(resource_type) {
                model.add_datastore(DataStore::new(name.as_str(), resource_type.as_str()));
            }
        }

        let flows: Vec<DataFlow> = model
            .components()
            .iter()
            .filter(|component| !is_storage_type(component.kind()))
            .flat_map(|component| {
                model
                    .datastores()
                    .iter()
                    .map(move |store| DataFlow::new(component.id(), store.id()))
            })
            .collect();
        debug!(flows = flows.len(), "synthesized component-to-store flows");
        for flow in flows {
            model.add_dataflow(flow);
        }

        model
    }
}

impl Default for InfraParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatParser for InfraParser {
    fn format(&self) -> InputFormat {
        InputFormat::InfraTemplate
    }

    fn parse_source(&self, source: &str, file_path: &Path) -> Result<SystemModel, ParseError> {
        let resources = match dotted_extension(file_path).as_str() {
            ".tf" => Self::terraform_resources(source),
            ".yaml" | ".yml" | ".json" => {
                Self::cloudformation_resources(&load_document(source, file_path)?)
            }
            other => return Err(ParseError::UnsupportedExtension(other.to_string())),
        };
        Ok(Self::build_model(&resources))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terraform_resource_regex() {
        let source = r#"
resource "aws_instance" "web" {
  ami = "ami-123"
}
resource "aws_s3_bucket" "assets" {}
"#;
        let resources = InfraParser::terraform_resources(source);
        assert_eq!(
            resources,
            vec![
                ("aws_instance".to_string(), "web".to_string()),
                ("aws_s3_bucket".to_string(), "assets".to_string()),
            ]
        );
    }

    #[test]
    fn test_storage_components_are_not_flow_sources() {
        let model = InfraParser::build_model(&[
            ("aws_s3_bucket".to_string(), "a".to_string()),
            ("aws_dynamodb_table".to_string(), "b".to_string()),
        ]);
        assert_eq!(model.components().len(), 2);
        assert_eq!(model.datastores().len(), 2);
        assert!(model.dataflows().is_empty());
    }

    #[test]
    fn test_unsupported_extension_named() {
        let err = InfraParser::new()
            .parse_source("", Path::new("stack.hcl"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file extension '.hcl'");
    }
}
