//! Python source parser using Tree-sitter
//!
//! Classes and functions become components; call sites inside a function
//! become flows from that function. Call targets are the syntactic callee
//! text only and are never resolved against declarations, so flows may
//! point at builtins or names declared nowhere.

use super::{FormatParser, InputFormat, ParseError};
use crate::graph::{Component, DataFlow, DataStore, SystemModel, DATASTORE_KIND};
use std::path::Path;
use tracing::debug;
use tree_sitter::{Node, Parser, Tree};

/// Class-name substrings that mark a class as a data store as well
pub fn default_datastore_hints() -> Vec<String> {
    vec!["Model".to_string(), "DB".to_string()]
}

/// Python language parser
pub struct PythonParser {
    language: tree_sitter::Language,
    datastore_hints: Vec<String>,
}

impl PythonParser {
    pub fn new() -> Self {
        Self::with_datastore_hints(default_datastore_hints())
    }

    pub fn with_datastore_hints(datastore_hints: Vec<String>) -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
            datastore_hints,
        }
    }

    fn create_parser(&self) -> Result<Parser, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ParseError::TreeSitter(e.to_string()))?;
        Ok(parser)
    }

    fn parse_tree(&self, source: &str) -> Result<Tree, ParseError> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::TreeSitter("Failed to parse Python source".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            let (line, message) = match first_error(root) {
                Some(node) if node.is_missing() => (
                    node.start_position().row + 1,
                    format!("missing '{}'", node.kind()),
                ),
                Some(node) => (node.start_position().row + 1, "invalid syntax".to_string()),
                None => (1, "invalid syntax".to_string()),
            };
            return Err(ParseError::Syntax { line, message });
        }
        Ok(tree)
    }

    fn is_datastore_name(&self, name: &str) -> bool {
        self.datastore_hints
            .iter()
            .any(|hint| !hint.is_empty() && name.contains(hint.as_str()))
    }

    fn visit(&self, node: Node<'_>, source: &str, class: Option<&str>, model: &mut SystemModel) {
        match node.kind() {
            "class_definition" => {
                if let Some(name) = field_text(node, "name", source) {
                    model.add_component(Component::new(name, "class"));
                    if self.is_datastore_name(name) {
                        model.add_datastore(DataStore::new(name, DATASTORE_KIND));
                    }
                    for child in named_children(node) {
                        self.visit(child, source, Some(name), model);
                    }
                    return;
                }
            }
            "function_definition" => {
                if let Some(name) = field_text(node, "name", source) {
                    let qualified = match class {
                        Some(class) => format!("{}.{}", class, name),
                        None => name.to_string(),
                    };
                    model.add_component(Component::new(qualified.as_str(), "function"));

                    let mut targets = Vec::new();
                    collect_call_targets(node, source, &mut targets);
                    debug!(function = %qualified, calls = targets.len(), "function call sites");
                    for target in targets {
                        model.add_dataflow(DataFlow::new(qualified.as_str(), target));
                    }
                }
            }
            _ => {}
        }

        for child in named_children(node) {
            self.visit(child, source, class, model);
        }
    }
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn node_text<'s>(node: Node<'_>, source: &'s str) -> Option<&'s str> {
    source.get(node.start_byte()..node.end_byte())
}

fn field_text<'s>(node: Node<'_>, field: &str, source: &'s str) -> Option<&'s str> {
    node_text(node.child_by_field_name(field)?, source)
}

/// Flow target for one `call` node, if its callee has a usable name
fn call_target(call: Node<'_>, source: &str) -> Option<String> {
    let callee = call.child_by_field_name("function")?;
    match callee.kind() {
        "identifier" => node_text(callee, source).map(str::to_string),
        "attribute" => {
            let member = field_text(callee, "attribute", source)?;
            let object = callee.child_by_field_name("object")?;
            if object.kind() == "identifier" {
                Some(format!("{}.{}", node_text(object, source)?, member))
            } else {
                Some(member.to_string())
            }
        }
        _ => None,
    }
}

/// Every call in the subtree, in document order (outer call before its arguments)
fn collect_call_targets(node: Node<'_>, source: &str, targets: &mut Vec<String>) {
    if node.kind() == "call" {
        if let Some(target) = call_target(node, source) {
            targets.push(target);
        }
    }
    for child in named_children(node) {
        collect_call_targets(child, source, targets);
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

impl Default for PythonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatParser for PythonParser {
    fn format(&self) -> InputFormat {
        InputFormat::SourceAst
    }

    fn parse_source(&self, source: &str, _file_path: &Path) -> Result<SystemModel, ParseError> {
        let tree = self.parse_tree(source)?;
        let mut model = SystemModel::new();
        self.visit(tree.root_node(), source, None, &mut model);
        Ok(model)
    }
}
