//! PlantUML-style textual DSL parser
//!
//! Line oriented. Each trimmed, non-empty line is classified on its own by a
//! pure function; the only state is the current trust boundary, carried as an
//! immutable context through a left fold over the lines.

use super::{FormatParser, InputFormat, ParseError};
use crate::graph::{Component, DataFlow, DataStore, SystemModel, DATASTORE_KIND};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// What a single line declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Boundary(&'a str),
    Class(&'a str),
    Entity(&'a str),
    Actor(&'a str),
    UseCase(&'a str),
    Flow { source: &'a str, target: &'a str },
    Ignored,
}

struct LinePatterns {
    boundary: Regex,
    class: Regex,
    entity: Regex,
    actor: Regex,
    usecase: Regex,
    flow: Regex,
}

fn patterns() -> &'static LinePatterns {
    static PATTERNS: OnceLock<LinePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| LinePatterns {
        boundary: Regex::new(r"package\s+(\w+)").unwrap(),
        class: Regex::new(r"class\s+(\w+)").unwrap(),
        entity: Regex::new(r"entity\s+(\w+)").unwrap(),
        actor: Regex::new(r"actor\s+(\w+)").unwrap(),
        usecase: Regex::new(r"usecase\s+(\w+)").unwrap(),
        flow: Regex::new(r"(\w+)\s*-->\s*(\w+)").unwrap(),
    })
}

/// Classify one line. Patterns are tried in a fixed priority order and the
/// first match wins; matches are searched anywhere in the line.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let p = patterns();
    let first_group = |re: &Regex| {
        re.captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    };

    if let Some(name) = first_group(&p.boundary) {
        return LineKind::Boundary(name);
    }
    if let Some(name) = first_group(&p.class) {
        return LineKind::Class(name);
    }
    if let Some(name) = first_group(&p.entity) {
        return LineKind::Entity(name);
    }
    if let Some(name) = first_group(&p.actor) {
        return LineKind::Actor(name);
    }
    if let Some(name) = first_group(&p.usecase) {
        return LineKind::UseCase(name);
    }
    if let Some(caps) = p.flow.captures(line) {
        if let (Some(source), Some(target)) = (caps.get(1), caps.get(2)) {
            return LineKind::Flow {
                source: source.as_str(),
                target: target.as_str(),
            };
        }
    }
    LineKind::Ignored
}

/// Fold state: the trust boundary declared most recently
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DslContext {
    pub current_boundary: Option<String>,
}

/// Apply one classified line to the model, returning the context for the next line
fn apply_line(model: &mut SystemModel, ctx: DslContext, kind: LineKind<'_>) -> DslContext {
    let boundary = ctx.current_boundary.clone();
    match kind {
        LineKind::Boundary(name) => {
            return DslContext {
                current_boundary: Some(name.to_string()),
            }
        }
        LineKind::Class(name) => {
            model.add_component(Component::new(name, "component").with_boundary(boundary))
        }
        LineKind::Entity(name) => {
            model.add_datastore(DataStore::new(name, DATASTORE_KIND).with_boundary(boundary))
        }
        LineKind::Actor(name) => {
            model.add_component(Component::new(name, "actor").with_boundary(boundary))
        }
        LineKind::UseCase(name) => {
            model.add_component(Component::new(name, "usecase").with_boundary(boundary))
        }
        LineKind::Flow { source, target } => model.add_dataflow(DataFlow::new(source, target)),
        LineKind::Ignored => {}
    }
    ctx
}

/// Textual DSL parser
pub struct DslParser;

impl DslParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse DSL text into a model fragment
    pub fn parse_text(source: &str) -> SystemModel {
        let (model, _) = source
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .fold(
                (SystemModel::new(), DslContext::default()),
                |(mut model, ctx), line| {
                    let kind = classify_line(line);
                    if kind == LineKind::Ignored {
                        debug!(line, "dsl line ignored");
                    }
                    let ctx = apply_line(&mut model, ctx, kind);
                    (model, ctx)
                },
            );
        model
    }
}

impl Default for DslParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatParser for DslParser {
    fn format(&self) -> InputFormat {
        InputFormat::TextualDsl
    }

    fn parse_source(&self, source: &str, _file_path: &Path) -> Result<SystemModel, ParseError> {
        Ok(Self::parse_text(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ModelNode;

    #[test]
    fn test_classify_priority() {
        // boundary beats everything else on the same line
        assert_eq!(classify_line("package Web { class X"), LineKind::Boundary("Web"));
        assert_eq!(classify_line("class A --> B"), LineKind::Class("A"));
        assert_eq!(
            classify_line("A --> B"),
            LineKind::Flow {
                source: "A",
                target: "B"
            }
        );
        assert_eq!(classify_line("@startuml"), LineKind::Ignored);
    }

    #[test]
    fn test_boundary_applies_until_changed() {
        let model = DslParser::parse_text(
            "actor User\npackage Web\nusecase Login\npackage Data\nentity Users\n",
        );
        assert_eq!(model.components()[0].boundary(), None);
        assert_eq!(model.components()[1].boundary(), Some("Web"));
        assert_eq!(model.datastores()[0].boundary(), Some("Data"));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let model = DslParser::parse_text("\n   \nclass Api\n\n");
        assert_eq!(model.components().len(), 1);
        assert_eq!(model.components()[0].id(), "Api");
    }
}
