//! draw.io / mxGraph diagram parser
//!
//! Reads every `mxCell` element (at any depth) and classifies labelled cells
//! by substrings of their `style` attribute. Edges are resolved in a second
//! pass through the cell-id → label mapping built by the first.

use super::{FormatParser, InputFormat, ParseError};
use crate::graph::{Component, DataFlow, DataStore, SystemModel, DATASTORE_KIND};
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Classification result for a vertex cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Trust boundary container; recorded for edge resolution, never emitted
    Boundary,
    /// Component with the given kind tag
    Component(&'static str),
    DataStore,
}

struct StyleRule {
    markers: &'static [&'static str],
    kind: CellKind,
}

/// Evaluated top-down, first match wins. The order matters: draw.io styles
/// routinely combine markers (a rounded swimlane is still a boundary).
const STYLE_RULES: &[StyleRule] = &[
    StyleRule {
        markers: &["swimlane", "container", "group"],
        kind: CellKind::Boundary,
    },
    StyleRule {
        markers: &["shape=umlClass", "rounded=1"],
        kind: CellKind::Component("component"),
    },
    StyleRule {
        markers: &["shape=cylinder", "datastore"],
        kind: CellKind::DataStore,
    },
    StyleRule {
        markers: &["shape=umlActor"],
        kind: CellKind::Component("actor"),
    },
    StyleRule {
        markers: &["ellipse", "usecase"],
        kind: CellKind::Component("usecase"),
    },
];

/// Classify a cell style string
pub fn classify_style(style: &str) -> Option<CellKind> {
    STYLE_RULES
        .iter()
        .find(|rule| rule.markers.iter().any(|marker| style.contains(marker)))
        .map(|rule| rule.kind)
}

/// Decode a cell label: HTML entity references, then percent-encoding, then trim
pub fn decode_label(raw: &str) -> String {
    let unescaped = unescape_with(raw, resolve_html5_entity).unwrap_or(Cow::Borrowed(raw));
    percent_decode(&unescaped).trim().to_string()
}

/// Decode `%XX` sequences; malformed sequences are kept as-is.
fn percent_decode(input: &str) -> Cow<'_, str> {
    if !input.contains('%') {
        return Cow::Borrowed(input);
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let decoded = bytes
                .get(i + 1..i + 3)
                .filter(|pair| pair.iter().all(u8::is_ascii_hexdigit))
                .and_then(|pair| std::str::from_utf8(pair).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = decoded {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}

/// Raw attributes of one `mxCell`
#[derive(Debug, Default)]
struct Cell {
    id: String,
    value: String,
    style: String,
    edge: bool,
    parent: Option<String>,
    source: Option<String>,
    target: Option<String>,
}

impl Cell {
    fn from_element(element: &BytesStart<'_>) -> Result<Self, ParseError> {
        let mut cell = Cell::default();
        for attr in element.attributes() {
            let attr = attr.map_err(|e| ParseError::Xml(e.to_string()))?;
            let value = attr
                .unescape_value()
                .map_err(|e| ParseError::Xml(e.to_string()))?
                .into_owned();
            match attr.key.as_ref() {
                b"id" => cell.id = value,
                b"value" => cell.value = value,
                b"style" => cell.style = value,
                b"edge" => cell.edge = value == "1",
                b"parent" => cell.parent = Some(value),
                b"source" => cell.source = Some(value),
                b"target" => cell.target = Some(value),
                _ => {}
            }
        }
        Ok(cell)
    }

    fn is_edge(&self) -> bool {
        self.edge || self.style.contains("edge=1")
    }
}

fn read_cells(source: &str) -> Result<Vec<Cell>, ParseError> {
    let mut reader = Reader::from_str(source);
    let mut cells = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                depth += 1;
                saw_root = true;
                if element.name().as_ref() == b"mxCell" {
                    cells.push(Cell::from_element(&element)?);
                }
            }
            Ok(Event::Empty(element)) => {
                saw_root = true;
                if element.name().as_ref() == b"mxCell" {
                    cells.push(Cell::from_element(&element)?);
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ParseError::Xml(format!(
                    "{} (at byte {})",
                    e,
                    reader.buffer_position()
                )))
            }
        }
    }

    if !saw_root {
        return Err(ParseError::Xml("document has no root element".to_string()));
    }
    if depth != 0 {
        return Err(ParseError::Xml(format!("{} unclosed element(s)", depth)));
    }
    Ok(cells)
}

/// A vertex that survived classification
struct Resolved<'a> {
    label: String,
    kind: CellKind,
    parent: Option<&'a str>,
}

/// draw.io XML parser
pub struct DiagramParser;

impl DiagramParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse diagram XML into a model fragment
    pub fn parse_xml(source: &str) -> Result<SystemModel, ParseError> {
        let cells = read_cells(source)?;
        let mut model = SystemModel::new();

        // Pass 1: classify every labelled cell, edges included (a labelled
        // edge whose style matches a rule also becomes a node). Emission waits
        // until every cell is known so a child can pick up a boundary declared
        // after it.
        let mut by_id: HashMap<&str, usize> = HashMap::new();
        let mut resolved: Vec<Resolved<'_>> = Vec::new();
        for cell in &cells {
            let label = decode_label(&cell.value);
            if label.is_empty() {
                continue;
            }
            let Some(kind) = classify_style(&cell.style) else {
                debug!(cell = %cell.id, style = %cell.style, "unclassified diagram cell");
                continue;
            };
            by_id.insert(cell.id.as_str(), resolved.len());
            resolved.push(Resolved {
                label,
                kind,
                parent: cell.parent.as_deref(),
            });
        }

        let boundary_of = |parent: Option<&str>| -> Option<String> {
            let entry = &resolved[*by_id.get(parent?)?];
            (entry.kind == CellKind::Boundary).then(|| entry.label.clone())
        };

        for entry in &resolved {
            match entry.kind {
                CellKind::Boundary => {}
                CellKind::Component(kind) => model.add_component(
                    Component::new(entry.label.as_str(), kind)
                        .with_boundary(boundary_of(entry.parent)),
                ),
                CellKind::DataStore => model.add_datastore(
                    DataStore::new(entry.label.as_str(), DATASTORE_KIND)
                        .with_boundary(boundary_of(entry.parent)),
                ),
            }
        }

        // Pass 2: edges whose endpoints both resolved to a label
        let label_of = |id: Option<&str>| -> Option<&str> {
            by_id.get(id?).map(|idx| resolved[*idx].label.as_str())
        };
        for cell in cells.iter().filter(|cell| cell.is_edge()) {
            match (
                label_of(cell.source.as_deref()),
                label_of(cell.target.as_deref()),
            ) {
                (Some(source), Some(target)) => {
                    model.add_dataflow(DataFlow::new(source, target))
                }
                _ => debug!(cell = %cell.id, "diagram edge dropped: unresolved endpoint"),
            }
        }

        Ok(model)
    }
}

impl Default for DiagramParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatParser for DiagramParser {
    fn format(&self) -> InputFormat {
        InputFormat::Diagram
    }

    fn parse_source(&self, source: &str, _file_path: &Path) -> Result<SystemModel, ParseError> {
        Self::parse_xml(source)
    }
}
