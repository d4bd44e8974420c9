//! Annotated graph export to DOT (Graphviz) and Mermaid
//!
//! Components are boxes, data stores cylinders, flows are labelled with
//! their flow id. Anything with a positively scored threat is filled red.
//! Flow endpoints that name no node are drawn as dashed placeholders.
//! DOT vertices are quoted names; Mermaid vertices get positional ids
//! (`n0`, `n1`, ...) so that distinct names never collide.

use crate::graph::{ModelNode, NodeRole, SystemModel};
use crate::threat::Threat;
use std::collections::{HashMap, HashSet};

const HIGHLIGHT_FILL: &str = "#ef4444";
const NODE_FILL: &str = "#e5e7eb";

fn highlighted(threats: &[Threat]) -> HashSet<&str> {
    threats
        .iter()
        .filter(|t| t.dread_score > 0.0)
        .map(|t| t.component.as_str())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Box,
    Cylinder,
    Placeholder,
}

/// One vertex per distinct name; a name that is also a data store draws as one
fn vertices(model: &SystemModel) -> Vec<(String, Shape)> {
    let index = model.name_index();
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    let names = model
        .components()
        .iter()
        .map(|c| c.id())
        .chain(model.datastores().iter().map(|d| d.id()));
    for name in names {
        if !seen.insert(name.to_string()) {
            continue;
        }
        let is_store = index
            .nodes_named(name)
            .iter()
            .any(|node| node.role == NodeRole::DataStore);
        let shape = if is_store { Shape::Cylinder } else { Shape::Box };
        out.push((name.to_string(), shape));
    }
    for name in index.unresolved_names() {
        if seen.insert(name.to_string()) {
            out.push((name.to_string(), Shape::Placeholder));
        }
    }
    out
}

fn dot_escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Generate a DOT (Graphviz) representation of the annotated model.
pub fn to_dot(model: &SystemModel, threats: &[Threat]) -> String {
    let hot = highlighted(threats);
    let mut lines = Vec::new();
    lines.push("digraph \"threat_model\" {".to_string());
    lines.push("    rankdir=LR;".to_string());
    lines.push("    node [fontname=\"Helvetica\"];".to_string());
    lines.push("    edge [color=\"#666666\"];".to_string());
    lines.push(String::new());

    for (name, shape) in vertices(model) {
        let fill = if hot.contains(name.as_str()) {
            HIGHLIGHT_FILL
        } else {
            NODE_FILL
        };
        let attrs = match shape {
            Shape::Box => format!("shape=box, style=\"rounded,filled\", fillcolor=\"{}\"", fill),
            Shape::Cylinder => format!("shape=cylinder, style=filled, fillcolor=\"{}\"", fill),
            Shape::Placeholder => "shape=box, style=dashed".to_string(),
        };
        lines.push(format!("    \"{}\" [{}];", dot_escape(&name), attrs));
    }

    lines.push(String::new());

    for flow in model.dataflows() {
        let flow_id = flow.flow_id();
        let color = if hot.contains(flow_id.as_str()) {
            format!(", color=\"{}\", fontcolor=\"{}\"", HIGHLIGHT_FILL, HIGHLIGHT_FILL)
        } else {
            String::new()
        };
        lines.push(format!(
            "    \"{}\" -> \"{}\" [label=\"{}\"{}];",
            dot_escape(flow.source()),
            dot_escape(flow.target()),
            dot_escape(&flow_id),
            color
        ));
    }

    lines.push("}".to_string());
    lines.join("\n")
}

fn mermaid_escape(label: &str) -> String {
    label.replace('"', "#quot;")
}

/// Generate a Mermaid flowchart of the annotated model.
pub fn to_mermaid(model: &SystemModel, threats: &[Threat]) -> String {
    let hot = highlighted(threats);
    let mut lines = Vec::new();
    lines.push("graph LR".to_string());

    let mut ids: HashMap<String, String> = HashMap::new();
    let mut hot_ids = Vec::new();
    let mut placeholder_ids = Vec::new();
    for (position, (name, shape)) in vertices(model).into_iter().enumerate() {
        let id = format!("n{}", position);
        let label = mermaid_escape(&name);
        let node = match shape {
            Shape::Box => format!("    {}[\"{}\"]", id, label),
            Shape::Cylinder => format!("    {}[(\"{}\")]", id, label),
            Shape::Placeholder => {
                placeholder_ids.push(id.clone());
                format!("    {}[\"{}\"]", id, label)
            }
        };
        lines.push(node);
        if shape != Shape::Placeholder && hot.contains(name.as_str()) {
            hot_ids.push(id.clone());
        }
        ids.insert(name, id);
    }
    // Every flow endpoint is a vertex: resolved names or placeholders
    let id_of = |name: &str| ids.get(name).cloned().unwrap_or_default();

    let mut hot_links = Vec::new();
    for (position, flow) in model.dataflows().iter().enumerate() {
        let flow_id = flow.flow_id();
        lines.push(format!(
            "    {} -->|\"{}\"| {}",
            id_of(flow.source()),
            mermaid_escape(&flow_id),
            id_of(flow.target())
        ));
        if hot.contains(flow_id.as_str()) {
            hot_links.push(position.to_string());
        }
    }

    if !hot_ids.is_empty() {
        lines.push(format!(
            "    style {} fill:{},color:#fff",
            hot_ids.join(","),
            HIGHLIGHT_FILL
        ));
    }
    if !placeholder_ids.is_empty() {
        lines.push(format!(
            "    style {} stroke-dasharray:5 5",
            placeholder_ids.join(",")
        ));
    }
    if !hot_links.is_empty() {
        lines.push(format!(
            "    linkStyle {} stroke:{}",
            hot_links.join(","),
            HIGHLIGHT_FILL
        ));
    }

    lines.join("\n")
}
