//! Name-keyed index over a [`SystemModel`]
//!
//! Flows reference nodes by name only. The index resolves those names into a
//! petgraph view so consumers can ask which names exist, which flows point
//! nowhere, and walk the resolved edges. Names that no node carries become
//! placeholder vertices so that dangling flows still have two endpoints.

use super::{ModelNode, SystemModel};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Role of a vertex in the index graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Component,
    DataStore,
    /// A flow endpoint name with no node behind it
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedNode {
    pub name: String,
    pub kind: String,
    pub role: NodeRole,
}

/// Lookup structure built from a model snapshot
#[derive(Debug, Clone)]
pub struct NameIndex {
    graph: DiGraph<IndexedNode, usize>,
    by_name: HashMap<String, Vec<NodeIndex>>,
    dangling: Vec<usize>,
}

impl NameIndex {
    /// Index every node of `model`, then connect flows by name.
    ///
    /// Edge weights are the flow's position in `model.dataflows()`.
    pub fn build(model: &SystemModel) -> Self {
        let mut index = Self {
            graph: DiGraph::new(),
            by_name: HashMap::new(),
            dangling: Vec::new(),
        };

        for component in model.components() {
            index.insert(component, NodeRole::Component);
        }
        for datastore in model.datastores() {
            index.insert(datastore, NodeRole::DataStore);
        }

        for (position, flow) in model.dataflows().iter().enumerate() {
            let source_known = index.resolves(flow.source());
            let target_known = index.resolves(flow.target());
            if !source_known || !target_known {
                index.dangling.push(position);
            }

            let from = index.endpoint(flow.source());
            let to = index.endpoint(flow.target());
            index.graph.add_edge(from, to, position);
        }

        index
    }

    fn insert(&mut self, node: &dyn ModelNode, role: NodeRole) -> NodeIndex {
        let idx = self.graph.add_node(IndexedNode {
            name: node.id().to_string(),
            kind: node.kind().to_string(),
            role,
        });
        self.by_name.entry(node.id().to_string()).or_default().push(idx);
        idx
    }

    /// First vertex carrying `name`, creating an unresolved placeholder if none
    fn endpoint(&mut self, name: &str) -> NodeIndex {
        if let Some(first) = self.by_name.get(name).and_then(|ids| ids.first()) {
            return *first;
        }
        let idx = self.graph.add_node(IndexedNode {
            name: name.to_string(),
            kind: String::new(),
            role: NodeRole::Unresolved,
        });
        self.by_name.entry(name.to_string()).or_default().push(idx);
        idx
    }

    /// Whether some component or data store carries this name
    pub fn resolves(&self, name: &str) -> bool {
        self.nodes_named(name)
            .iter()
            .any(|node| node.role != NodeRole::Unresolved)
    }

    /// Every vertex carrying `name`, in model insertion order
    pub fn nodes_named(&self, name: &str) -> Vec<&IndexedNode> {
        self.by_name
            .get(name)
            .map(|ids| ids.iter().map(|idx| &self.graph[*idx]).collect())
            .unwrap_or_default()
    }

    /// Names that more than one node carries (possibly with different kinds)
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .by_name
            .iter()
            .filter(|(_, ids)| {
                ids.iter()
                    .filter(|idx| self.graph[**idx].role != NodeRole::Unresolved)
                    .count()
                    > 1
            })
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Positions (in `dataflows()`) of flows with at least one unknown endpoint
    pub fn dangling_flow_positions(&self) -> &[usize] {
        &self.dangling
    }

    /// Placeholder vertices created for unknown flow endpoints
    pub fn unresolved_names(&self) -> Vec<&str> {
        self.graph
            .node_weights()
            .filter(|node| node.role == NodeRole::Unresolved)
            .map(|node| node.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Component, DataFlow, DataStore};

    fn sample() -> SystemModel {
        let mut model = SystemModel::new();
        model.add_component(Component::new("Worker", "aws_instance"));
        model.add_component(Component::new("Orders", "aws_s3_bucket"));
        model.add_datastore(DataStore::new("Orders", "aws_s3_bucket"));
        model.add_dataflow(DataFlow::new("Worker", "Orders"));
        model.add_dataflow(DataFlow::new("Worker", "len"));
        model
    }

    #[test]
    fn test_resolves_known_names_only() {
        let index = sample().name_index();
        assert!(index.resolves("Worker"));
        assert!(index.resolves("Orders"));
        assert!(!index.resolves("len"));
    }

    #[test]
    fn test_dangling_positions() {
        let index = sample().name_index();
        assert_eq!(index.dangling_flow_positions(), &[1]);
        assert_eq!(index.unresolved_names(), vec!["len"]);
    }

    #[test]
    fn test_duplicate_names_listed() {
        let index = sample().name_index();
        assert_eq!(index.duplicate_names(), vec!["Orders"]);
        assert_eq!(index.nodes_named("Orders").len(), 2);
    }

    #[test]
    fn test_edges_follow_flows() {
        let index = sample().name_index();
        assert_eq!(index.graph.edge_count(), 2);
        assert_eq!(index.graph.node_count(), 4);
    }
}
