//! System model: the unified graph every parser populates and the engine reads

pub mod edges;
pub mod index;
pub mod nodes;

pub use edges::DataFlow;
pub use index::{IndexedNode, NameIndex, NodeRole};
pub use nodes::{Component, DataStore, ModelNode, DATASTORE_KIND};

use serde::{Deserialize, Serialize};

/// The aggregate architecture graph
///
/// Three ordered, append-only sequences. Nothing is validated on insert:
/// ids, kinds and boundary names are stored verbatim and flows may name
/// nodes that do not exist. Insertion order is kept because it decides the
/// tie-break order of the ranked threat list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemModel {
    components: Vec<Component>,
    datastores: Vec<DataStore>,
    dataflows: Vec<DataFlow>,
}

impl SystemModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_component(&mut self, component: Component) {
        self.components.push(component);
    }

    pub fn add_datastore(&mut self, datastore: DataStore) {
        self.datastores.push(datastore);
    }

    pub fn add_dataflow(&mut self, dataflow: DataFlow) {
        self.dataflows.push(dataflow);
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn datastores(&self) -> &[DataStore] {
        &self.datastores
    }

    pub fn dataflows(&self) -> &[DataFlow] {
        &self.dataflows
    }

    /// Number of components plus data stores
    pub fn node_count(&self) -> usize {
        self.components.len() + self.datastores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.datastores.is_empty() && self.dataflows.is_empty()
    }

    /// Append every entry of `other` after the entries already present.
    ///
    /// No identity reconciliation happens here: the same id emitted by two
    /// parsers (even with different kinds) ends up as two entries.
    pub fn merge(&mut self, other: SystemModel) {
        self.components.extend(other.components);
        self.datastores.extend(other.datastores);
        self.dataflows.extend(other.dataflows);
    }

    /// Merge a sequence of fragments in iteration order
    pub fn merge_all(fragments: impl IntoIterator<Item = SystemModel>) -> Self {
        let mut aggregate = Self::new();
        for fragment in fragments {
            aggregate.merge(fragment);
        }
        aggregate
    }

    /// Build a name-keyed index over this model
    pub fn name_index(&self) -> NameIndex {
        NameIndex::build(self)
    }

    /// Copy of this model without flows whose endpoints name no node.
    ///
    /// Used when the dangling-flow policy is `drop`; the model itself is
    /// never mutated.
    pub fn without_dangling_flows(&self) -> SystemModel {
        let index = self.name_index();
        SystemModel {
            components: self.components.clone(),
            datastores: self.datastores.clone(),
            dataflows: self
                .dataflows
                .iter()
                .filter(|flow| index.resolves(flow.source()) && index.resolves(flow.target()))
                .cloned()
                .collect(),
        }
    }
}
