//! Node types for the system model

use serde::{Deserialize, Serialize};

/// Kind tag used by the textual and diagram adapters for passive storage nodes.
pub const DATASTORE_KIND: &str = "datastore";

/// Shared read-only view over the two node variants.
///
/// Nodes are identified by plain names: `id` is whatever label the adapter
/// derived and is not guaranteed to be unique.
pub trait ModelNode {
    fn id(&self) -> &str;
    fn kind(&self) -> &str;
    fn boundary(&self) -> Option<&str>;
}

/// An active element of the architecture (service, function, actor, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Component {
    id: String,

    /// Open tag: api, component, actor, usecase, class, function, or a raw
    /// resource type from an infrastructure template
    #[serde(rename = "type")]
    kind: String,

    /// Name of the trust boundary this element was declared in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    boundary: Option<String>,
}

impl Component {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            boundary: None,
        }
    }

    pub fn with_boundary(mut self, boundary: Option<String>) -> Self {
        self.boundary = boundary;
        self
    }
}

impl ModelNode for Component {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        &self.kind
    }

    fn boundary(&self) -> Option<&str> {
        self.boundary.as_deref()
    }
}

/// A passive storage element (database, bucket, schema)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataStore {
    id: String,

    #[serde(rename = "type")]
    kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    boundary: Option<String>,
}

impl DataStore {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            boundary: None,
        }
    }

    pub fn with_boundary(mut self, boundary: Option<String>) -> Self {
        self.boundary = boundary;
        self
    }
}

impl ModelNode for DataStore {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        &self.kind
    }

    fn boundary(&self) -> Option<&str> {
        self.boundary.as_deref()
    }
}
