//! Node model.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::geometry::{Point, Size};

/// Storage for a whole tree: flat id to node map.
pub type NodeMap = HashMap<NodeId, Node>;

/// Opaque node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Auxiliary per-node flags. Never affects tree structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Favorite marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,

    /// Any other flags written by other clients, kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl NodeMetadata {
    pub fn is_starred(&self) -> bool {
        self.starred.unwrap_or(false)
    }
}

/// A single labeled unit of the mind map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier, fixed for the node's lifetime
    pub id: NodeId,

    /// User-visible text
    pub label: String,

    /// Owning node; `None` only for the root
    pub parent_id: Option<NodeId>,

    /// Ordered child ids
    #[serde(default)]
    pub children: Vec<NodeId>,

    /// Position in logical canvas space
    pub position: Point,

    /// Hides the subtree when set
    #[serde(default)]
    pub collapsed: bool,

    /// Last measured rendered footprint, may be stale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
}

impl Node {
    /// Create a leaf node.
    pub fn new(id: NodeId, label: impl Into<String>, parent_id: Option<NodeId>, position: Point) -> Self {
        Self {
            id,
            label: label.into(),
            parent_id,
            children: Vec::new(),
            position,
            collapsed: false,
            size: None,
            metadata: None,
        }
    }

    /// Whether this node carries no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_starred(&self) -> bool {
        self.metadata.as_ref().is_some_and(NodeMetadata::is_starred)
    }
}

/// Partial update for [`Node`]. Identity, parent and children are not patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub label: Option<String>,
    pub position: Option<Point>,
    pub collapsed: Option<bool>,
    pub size: Option<Size>,
    pub metadata: Option<NodeMetadata>,
}

impl NodePatch {
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = Some(collapsed);
        self
    }

    #[must_use]
    pub fn size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn metadata(mut self, metadata: NodeMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// True when the patch sets nothing.
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.position.is_none()
            && self.collapsed.is_none()
            && self.size.is_none()
            && self.metadata.is_none()
    }

    pub(crate) fn apply_to(self, node: &mut Node) {
        if let Some(label) = self.label {
            node.label = label;
        }
        if let Some(position) = self.position {
            node.position = position;
        }
        if let Some(collapsed) = self.collapsed {
            node.collapsed = collapsed;
        }
        if let Some(size) = self.size {
            node.size = Some(size);
        }
        if let Some(metadata) = self.metadata {
            node.metadata = Some(metadata);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_camel_case() {
        let node = Node::new("a".into(), "Root Node", None, Point::new(300.0, 200.0));
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["parentId"], serde_json::Value::Null);
        assert_eq!(json["position"]["x"], 300.0);
        assert!(json.get("size").is_none());
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn metadata_keeps_unknown_flags() {
        let json = r#"{"starred":true,"color":"red"}"#;
        let meta: NodeMetadata = serde_json::from_str(json).unwrap();
        assert!(meta.is_starred());
        assert_eq!(meta.extra["color"], "red");

        let back = serde_json::to_value(&meta).unwrap();
        assert_eq!(back["color"], "red");
    }

    #[test]
    fn patch_leaves_unset_fields() {
        let mut node = Node::new("a".into(), "old", None, Point::ORIGIN);
        NodePatch::default().collapsed(true).apply_to(&mut node);

        assert!(node.collapsed);
        assert_eq!(node.label, "old");
        assert_eq!(node.position, Point::ORIGIN);
    }
}
