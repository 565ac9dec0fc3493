//! The mind map tree: a flat node map plus the designated root.
//!
//! All mutations are infallible. An operation whose precondition does not hold
//! (unknown id, a second root) leaves the map untouched and reports that
//! through its return value.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Result, TreeError};
use crate::geometry::Point;
use crate::id;
use crate::node::{Node, NodeId, NodeMap, NodePatch};
use crate::query;

/// Where a root goes when no position is given.
pub const DEFAULT_ROOT_POSITION: Point = Point::new(300.0, 200.0);

/// A whole mind map. Serializes as `{ "nodes": {...}, "rootNodeId": ... }`,
/// which is also the persisted document format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MindMap {
    nodes: NodeMap,
    root_node_id: Option<NodeId>,
}

impl MindMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a map from parts without checking invariants.
    pub fn from_parts(nodes: NodeMap, root_node_id: Option<NodeId>) -> Self {
        Self { nodes, root_node_id }
    }

    pub fn into_parts(self) -> (NodeMap, Option<NodeId>) {
        (self.nodes, self.root_node_id)
    }

    pub fn nodes(&self) -> &NodeMap {
        &self.nodes
    }

    pub fn root_node_id(&self) -> Option<&NodeId> {
        self.root_node_id.as_ref()
    }

    pub fn root(&self) -> Option<&Node> {
        self.root_node_id.as_ref().and_then(|id| self.nodes.get(id))
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Visible nodes in breadth-first order.
    pub fn visible(&self) -> Vec<&Node> {
        query::visible(&self.nodes, self.root_node_id.as_ref())
    }

    /// Deletion set for `id`.
    pub fn descendants(&self, id: &NodeId) -> Vec<NodeId> {
        query::descendants(&self.nodes, id)
    }

    /// Create the root. Returns `None` if a root already exists.
    pub fn add_root(&mut self, label: impl Into<String>, position: Point) -> Option<NodeId> {
        if self.root_node_id.is_some() {
            return None;
        }
        let root_id = id::generate();
        let node = Node::new(root_id.clone(), label, None, position);
        self.nodes.insert(root_id.clone(), node);
        self.root_node_id = Some(root_id.clone());
        Some(root_id)
    }

    /// Append a new child to `parent`.
    ///
    /// Without an explicit position the child is placed below its existing
    /// siblings. Returns `None` if the parent does not resolve.
    pub fn add_child(
        &mut self,
        parent: &NodeId,
        label: impl Into<String>,
        position: Option<Point>,
    ) -> Option<NodeId> {
        let parent_node = self.nodes.get(parent)?;
        let position = position.unwrap_or_else(|| {
            let siblings: Vec<Point> = parent_node
                .children
                .iter()
                .filter_map(|c| self.nodes.get(c))
                .map(|c| c.position)
                .collect();
            query::place_child(parent_node, &siblings)
        });

        let child_id = id::generate();
        let child = Node::new(child_id.clone(), label, Some(parent.clone()), position);
        self.nodes.insert(child_id.clone(), child);
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(child_id.clone());
        }
        Some(child_id)
    }

    /// Merge `patch` into a node. Returns `false` if the id does not resolve.
    pub fn update(&mut self, id: &NodeId, patch: NodePatch) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                patch.apply_to(node);
                true
            }
            None => false,
        }
    }

    /// Flip the collapsed flag.
    pub fn toggle_collapse(&mut self, id: &NodeId) -> bool {
        let Some(collapsed) = self.nodes.get(id).map(|n| n.collapsed) else {
            return false;
        };
        self.update(id, NodePatch::default().collapsed(!collapsed))
    }

    /// Delete a node and its whole subtree.
    ///
    /// Deleting the root clears the map. Returns the removed ids, or `None`
    /// when the id does not resolve.
    pub fn remove(&mut self, id: &NodeId) -> Option<Vec<NodeId>> {
        if !self.nodes.contains_key(id) {
            return None;
        }
        if self.root_node_id.as_ref() == Some(id) {
            let removed: Vec<NodeId> = self.nodes.keys().cloned().collect();
            self.clear();
            return Some(removed);
        }

        let removed = query::descendants(&self.nodes, id);
        let parent = self.nodes.get(id).and_then(|n| n.parent_id.clone());
        for gone in &removed {
            self.nodes.remove(gone);
        }
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| c != id);
        }
        Some(removed)
    }

    /// Drop every node and the root.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root_node_id = None;
    }

    /// Check every structural invariant, reporting the first violation.
    pub fn validate(&self) -> Result<()> {
        match &self.root_node_id {
            Some(root) => match self.nodes.get(root) {
                None => return Err(TreeError::DanglingRoot(root.clone())),
                Some(node) if node.parent_id.is_some() => {
                    return Err(TreeError::RootHasParent(root.clone()))
                }
                Some(_) => {}
            },
            None => {
                if let Some(first) = self.sorted_ids().into_iter().next() {
                    return Err(TreeError::OrphanRoot(first.clone()));
                }
                return Ok(());
            }
        }

        for id in self.sorted_ids() {
            let node = &self.nodes[id];
            match &node.parent_id {
                None if self.root_node_id.as_ref() != Some(id) => {
                    return Err(TreeError::OrphanRoot(id.clone()));
                }
                None => {}
                Some(parent) => {
                    let listed = self
                        .nodes
                        .get(parent)
                        .is_some_and(|p| p.children.contains(id));
                    if !listed {
                        return Err(TreeError::NotListedByParent {
                            child: id.clone(),
                            parent: parent.clone(),
                        });
                    }
                }
            }

            let mut seen = HashSet::new();
            for child in &node.children {
                if !seen.insert(child) {
                    return Err(TreeError::DuplicateChild {
                        parent: id.clone(),
                        child: child.clone(),
                    });
                }
                let Some(child_node) = self.nodes.get(child) else {
                    return Err(TreeError::MissingChild {
                        parent: id.clone(),
                        child: child.clone(),
                    });
                };
                if child_node.parent_id.as_ref() != Some(id) {
                    return Err(TreeError::ParentMismatch {
                        child: child.clone(),
                        listed_by: id.clone(),
                        parent: child_node.parent_id.clone(),
                    });
                }
            }
        }

        // Parent pointers agree with child lists, so anything not reached
        // from the root sits on a detached cycle.
        let reached: HashSet<NodeId> = self
            .root_node_id
            .as_ref()
            .map(|root| self.descendants(root).into_iter().collect())
            .unwrap_or_default();
        if let Some(lost) = self.sorted_ids().into_iter().find(|id| !reached.contains(*id)) {
            return Err(TreeError::Unreachable(lost.clone()));
        }

        Ok(())
    }

    fn sorted_ids(&self) -> Vec<&NodeId> {
        let mut ids: Vec<&NodeId> = self.nodes.keys().collect();
        ids.sort();
        ids
    }
}
