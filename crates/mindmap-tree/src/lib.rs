//! Mind Map Tree
//!
//! The tree model behind the mind map canvas, stored the arena way: a flat
//! `id -> node` map where each node lists its children by id and points at its
//! parent by id. No node owns another.
//!
//! # Invariants
//!
//! - At most one node has no parent, and it is the designated root
//! - Every child id resolves, and the child points back at the node listing it
//! - No child list contains duplicates, no node is its own ancestor
//!
//! [`MindMap::validate`] checks all of them.
//!
//! # Queries
//!
//! The [`query`] module holds the pure functions the presentation layer uses
//! to derive what is on screen: [`visible`], [`descendants`], [`place_child`],
//! [`node_dimensions`], [`connectors`] and [`bounding_box`].

mod error;
mod geometry;
pub mod id;
mod label;
mod map;
mod node;
pub mod query;

pub use error::{LabelError, Result, TreeError};
pub use geometry::{Point, Rect, Size};
pub use label::{labels_equal, validate_label, DEFAULT_CHILD_LABEL, DEFAULT_ROOT_LABEL, MAX_LABEL_LEN};
pub use map::{MindMap, DEFAULT_ROOT_POSITION};
pub use node::{Node, NodeId, NodeMap, NodeMetadata, NodePatch};
pub use query::{
    bounding_box, connector_anchors, connectors, descendants, footprint, node_dimensions,
    place_child, visible, CHILD_GAP_Y, CHILD_OFFSET_X, NOMINAL_SIZE,
};
