//! Node identifier generation.

use uuid::Uuid;

use crate::node::NodeId;

/// Generate a fresh, globally unique node id (UUID v4).
pub fn generate() -> NodeId {
    NodeId::new(Uuid::new_v4().to_string())
}
