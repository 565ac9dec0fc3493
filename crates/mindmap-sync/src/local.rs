//! Local durable fallback: two string-keyed slots.
//!
//! `mindMapNodes` holds the JSON node map and `mindMapRootNodeId` the JSON
//! root id (`null` when empty). Used when the remote is unreachable.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use mindmap_tree::{MindMap, NodeId, NodeMap};

use crate::error::{Error, Result};

/// Slot holding the serialized node map.
pub const NODES_SLOT: &str = "mindMapNodes";

/// Slot holding the serialized root id.
pub const ROOT_SLOT: &str = "mindMapRootNodeId";

/// Local save/load capability.
pub trait LocalFallback {
    /// Overwrite both slots with `map`.
    fn save(&self, map: &MindMap) -> Result<()>;

    /// Read the slots back. `None` when nothing was ever saved.
    fn load(&self) -> Result<Option<MindMap>>;
}

/// Serialize `map` into `(slot, json)` pairs.
pub fn encode_slots(map: &MindMap) -> Result<[(&'static str, String); 2]> {
    Ok([
        (NODES_SLOT, serde_json::to_string(map.nodes())?),
        (ROOT_SLOT, serde_json::to_string(&map.root_node_id())?),
    ])
}

/// Rebuild a map from raw slot contents. A missing slot reads as empty.
pub fn decode_slots(nodes: Option<&str>, root: Option<&str>) -> Result<Option<MindMap>> {
    if nodes.is_none() && root.is_none() {
        return Ok(None);
    }
    let nodes: NodeMap = serde_json::from_str(nodes.unwrap_or("{}"))?;
    let root: Option<NodeId> = serde_json::from_str(root.unwrap_or("null"))?;
    Ok(Some(MindMap::from_parts(nodes, root)))
}

/// In-memory slots. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryFallback {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryFallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw contents of a slot.
    pub fn slot(&self, key: &str) -> Option<String> {
        self.slots.lock().ok().and_then(|slots| slots.get(key).cloned())
    }

    /// Overwrite a raw slot.
    pub fn set_slot(&self, key: &str, value: impl Into<String>) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.insert(key.to_string(), value.into());
        }
    }
}

impl LocalFallback for MemoryFallback {
    fn save(&self, map: &MindMap) -> Result<()> {
        let encoded = encode_slots(map)?;
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| Error::Storage("fallback lock poisoned".into()))?;
        for (key, value) in encoded {
            slots.insert(key.to_string(), value);
        }
        Ok(())
    }

    fn load(&self) -> Result<Option<MindMap>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| Error::Storage("fallback lock poisoned".into()))?;
        decode_slots(
            slots.get(NODES_SLOT).map(String::as_str),
            slots.get(ROOT_SLOT).map(String::as_str),
        )
    }
}
