//! Persistent storage using RocksDB.
//!
//! One database serves both sides: the durable document store (keys under
//! `doc:`) and the local fallback slots (keys under `local:`).

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use mindmap_tree::MindMap;
use rocksdb::{Options, DB};
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{Error, Result};
use crate::local::{decode_slots, encode_slots, LocalFallback, NODES_SLOT, ROOT_SLOT};
use crate::remote::{RemoteDocument, RemoteEvent, Subscription, SUBSCRIPTION_CAPACITY};

/// Notification channel and write gate shared by every handle on a document.
#[derive(Clone)]
struct DocumentChannel {
    tx: broadcast::Sender<RemoteEvent>,
    // Orders write+notify against read+subscribe.
    gate: Arc<Mutex<()>>,
}

impl DocumentChannel {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(SUBSCRIPTION_CAPACITY);
        Self {
            tx,
            gate: Arc::new(Mutex::new(())),
        }
    }
}

/// Storage backend for mind map data.
#[derive(Clone)]
pub struct Storage {
    db: Arc<DB>,
    channels: Arc<Mutex<HashMap<String, DocumentChannel>>>,
}

impl Storage {
    /// Open or create storage at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;
        Ok(Self {
            db: Arc::new(db),
            channels: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Local fallback slots in this database.
    pub fn fallback(&self) -> RocksFallback {
        RocksFallback {
            db: Arc::clone(&self.db),
        }
    }

    /// The document stored under `document_id`.
    ///
    /// Every handle for the same id shares one notification channel, so
    /// subscribers see writes made through any of them.
    pub fn document(&self, document_id: &str) -> RocksDocumentStore {
        // The map only ever gains entries, so a poisoned lock is still usable.
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let channel = channels
            .entry(document_id.to_string())
            .or_insert_with(DocumentChannel::new)
            .clone();
        RocksDocumentStore {
            db: Arc::clone(&self.db),
            key: format!("doc:{}", document_id),
            tx: channel.tx,
            gate: channel.gate,
        }
    }
}

/// Local fallback backed by RocksDB.
#[derive(Clone)]
pub struct RocksFallback {
    db: Arc<DB>,
}

fn slot_key(slot: &str) -> String {
    format!("local:{}", slot)
}

impl RocksFallback {
    fn get_slot(&self, slot: &str) -> Result<Option<String>> {
        match self.db.get(slot_key(slot).as_bytes())? {
            Some(data) => String::from_utf8(data)
                .map(Some)
                .map_err(|e| Error::Storage(format!("slot {} is not UTF-8: {}", slot, e))),
            None => Ok(None),
        }
    }
}

impl LocalFallback for RocksFallback {
    fn save(&self, map: &MindMap) -> Result<()> {
        let mut batch = rocksdb::WriteBatch::default();
        for (slot, value) in encode_slots(map)? {
            batch.put(slot_key(slot).as_bytes(), value.as_bytes());
        }
        self.db.write(batch)?;
        debug!("Saved {} nodes to local fallback", map.len());
        Ok(())
    }

    fn load(&self) -> Result<Option<MindMap>> {
        let nodes = self.get_slot(NODES_SLOT)?;
        let root = self.get_slot(ROOT_SLOT)?;
        decode_slots(nodes.as_deref(), root.as_deref())
    }
}

/// Durable remote document. Subscribers are notified in-process.
#[derive(Clone)]
pub struct RocksDocumentStore {
    db: Arc<DB>,
    key: String,
    tx: broadcast::Sender<RemoteEvent>,
    // Orders write+notify against read+subscribe.
    gate: Arc<Mutex<()>>,
}

impl RocksDocumentStore {
    /// Read the stored document.
    pub fn read(&self) -> Result<Option<MindMap>> {
        match self.db.get(self.key.as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }
}

impl RemoteDocument for RocksDocumentStore {
    async fn write(&self, map: &MindMap) -> Result<()> {
        let value = serde_json::to_vec(map)?;
        let _gate = self
            .gate
            .lock()
            .map_err(|_| Error::Storage("document gate poisoned".into()))?;
        self.db.put(self.key.as_bytes(), value)?;
        let _ = self.tx.send(RemoteEvent::Snapshot(Some(map.clone())));
        debug!("Document {} written ({} nodes)", self.key, map.len());
        Ok(())
    }

    fn subscribe(&self) -> Result<Subscription> {
        let _gate = self
            .gate
            .lock()
            .map_err(|_| Error::Storage("document gate poisoned".into()))?;
        let current = self.read()?;
        Ok(Subscription::new(RemoteEvent::Snapshot(current), self.tx.subscribe()))
    }
}
