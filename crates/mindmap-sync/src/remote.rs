//! Remote document capability: write the whole map, subscribe to changes.
//!
//! A remote holds exactly one document. Every successful write is pushed to
//! every live subscription, including the writer's own.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use mindmap_tree::MindMap;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Buffered events per subscriber before older snapshots are dropped.
pub const SUBSCRIPTION_CAPACITY: usize = 64;

/// What a subscription delivers.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteEvent {
    /// The full document; `None` when it does not exist yet
    Snapshot(Option<MindMap>),
    /// The subscription broke
    Failed(String),
}

/// Owned handle on a remote subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    pending: Option<RemoteEvent>,
    rx: broadcast::Receiver<RemoteEvent>,
}

impl Subscription {
    /// A subscription that first yields `initial`, then whatever `rx` carries.
    pub fn new(initial: RemoteEvent, rx: broadcast::Receiver<RemoteEvent>) -> Self {
        Self {
            pending: Some(initial),
            rx,
        }
    }

    /// Wait for the next event. `None` once the remote has gone away.
    pub async fn recv(&mut self) -> Option<RemoteEvent> {
        if let Some(event) = self.pending.take() {
            return Some(event);
        }
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                // Each snapshot is complete, so skipping stale ones loses nothing.
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Subscription lagged, skipped {} snapshots", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-delivered event, without waiting.
    pub fn try_recv(&mut self) -> Option<RemoteEvent> {
        if let Some(event) = self.pending.take() {
            return Some(event);
        }
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!("Subscription lagged, skipped {} snapshots", skipped);
                }
                Err(_) => return None,
            }
        }
    }
}

/// A single remotely stored mind map document.
pub trait RemoteDocument {
    /// Replace the document with `map`.
    fn write(&self, map: &MindMap) -> impl Future<Output = Result<()>> + Send;

    /// Start receiving the document. The first event is its current state.
    fn subscribe(&self) -> Result<Subscription>;
}

#[derive(Debug)]
struct MemoryInner {
    document: RwLock<Option<MindMap>>,
    tx: broadcast::Sender<RemoteEvent>,
    available: AtomicBool,
    writes: AtomicUsize,
}

/// In-process remote document. Clones share the same document.
///
/// Can be switched unavailable to stand in for an unreachable backend.
#[derive(Debug, Clone)]
pub struct MemoryDocumentStore {
    inner: Arc<MemoryInner>,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    /// An empty store: the document does not exist yet.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SUBSCRIPTION_CAPACITY);
        Self {
            inner: Arc::new(MemoryInner {
                document: RwLock::new(None),
                tx,
                available: AtomicBool::new(true),
                writes: AtomicUsize::new(0),
            }),
        }
    }

    /// A store already holding `map`.
    pub fn with_document(map: MindMap) -> Self {
        let store = Self::new();
        if let Ok(mut doc) = store.inner.document.write() {
            *doc = Some(map);
        }
        store
    }

    /// Current document, if any.
    pub fn document(&self) -> Option<MindMap> {
        self.inner.document.read().ok().and_then(|doc| doc.clone())
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Make writes and new subscriptions fail (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    /// Break every live subscription with `reason`.
    pub fn fail_subscribers(&self, reason: &str) {
        let _ = self.inner.tx.send(RemoteEvent::Failed(reason.to_string()));
    }

    fn check_available(&self) -> Result<()> {
        if self.inner.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::Remote("document store unavailable".into()))
        }
    }
}

impl RemoteDocument for MemoryDocumentStore {
    async fn write(&self, map: &MindMap) -> Result<()> {
        self.check_available()?;
        let mut doc = self
            .inner
            .document
            .write()
            .map_err(|_| Error::Remote("document lock poisoned".into()))?;
        *doc = Some(map.clone());
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        // No receivers is fine; nobody is listening.
        let _ = self.inner.tx.send(RemoteEvent::Snapshot(Some(map.clone())));
        debug!("Memory document written ({} nodes)", map.len());
        Ok(())
    }

    fn subscribe(&self) -> Result<Subscription> {
        self.check_available()?;
        // Holding the read lock keeps a concurrent write from slipping
        // between the initial snapshot and the receiver.
        let doc = self
            .inner
            .document
            .read()
            .map_err(|_| Error::Remote("document lock poisoned".into()))?;
        let rx = self.inner.tx.subscribe();
        Ok(Subscription::new(RemoteEvent::Snapshot(doc.clone()), rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmap_tree::Point;

    fn sample() -> MindMap {
        let mut map = MindMap::new();
        map.add_root("Root Node", Point::ORIGIN).unwrap();
        map
    }

    #[tokio::test]
    async fn first_event_is_current_document() {
        let store = MemoryDocumentStore::new();
        let mut sub = store.subscribe().unwrap();
        assert_eq!(sub.try_recv(), Some(RemoteEvent::Snapshot(None)));
        assert_eq!(sub.try_recv(), None);

        let store = MemoryDocumentStore::with_document(sample());
        let mut sub = store.subscribe().unwrap();
        assert!(matches!(sub.recv().await, Some(RemoteEvent::Snapshot(Some(_)))));
    }

    #[tokio::test]
    async fn writes_echo_to_every_subscriber() {
        let store = MemoryDocumentStore::new();
        let mut a = store.subscribe().unwrap();
        let mut b = store.clone().subscribe().unwrap();
        a.try_recv();
        b.try_recv();

        let map = sample();
        store.write(&map).await.unwrap();

        assert_eq!(a.recv().await, Some(RemoteEvent::Snapshot(Some(map.clone()))));
        assert_eq!(b.try_recv(), Some(RemoteEvent::Snapshot(Some(map.clone()))));
        assert_eq!(store.document(), Some(map));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn unavailable_store_rejects() {
        let store = MemoryDocumentStore::new();
        store.set_available(false);
        assert!(matches!(store.write(&sample()).await, Err(Error::Remote(_))));
        assert!(store.subscribe().is_err());
        assert_eq!(store.write_count(), 0);

        store.set_available(true);
        assert!(store.write(&sample()).await.is_ok());
    }

    #[tokio::test]
    async fn lagging_subscriber_keeps_latest() {
        let store = MemoryDocumentStore::new();
        let mut sub = store.subscribe().unwrap();
        sub.try_recv();

        let mut map = sample();
        for _ in 0..SUBSCRIPTION_CAPACITY + 10 {
            let root = map.root_node_id().cloned().unwrap();
            map.add_child(&root, "n", None);
            store.write(&map).await.unwrap();
        }

        let mut last = None;
        while let Some(event) = sub.try_recv() {
            last = Some(event);
        }
        assert_eq!(last, Some(RemoteEvent::Snapshot(Some(map))));
    }

    #[test]
    fn dropping_subscription_releases_receiver() {
        let store = MemoryDocumentStore::new();
        let sub = store.subscribe().unwrap();
        assert_eq!(store.inner.tx.receiver_count(), 1);
        drop(sub);
        assert_eq!(store.inner.tx.receiver_count(), 0);
    }
}
