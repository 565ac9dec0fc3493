//! The mind map store.
//!
//! Owns the canonical tree, the viewport, selection/editing state and the sync
//! status. Every mutation is two-phase: the in-memory tree changes first, then
//! the whole tree is written to the remote document. A failed write leaves the
//! local change in place and shows up as [`SyncStatus::Error`]; nothing rolls
//! back.
//!
//! Inbound snapshots replace the tree wholesale. There is no merge with
//! pending local changes, so concurrent writers resolve last-write-wins.

use mindmap_canvas::{DVec2, Viewport};
use mindmap_tree::{
    labels_equal, validate_label, LabelError, MindMap, NodeId, NodeMap, NodePatch,
    Point, Size, DEFAULT_CHILD_LABEL, DEFAULT_ROOT_LABEL, DEFAULT_ROOT_POSITION,
};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::local::LocalFallback;
use crate::remote::{RemoteDocument, RemoteEvent, Subscription, SUBSCRIPTION_CAPACITY};
use crate::status::{SyncSignal, SyncStatus};

/// Mind map state plus its persistence adapters.
pub struct MindMapStore<R, L> {
    map: MindMap,
    selected: Option<NodeId>,
    editing: Option<NodeId>,
    status: SyncStatus,
    status_tx: broadcast::Sender<SyncStatus>,
    viewport: Viewport,
    remote: R,
    local: L,
    subscription: Option<Subscription>,
    // Set after a subscription failure; cleared by a successful restart.
    local_only: bool,
}

impl<R: RemoteDocument, L: LocalFallback> MindMapStore<R, L> {
    /// An empty store waiting for its first snapshot.
    pub fn new(remote: R, local: L) -> Self {
        let (status_tx, _) = broadcast::channel(SUBSCRIPTION_CAPACITY);
        Self {
            map: MindMap::new(),
            selected: None,
            editing: None,
            status: SyncStatus::InitialLoad,
            status_tx,
            viewport: Viewport::default(),
            remote,
            local,
            subscription: None,
            local_only: false,
        }
    }

    // --- Getters ---

    pub fn map(&self) -> &MindMap {
        &self.map
    }

    pub fn nodes(&self) -> &NodeMap {
        self.map.nodes()
    }

    pub fn root_node_id(&self) -> Option<&NodeId> {
        self.map.root_node_id()
    }

    pub fn selected_node_id(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn editing_node_id(&self) -> Option<&NodeId> {
        self.editing.as_ref()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.status
    }

    /// Every status change from now on, in order.
    pub fn status_changes(&self) -> broadcast::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn canvas_offset(&self) -> DVec2 {
        self.viewport.offset
    }

    pub fn canvas_scale(&self) -> f64 {
        self.viewport.scale
    }

    /// Whether a remote subscription is live.
    pub fn is_listening(&self) -> bool {
        self.subscription.is_some()
    }

    /// Whether the store gave up on the remote after a subscription failure.
    pub fn is_local_only(&self) -> bool {
        self.local_only
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    // --- Remote listener ---

    /// Subscribe to the remote document, replacing any existing subscription.
    ///
    /// Calling this again after a failure is the manual retry. A live
    /// subscription puts the store back into `initial_load` until its first
    /// snapshot arrives.
    pub fn start_listener(&mut self) {
        self.stop_listener();
        match self.remote.subscribe() {
            Ok(subscription) => {
                info!("Remote listener started");
                self.subscription = Some(subscription);
                self.local_only = false;
                self.set_status(SyncStatus::InitialLoad);
            }
            Err(e) => self.subscription_failed(&e.to_string()),
        }
    }

    /// Drop the subscription. No further remote snapshots are applied.
    pub fn stop_listener(&mut self) {
        if self.subscription.take().is_some() {
            info!("Remote listener stopped");
        }
    }

    /// Wait for the next remote event and apply it.
    ///
    /// Returns the resulting status, or `None` when there is no live
    /// subscription (or the remote closed it).
    pub async fn next_remote(&mut self) -> Option<SyncStatus> {
        let event = match self.subscription.as_mut() {
            Some(subscription) => subscription.recv().await,
            None => return None,
        };
        match event {
            Some(event) => {
                self.apply_remote(event);
                Some(self.status)
            }
            None => {
                warn!("Remote closed the subscription");
                self.subscription = None;
                None
            }
        }
    }

    /// Apply every event already delivered, without waiting. Returns how many.
    pub fn drain_remote(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.subscription.as_mut().and_then(Subscription::try_recv) {
            self.apply_remote(event);
            applied += 1;
        }
        applied
    }

    /// Reconcile with a remote event. Snapshots are authoritative.
    pub fn apply_remote(&mut self, event: RemoteEvent) {
        match event {
            RemoteEvent::Snapshot(document) => {
                let map = document.unwrap_or_default();
                if let Err(e) = map.validate() {
                    warn!("Remote snapshot violates tree invariants: {}", e);
                }
                debug!("Applying remote snapshot ({} nodes)", map.len());
                self.replace_map(map);
                self.transition(SyncSignal::SnapshotReceived);
            }
            RemoteEvent::Failed(reason) => self.subscription_failed(&reason),
        }
    }

    fn subscription_failed(&mut self, reason: &str) {
        error!("Remote subscription failed: {}", reason);
        self.subscription = None;
        self.local_only = true;
        self.transition(SyncSignal::SubscriptionFailed);
        self.load_local();
    }

    // --- Connectivity ---

    /// Connectivity went away: go offline and save the tree locally.
    pub fn connectivity_lost(&mut self) {
        self.transition(SyncSignal::ConnectivityLost);
        self.save_local();
    }

    /// Connectivity came back. Does not write by itself; the next mutation
    /// does, unless the store is still local-only.
    pub fn connectivity_restored(&mut self) {
        self.transition(SyncSignal::ConnectivityRestored);
    }

    // --- Selection ---

    /// Select a node, or clear the selection. Unknown ids are ignored.
    pub fn select(&mut self, id: Option<NodeId>) -> bool {
        match id {
            Some(id) if !self.map.contains(&id) => false,
            id => {
                self.selected = id;
                true
            }
        }
    }

    /// Start editing a node's label, or stop. Unknown ids are ignored.
    pub fn set_editing(&mut self, id: Option<NodeId>) -> bool {
        match id {
            Some(id) if !self.map.contains(&id) => false,
            id => {
                self.editing = id;
                true
            }
        }
    }

    // --- Mutations ---

    /// Create the root at the default position.
    pub async fn add_root(&mut self) -> Option<NodeId> {
        self.add_root_at(DEFAULT_ROOT_POSITION).await
    }

    /// Create the root at `position` and select it. No-op if a root exists.
    pub async fn add_root_at(&mut self, position: Point) -> Option<NodeId> {
        let Some(id) = self.map.add_root(DEFAULT_ROOT_LABEL, position) else {
            debug!("Root already exists, not adding another");
            return None;
        };
        debug!("Added root {}", id);
        self.selected = Some(id.clone());
        self.persist().await;
        Some(id)
    }

    /// Append a child below its siblings and select it.
    pub async fn add_child(&mut self, parent: &NodeId) -> Option<NodeId> {
        self.insert_child(parent, None).await
    }

    /// Append a child at `position` and select it.
    pub async fn add_child_at(&mut self, parent: &NodeId, position: Point) -> Option<NodeId> {
        self.insert_child(parent, Some(position)).await
    }

    async fn insert_child(&mut self, parent: &NodeId, position: Option<Point>) -> Option<NodeId> {
        let Some(id) = self.map.add_child(parent, DEFAULT_CHILD_LABEL, position) else {
            debug!("Parent {} not found, child not added", parent);
            return None;
        };
        debug!("Added node {} under {}", id, parent);
        self.selected = Some(id.clone());
        self.persist().await;
        Some(id)
    }

    /// Add a node where the pointer is: a child of the root, or the root
    /// itself when the map is empty.
    pub async fn add_at_device_point(&mut self, device: DVec2) -> Option<NodeId> {
        let position = self.viewport.to_logical(device);
        match self.map.root_node_id().cloned() {
            Some(root) => self.add_child_at(&root, position).await,
            None => self.add_root_at(position).await,
        }
    }

    /// Merge `patch` into a node and persist.
    pub async fn update_node(&mut self, id: &NodeId, patch: NodePatch) -> bool {
        if !self.map.update(id, patch) {
            debug!("Node {} not found, update skipped", id);
            return false;
        }
        self.persist().await;
        true
    }

    /// Validate and store a new label, ending any edit of this node.
    ///
    /// Returns `Ok(false)` without writing when the node is unknown or the
    /// trimmed label is unchanged.
    pub async fn rename_node(&mut self, id: &NodeId, input: &str) -> Result<bool, LabelError> {
        let label = validate_label(input)?;
        if self.editing.as_ref() == Some(id) {
            self.editing = None;
        }
        let unchanged = match self.map.get(id) {
            Some(node) => labels_equal(&node.label, &label),
            None => return Ok(false),
        };
        if unchanged {
            return Ok(false);
        }
        Ok(self.update_node(id, NodePatch::default().label(label)).await)
    }

    /// Flip a node's collapsed flag.
    pub async fn toggle_collapse(&mut self, id: &NodeId) -> bool {
        let Some(collapsed) = self.map.get(id).map(|n| n.collapsed) else {
            return false;
        };
        self.update_node(id, NodePatch::default().collapsed(!collapsed)).await
    }

    /// Flip a node's starred marker.
    pub async fn toggle_starred(&mut self, id: &NodeId) -> bool {
        let Some(node) = self.map.get(id) else {
            return false;
        };
        let mut metadata = node.metadata.clone().unwrap_or_default();
        metadata.starred = Some(!metadata.is_starred());
        self.update_node(id, NodePatch::default().metadata(metadata)).await
    }

    /// Move a node to a logical position.
    pub async fn move_node(&mut self, id: &NodeId, position: Point) -> bool {
        self.update_node(id, NodePatch::default().position(position)).await
    }

    /// Move a node by a drag delta measured in device pixels.
    pub async fn drag_node(&mut self, id: &NodeId, device_delta: DVec2) -> bool {
        let Some(node) = self.map.get(id) else {
            return false;
        };
        let position = node.position + self.viewport.logical_delta(device_delta);
        self.move_node(id, position).await
    }

    /// Record a measured footprint. Derived data, so nothing is written.
    pub fn record_node_size(&mut self, id: &NodeId, size: Size) -> bool {
        self.map.update(id, NodePatch::default().size(size))
    }

    /// Delete a node with its subtree; deleting the root resets the map.
    pub async fn delete_node(&mut self, id: &NodeId) -> bool {
        if !self.map.contains(id) {
            debug!("Node {} not found, delete skipped", id);
            return false;
        }
        if self.map.root_node_id() == Some(id) {
            self.reset_map().await;
            return true;
        }
        if let Some(removed) = self.map.remove(id) {
            debug!("Deleted {} nodes under {}", removed.len(), id);
            if self.editing.as_ref().is_some_and(|e| removed.contains(e)) {
                self.editing = None;
            }
        }
        self.selected = None;
        self.persist().await;
        true
    }

    /// Clear the whole map unconditionally.
    pub async fn reset_map(&mut self) {
        debug!("Resetting map");
        self.map.clear();
        self.selected = None;
        self.editing = None;
        self.persist().await;
    }

    // --- Viewport ---

    pub fn pan(&mut self, delta: DVec2) {
        self.viewport.pan(delta);
    }

    pub fn set_scale(&mut self, scale: f64) -> bool {
        self.viewport.set_scale(scale)
    }

    pub fn zoom_at(&mut self, anchor: DVec2, scale: f64) -> bool {
        self.viewport.zoom_at(anchor, scale)
    }

    pub fn wheel(&mut self, anchor: DVec2, delta_y: f64) {
        self.viewport.wheel(anchor, delta_y);
    }

    /// Fit every visible node into a viewport of `size` pixels.
    pub fn zoom_to_fit(&mut self, size: DVec2) -> bool {
        self.viewport
            .zoom_to_fit(self.map.nodes(), self.map.root_node_id(), size)
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    // --- Persistence ---

    /// Write the whole tree. Offline or local-only, the local fallback takes it.
    async fn persist(&mut self) {
        if self.local_only || self.status == SyncStatus::Offline {
            self.save_local();
            return;
        }
        self.transition(SyncSignal::WriteStarted);
        match self.remote.write(&self.map).await {
            Ok(()) => self.transition(SyncSignal::WriteSucceeded),
            Err(e) => {
                warn!("Remote write failed, keeping local changes: {}", e);
                self.transition(SyncSignal::WriteFailed);
                self.save_local();
            }
        }
    }

    fn save_local(&self) {
        if let Err(e) = self.local.save(&self.map) {
            error!("Failed to save mind map locally: {}", e);
        }
    }

    fn load_local(&mut self) {
        match self.local.load() {
            Ok(Some(map)) => {
                info!("Loaded {} nodes from local fallback", map.len());
                self.replace_map(map);
            }
            Ok(None) => debug!("Local fallback is empty"),
            Err(e) => error!("Failed to load mind map from local fallback: {}", e),
        }
    }

    fn replace_map(&mut self, map: MindMap) {
        self.map = map;
        if self.selected.as_ref().is_some_and(|id| !self.map.contains(id)) {
            self.selected = None;
        }
        if self.editing.as_ref().is_some_and(|id| !self.map.contains(id)) {
            self.editing = None;
        }
    }

    fn transition(&mut self, signal: SyncSignal) {
        let next = self.status.next(signal);
        if next != self.status {
            debug!("Sync status {} -> {} ({:?})", self.status, next, signal);
        }
        self.set_status(next);
    }

    fn set_status(&mut self, status: SyncStatus) {
        if status == self.status {
            return;
        }
        self.status = status;
        // Nobody watching is fine.
        let _ = self.status_tx.send(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::MemoryFallback;
    use crate::remote::MemoryDocumentStore;

    type TestStore = MindMapStore<MemoryDocumentStore, MemoryFallback>;

    fn store() -> (TestStore, MemoryDocumentStore, MemoryFallback) {
        let remote = MemoryDocumentStore::new();
        let local = MemoryFallback::new();
        (MindMapStore::new(remote.clone(), local.clone()), remote, local)
    }

    async fn online() -> (TestStore, MemoryDocumentStore, MemoryFallback) {
        let (mut store, remote, local) = store();
        store.start_listener();
        store.drain_remote();
        (store, remote, local)
    }

    #[test]
    fn starts_in_initial_load() {
        let (store, _, _) = store();
        assert_eq!(store.sync_status(), SyncStatus::InitialLoad);
        assert!(store.map().is_empty());
        assert_eq!(store.canvas_scale(), 1.0);
        assert_eq!(store.canvas_offset(), DVec2::ZERO);
    }

    #[tokio::test]
    async fn first_snapshot_goes_online() {
        let (mut store, _, _) = store();
        store.start_listener();
        assert!(store.is_listening());
        assert_eq!(store.sync_status(), SyncStatus::InitialLoad);

        assert_eq!(store.next_remote().await, Some(SyncStatus::Online));
        assert!(store.map().is_empty());
    }

    #[tokio::test]
    async fn existing_document_is_loaded() {
        let mut map = MindMap::new();
        let root = map.add_root("Saved", Point::ORIGIN).unwrap();
        let remote = MemoryDocumentStore::with_document(map.clone());
        let mut store = MindMapStore::new(remote, MemoryFallback::new());

        store.start_listener();
        assert_eq!(store.drain_remote(), 1);
        assert_eq!(store.map(), &map);
        assert_eq!(store.root_node_id(), Some(&root));
    }

    #[tokio::test]
    async fn add_root_selects_and_writes() {
        let (mut store, remote, _) = online().await;
        let root = store.add_root().await.unwrap();

        assert_eq!(store.selected_node_id(), Some(&root));
        assert_eq!(store.sync_status(), SyncStatus::Online);
        assert_eq!(remote.document().unwrap().root_node_id(), Some(&root));
        assert_eq!(store.map().get(&root).unwrap().position, DEFAULT_ROOT_POSITION);
    }

    #[tokio::test]
    async fn second_root_changes_nothing() {
        let (mut store, remote, _) = online().await;
        let root = store.add_root().await.unwrap();
        let before = store.map().clone();

        assert!(store.add_root_at(Point::ORIGIN).await.is_none());
        assert_eq!(store.map(), &before);
        assert_eq!(store.root_node_id(), Some(&root));
        assert_eq!(remote.write_count(), 1);
    }

    #[tokio::test]
    async fn unknown_ids_are_noops() {
        let (mut store, remote, _) = online().await;
        let ghost = NodeId::from("ghost");
        assert!(store.add_child(&ghost).await.is_none());
        assert!(!store.update_node(&ghost, NodePatch::default().label("x")).await);
        assert!(!store.toggle_collapse(&ghost).await);
        assert!(!store.delete_node(&ghost).await);
        assert!(!store.select(Some(ghost)));
        assert_eq!(remote.write_count(), 0);
    }

    #[tokio::test]
    async fn failed_write_keeps_local_edit() {
        let (mut store, remote, local) = online().await;
        let root = store.add_root().await.unwrap();

        remote.set_available(false);
        assert!(store.update_node(&root, NodePatch::default().label("Ideas")).await);
        assert_eq!(store.map().get(&root).unwrap().label, "Ideas");
        assert_eq!(store.sync_status(), SyncStatus::Error);
        assert_eq!(local.load().unwrap().as_ref(), Some(store.map()));

        remote.set_available(true);
        assert!(store.toggle_collapse(&root).await);
        assert_eq!(store.sync_status(), SyncStatus::Online);
        assert_eq!(remote.document().unwrap().get(&root).unwrap().label, "Ideas");
    }

    #[tokio::test]
    async fn subscription_failure_falls_back_to_local() {
        let mut saved = MindMap::new();
        saved.add_root("Offline copy", Point::ORIGIN).unwrap();
        let local = MemoryFallback::new();
        local.save(&saved).unwrap();

        let remote = MemoryDocumentStore::new();
        remote.set_available(false);
        let mut store = MindMapStore::new(remote.clone(), local.clone());
        store.start_listener();

        assert_eq!(store.sync_status(), SyncStatus::Error);
        assert!(store.is_local_only());
        assert!(!store.is_listening());
        assert_eq!(store.map(), &saved);

        let root = store.root_node_id().cloned().unwrap();
        store.add_child(&root).await.unwrap();
        assert_eq!(remote.write_count(), 0);
        assert_eq!(local.load().unwrap().unwrap().len(), 2);
        assert_eq!(store.sync_status(), SyncStatus::Error);

        remote.set_available(true);
        store.start_listener();
        assert!(!store.is_local_only());
        store.drain_remote();
        assert_eq!(store.sync_status(), SyncStatus::Online);
        assert!(store.map().is_empty());
    }

    #[tokio::test]
    async fn broken_subscription_mid_session() {
        let (mut store, remote, local) = online().await;
        store.add_root().await.unwrap();
        local.save(&store.map().clone()).unwrap();

        remote.fail_subscribers("permission denied");
        store.drain_remote();
        assert_eq!(store.sync_status(), SyncStatus::Error);
        assert!(!store.is_listening());
        assert_eq!(store.map().len(), 1);
    }

    #[tokio::test]
    async fn offline_edits_stay_local() {
        let (mut store, remote, local) = online().await;
        let root = store.add_root().await.unwrap();
        let writes = remote.write_count();

        store.connectivity_lost();
        assert_eq!(store.sync_status(), SyncStatus::Offline);
        assert_eq!(local.load().unwrap().as_ref(), Some(store.map()));

        let child = store.add_child(&root).await.unwrap();
        assert_eq!(store.sync_status(), SyncStatus::Offline);
        assert_eq!(remote.write_count(), writes);
        assert!(local.load().unwrap().unwrap().contains(&child));

        store.connectivity_restored();
        assert_eq!(store.sync_status(), SyncStatus::Online);
        assert_eq!(remote.write_count(), writes);

        store.toggle_collapse(&root).await;
        assert!(remote.document().unwrap().contains(&child));
    }

    #[tokio::test]
    async fn remote_snapshot_wins() {
        let (mut store, remote, _) = online().await;
        let root = store.add_root().await.unwrap();
        store.drain_remote();
        assert_eq!(store.selected_node_id(), Some(&root));

        let mut theirs = MindMap::new();
        theirs.add_root("Theirs", Point::ORIGIN).unwrap();
        remote.write(&theirs).await.unwrap();

        assert_eq!(store.next_remote().await, Some(SyncStatus::Online));
        assert_eq!(store.map(), &theirs);
        assert_eq!(store.selected_node_id(), None);
    }

    #[tokio::test]
    async fn stopped_listener_ignores_remote() {
        let (mut store, remote, _) = online().await;
        store.stop_listener();

        let mut theirs = MindMap::new();
        theirs.add_root("Theirs", Point::ORIGIN).unwrap();
        remote.write(&theirs).await.unwrap();

        assert_eq!(store.drain_remote(), 0);
        assert_eq!(store.next_remote().await, None);
        assert!(store.map().is_empty());
    }

    #[tokio::test]
    async fn delete_clears_selection_and_editing() {
        let (mut store, _, _) = online().await;
        let root = store.add_root().await.unwrap();
        let a = store.add_child(&root).await.unwrap();
        let a1 = store.add_child(&a).await.unwrap();
        store.set_editing(Some(a1.clone()));

        assert!(store.delete_node(&a).await);
        assert_eq!(store.selected_node_id(), None);
        assert_eq!(store.editing_node_id(), None);
        assert!(store.map().get(&root).unwrap().children.is_empty());
        assert!(!store.map().contains(&a1));
    }

    #[tokio::test]
    async fn rename_validates_and_skips_noops() {
        let (mut store, remote, _) = online().await;
        let root = store.add_root().await.unwrap();
        let writes = remote.write_count();

        assert_eq!(store.rename_node(&root, "   ").await, Err(LabelError::Empty));
        assert_eq!(store.rename_node(&root, " Root Node ").await, Ok(false));
        assert_eq!(remote.write_count(), writes);

        store.set_editing(Some(root.clone()));
        assert_eq!(store.rename_node(&root, "  Plans ").await, Ok(true));
        assert_eq!(store.map().get(&root).unwrap().label, "Plans");
        assert_eq!(store.editing_node_id(), None);
        assert_eq!(remote.write_count(), writes + 1);
    }

    #[tokio::test]
    async fn drag_divides_by_scale() {
        let (mut store, _, _) = online().await;
        let root = store.add_root_at(Point::new(100.0, 100.0)).await.unwrap();
        store.set_scale(2.0);

        assert!(store.drag_node(&root, DVec2::new(20.0, -10.0)).await);
        assert_eq!(store.map().get(&root).unwrap().position, Point::new(110.0, 95.0));
    }

    #[tokio::test]
    async fn add_at_pointer_uses_logical_space() {
        let (mut store, _, _) = online().await;
        store.pan(DVec2::new(50.0, 50.0));
        store.set_scale(2.0);

        let root = store.add_at_device_point(DVec2::new(250.0, 150.0)).await.unwrap();
        assert_eq!(store.map().get(&root).unwrap().position, Point::new(100.0, 50.0));

        let child = store.add_at_device_point(DVec2::new(50.0, 50.0)).await.unwrap();
        let node = store.map().get(&child).unwrap();
        assert_eq!(node.parent_id.as_ref(), Some(&root));
        assert_eq!(node.position, Point::ORIGIN);
    }

    #[tokio::test]
    async fn starring_and_sizes() {
        let (mut store, remote, _) = online().await;
        let root = store.add_root().await.unwrap();

        assert!(store.toggle_starred(&root).await);
        assert!(store.map().get(&root).unwrap().is_starred());
        assert!(store.toggle_starred(&root).await);
        assert!(!store.map().get(&root).unwrap().is_starred());

        let writes = remote.write_count();
        assert!(store.record_node_size(&root, Size::new(240.0, 52.0)));
        assert_eq!(remote.write_count(), writes);
        assert_eq!(store.map().get(&root).unwrap().size, Some(Size::new(240.0, 52.0)));
    }

    #[tokio::test]
    async fn zoom_to_fit_uses_measured_sizes() {
        let (mut store, _, _) = online().await;
        assert!(!store.zoom_to_fit(DVec2::new(800.0, 600.0)));

        let root = store.add_root_at(Point::ORIGIN).await.unwrap();
        store.record_node_size(&root, Size::new(1000.0, 100.0));
        assert!(store.zoom_to_fit(DVec2::new(800.0, 600.0)));
        assert!((store.canvas_scale() - 800.0 / 1080.0).abs() < 1e-9);
    }

    fn drain_statuses(rx: &mut broadcast::Receiver<SyncStatus>) -> Vec<SyncStatus> {
        let mut seen = Vec::new();
        while let Ok(status) = rx.try_recv() {
            seen.push(status);
        }
        seen
    }

    #[tokio::test]
    async fn every_write_passes_through_syncing() {
        let (mut store, remote, _) = online().await;
        let mut changes = store.status_changes();

        let root = store.add_root().await.unwrap();
        store.add_child(&root).await.unwrap();
        assert_eq!(
            drain_statuses(&mut changes),
            vec![
                SyncStatus::Syncing,
                SyncStatus::Online,
                SyncStatus::Syncing,
                SyncStatus::Online,
            ]
        );

        remote.set_available(false);
        store.toggle_collapse(&root).await;
        assert_eq!(
            drain_statuses(&mut changes),
            vec![SyncStatus::Syncing, SyncStatus::Error]
        );

        // Local-only writes never touch the remote, so no syncing either.
        store.record_node_size(&root, Size::new(200.0, 50.0));
        assert!(drain_statuses(&mut changes).is_empty());
    }

    #[tokio::test]
    async fn retry_after_offline_failure_reconnects() {
        let remote = MemoryDocumentStore::new();
        remote.set_available(false);
        let mut store = MindMapStore::new(remote.clone(), MemoryFallback::new());

        store.start_listener();
        assert_eq!(store.sync_status(), SyncStatus::Error);
        store.connectivity_lost();
        assert_eq!(store.sync_status(), SyncStatus::Offline);
        store.connectivity_restored();
        assert_eq!(store.sync_status(), SyncStatus::Online);
        assert!(store.is_local_only());

        remote.set_available(true);
        store.start_listener();
        assert_eq!(store.sync_status(), SyncStatus::InitialLoad);
        store.drain_remote();
        assert_eq!(store.sync_status(), SyncStatus::Online);

        let root = store.add_root().await.unwrap();
        assert_eq!(remote.write_count(), 1);
        assert_eq!(remote.document().unwrap().root_node_id(), Some(&root));
    }

    #[tokio::test]
    async fn retry_while_still_offline_reconnects() {
        let remote = MemoryDocumentStore::new();
        remote.set_available(false);
        let mut store = MindMapStore::new(remote.clone(), MemoryFallback::new());
        store.start_listener();
        store.connectivity_lost();

        remote.set_available(true);
        store.start_listener();
        store.drain_remote();
        assert_eq!(store.sync_status(), SyncStatus::Online);

        store.add_root().await.unwrap();
        assert_eq!(remote.write_count(), 1);
    }

    #[tokio::test]
    async fn local_only_restore_keeps_writes_local() {
        let remote = MemoryDocumentStore::new();
        remote.set_available(false);
        let local = MemoryFallback::new();
        let mut store = MindMapStore::new(remote.clone(), local.clone());
        store.start_listener();
        store.connectivity_lost();
        store.connectivity_restored();

        remote.set_available(true);
        store.add_root().await.unwrap();
        assert_eq!(remote.write_count(), 0);
        assert_eq!(local.load().unwrap().unwrap().len(), 1);
    }
}
