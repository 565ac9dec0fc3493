//! Mind map sync - optimistic store with remote document sync
//!
//! Keeps the canonical mind map in memory and mirrors it to a single remote
//! document, falling back to local storage when the remote is unreachable.
//!
//! # Architecture
//!
//! - **Store**: [`MindMapStore`] applies mutations locally, then writes the
//!   whole tree
//! - **Status**: [`SyncStatus`] state machine driven by [`SyncSignal`]s
//! - **Remote**: [`RemoteDocument`] capability with an in-memory and a
//!   RocksDB-backed implementation
//! - **Local**: [`LocalFallback`] two-slot save/load
//! - **Config**: [`SyncConfig`] from environment variables
//!
//! # Example
//!
//! ```no_run
//! use mindmap_sync::{MindMapStore, Storage, SyncConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SyncConfig::from_env();
//!     let storage = Storage::open(&config.data_dir)?;
//!     let mut store = MindMapStore::new(storage.document(&config.document_id), storage.fallback());
//!     store.start_listener();
//!     store.drain_remote();
//!     store.add_root().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod local;
pub mod remote;
pub mod status;
pub mod storage;
pub mod store;

pub use config::SyncConfig;
pub use error::{Error, Result};
pub use local::{LocalFallback, MemoryFallback};
pub use remote::{MemoryDocumentStore, RemoteDocument, RemoteEvent, Subscription};
pub use status::{SyncSignal, SyncStatus};
pub use storage::{RocksDocumentStore, RocksFallback, Storage};
pub use store::MindMapStore;
