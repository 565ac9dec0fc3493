//! Synchronization status state machine.
//!
//! - `initial_load` until the first subscription response
//! - a delivered snapshot or a successful write means `online`
//! - every write passes through `syncing`
//! - any failed remote operation means `error`
//! - connectivity signals move between `offline` and `online`

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the store stands with respect to the remote document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Waiting for the first subscription response
    #[default]
    InitialLoad,
    /// Connected and caught up
    #[serde(alias = "synced")]
    Online,
    /// A write is in flight
    Syncing,
    /// Connectivity lost; changes go to the local fallback
    Offline,
    /// The last remote operation failed
    Error,
}

/// Events that drive [`SyncStatus`] transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncSignal {
    /// The subscription delivered a document
    SnapshotReceived,
    /// The subscription could not be established or broke
    SubscriptionFailed,
    /// A full-document write is starting
    WriteStarted,
    WriteSucceeded,
    WriteFailed,
    /// External connectivity signal
    ConnectivityLost,
    ConnectivityRestored,
}

impl SyncStatus {
    /// Apply a signal.
    ///
    /// Snapshots do not lift the offline state; only a connectivity signal does.
    pub fn next(self, signal: SyncSignal) -> Self {
        match (self, signal) {
            (SyncStatus::Offline, SyncSignal::SnapshotReceived) => SyncStatus::Offline,
            (_, SyncSignal::SnapshotReceived) => SyncStatus::Online,
            (_, SyncSignal::SubscriptionFailed) => SyncStatus::Error,
            (_, SyncSignal::WriteStarted) => SyncStatus::Syncing,
            (_, SyncSignal::WriteSucceeded) => SyncStatus::Online,
            (_, SyncSignal::WriteFailed) => SyncStatus::Error,
            (_, SyncSignal::ConnectivityLost) => SyncStatus::Offline,
            (_, SyncSignal::ConnectivityRestored) => SyncStatus::Online,
        }
    }

    /// True in the connected state.
    pub fn is_connected(self) -> bool {
        self == SyncStatus::Online
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::InitialLoad => "initial_load",
            SyncStatus::Online => "online",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Offline => "offline",
            SyncStatus::Error => "error",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
