//! Shared setup for on-disk store tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use playmark_core::sync::{ManualClock, SyncLimiter};
use playmark_core::tier::{JsonFileTier, SqliteTier};
use playmark_core::PositionStore;

pub struct DiskStore {
    pub store: PositionStore,
    pub clock: Arc<ManualClock>,
    pub remote_path: PathBuf,
}

/// SQLite local tier and JSON-file remote tier under `dir`, driven by a manual clock.
pub async fn open_disk_store(dir: &Path, window: Duration) -> DiskStore {
    let local = SqliteTier::open_at(dir.join("state").join("positions.db"))
        .await
        .expect("open sqlite tier");
    let remote_path = dir.join("cloud").join("sync.json");
    let clock = Arc::new(ManualClock::new());
    let store = PositionStore::new(
        Arc::new(local),
        SyncLimiter::with_clock(window, clock.clone()),
    )
    .with_remote(Arc::new(JsonFileTier::new(&remote_path)));
    DiskStore {
        store,
        clock,
        remote_path,
    }
}

pub fn read_remote(path: &Path) -> serde_json::Value {
    let bytes = std::fs::read(path).expect("remote file exists");
    serde_json::from_slice(&bytes).expect("remote file is JSON")
}
