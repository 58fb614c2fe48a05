//! Two-tier playback position store.
//!
//! Tiers form an ordered list: the local tier first, then zero or more
//! remote tiers. Local is written on every save and is the source of truth
//! for reads; remotes are best-effort and written at most once per sync
//! window (see [`crate::sync::SyncLimiter`]), except for caller-initiated
//! bulk operations. Saves refused by the limiter stay in a pending set and
//! ride along with the next remote write.

mod queue;
mod read;
mod write;

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};

use crate::config::PlaymarkConfig;
use crate::error::{StoreError, StoreResult};
use crate::sync::SyncLimiter;
use crate::tier::{JsonFileTier, SqliteTier, Tier};
use crate::value::Entries;
use queue::SyncQueue;

/// What happened to the remote copy of a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteWrite {
    /// The remote tier accepted the write.
    Written,
    /// The sync window was still closed; the entry is queued for the next sync.
    Throttled,
    /// The remote tier rejected the write; the error message is kept for display.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierWrite {
    pub tier: String,
    pub outcome: RemoteWrite,
}

/// Per-remote outcome of a store write. Empty when no remote tier is configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub remotes: Vec<TierWrite>,
}

impl WriteReport {
    fn all(remotes: &[Arc<dyn Tier>], outcome: RemoteWrite) -> Self {
        Self {
            remotes: remotes
                .iter()
                .map(|t| TierWrite {
                    tier: t.name().to_string(),
                    outcome: outcome.clone(),
                })
                .collect(),
        }
    }

    /// True if at least one remote tier received the write.
    pub fn synced(&self) -> bool {
        self.remotes
            .iter()
            .any(|w| w.outcome == RemoteWrite::Written)
    }

    /// True if the write was held back by the sync limiter.
    pub fn throttled(&self) -> bool {
        !self.remotes.is_empty()
            && self
                .remotes
                .iter()
                .all(|w| w.outcome == RemoteWrite::Throttled)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TierWrite> {
        self.remotes
            .iter()
            .filter(|w| matches!(w.outcome, RemoteWrite::Failed(_)))
    }
}

pub struct PositionStore {
    local: Arc<dyn Tier>,
    remotes: Vec<Arc<dyn Tier>>,
    limiter: SyncLimiter,
    pending: Mutex<SyncQueue>,
}

impl PositionStore {
    /// Store with only a local tier; add remotes with [`Self::with_remote`].
    pub fn new(local: Arc<dyn Tier>, limiter: SyncLimiter) -> Self {
        Self {
            local,
            remotes: Vec::new(),
            limiter,
            pending: Mutex::new(SyncQueue::default()),
        }
    }

    /// Append a remote tier. Earlier remotes take precedence on reads.
    pub fn with_remote(mut self, tier: Arc<dyn Tier>) -> Self {
        self.remotes.push(tier);
        self
    }

    /// Open the configured tiers: SQLite locally, plus the JSON sync file
    /// unless the remote is disabled.
    pub async fn open(cfg: &PlaymarkConfig) -> Result<Self> {
        let window = cfg.sync_window()?;
        let db_path = cfg.local_db_path()?;
        let local = SqliteTier::open_at(&db_path)
            .await
            .with_context(|| format!("open local tier: {}", db_path.display()))?;

        let mut store = PositionStore::new(Arc::new(local), SyncLimiter::new(window));
        if let Some(path) = cfg.remote_path()? {
            tracing::debug!(path = %path.display(), "using remote file tier");
            store = store.with_remote(Arc::new(JsonFileTier::new(path)));
        }
        Ok(store)
    }

    /// Names of all tiers, local first.
    pub fn tier_names(&self) -> Vec<&str> {
        std::iter::once(self.local.name())
            .chain(self.remotes.iter().map(|t| t.name()))
            .collect()
    }

    pub fn limiter(&self) -> &SyncLimiter {
        &self.limiter
    }

    /// Keys saved locally whose remote write is still outstanding.
    pub fn pending_keys(&self) -> Vec<String> {
        self.pending_lock().keys()
    }

    fn pending_lock(&self) -> MutexGuard<'_, SyncQueue> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn write_local(&self, entries: &Entries) -> StoreResult<()> {
        self.local
            .set(entries)
            .await
            .map_err(|e| StoreError::local(self.local.name(), e))
    }
}
