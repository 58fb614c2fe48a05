//! Store writes: save, bulk save, flush, remove.

use futures::future::join_all;
use serde_json::Value;

use super::queue::Batch;
use super::{PositionStore, RemoteWrite, TierWrite, WriteReport};
use crate::error::{StoreError, StoreResult};
use crate::value::{Entries, PositionEntry, SeasonKey, SeasonMark};

impl PositionStore {
    /// Save one value.
    ///
    /// The local write always happens and its failure is the only error
    /// returned. The remotes are written only if the sync window is open;
    /// otherwise the entry is queued and the report says `Throttled`.
    pub async fn save(&self, key: &str, value: Value) -> StoreResult<WriteReport> {
        let mut entry = Entries::new();
        entry.insert(key.to_string(), value);
        self.write_local(&entry).await?;
        tracing::debug!(key, "saved locally");

        if self.remotes.is_empty() {
            return Ok(WriteReport::default());
        }
        if !self.limiter.try_acquire() {
            self.pending_lock().push(entry);
            tracing::debug!(key, "remote sync throttled");
            return Ok(WriteReport::all(&self.remotes, RemoteWrite::Throttled));
        }

        let batch = self.pending_lock().drain_with(entry);
        Ok(self.write_remotes(batch).await)
    }

    /// Save many values: all of them locally, then one bulk write per remote
    /// regardless of the sync window.
    pub async fn save_bulk(&self, entries: &Entries) -> StoreResult<WriteReport> {
        if entries.is_empty() {
            return Ok(WriteReport::default());
        }
        self.write_local(entries).await?;
        tracing::debug!(count = entries.len(), "bulk saved locally");

        if self.remotes.is_empty() {
            return Ok(WriteReport::default());
        }
        let batch = self.pending_lock().drain_with(entries.clone());
        self.limiter.mark_synced();
        Ok(self.write_remotes(batch).await)
    }

    /// Push every queued entry to the remotes now, ignoring the sync window.
    /// Returns an empty report when nothing was queued.
    pub async fn flush(&self) -> WriteReport {
        if self.remotes.is_empty() {
            return WriteReport::default();
        }
        let batch = {
            let mut pending = self.pending_lock();
            if pending.is_empty() {
                return WriteReport::default();
            }
            pending.drain_with(Entries::new())
        };
        self.limiter.mark_synced();
        self.write_remotes(batch).await
    }

    /// Delete one key from every tier.
    pub async fn remove(&self, key: &str) -> StoreResult<WriteReport> {
        self.remove_bulk(&[key.to_string()]).await
    }

    /// Delete keys from every tier, waiting for all deletions to finish.
    ///
    /// A local failure is returned after the remote deletions have settled;
    /// remote failures are only reported.
    pub async fn remove_bulk(&self, keys: &[String]) -> StoreResult<WriteReport> {
        if keys.is_empty() {
            return Ok(WriteReport::default());
        }
        self.pending_lock().remove(keys);
        if !self.remotes.is_empty() {
            self.limiter.mark_synced();
        }

        let (local, remote_results) = tokio::join!(
            self.local.remove(keys),
            join_all(self.remotes.iter().map(|t| t.remove(keys)))
        );

        let mut report = WriteReport::default();
        for (tier, res) in self.remotes.iter().zip(remote_results) {
            let outcome = match res {
                Ok(()) => RemoteWrite::Written,
                Err(e) => {
                    tracing::warn!(tier = tier.name(), "remote remove failed: {}", e);
                    RemoteWrite::Failed(e.to_string())
                }
            };
            report.remotes.push(TierWrite {
                tier: tier.name().to_string(),
                outcome,
            });
        }

        local.map_err(|e| StoreError::local(self.local.name(), e))?;
        tracing::debug!(count = keys.len(), "removed keys");
        Ok(report)
    }

    /// Save a playback position for a content path.
    pub async fn save_position(
        &self,
        key: &str,
        position: PositionEntry,
    ) -> StoreResult<WriteReport> {
        self.save(key, position.to_value()).await
    }

    /// Record the season the user last watched for `show`.
    pub async fn save_season(&self, show: &str, season: &str) -> StoreResult<WriteReport> {
        let key = SeasonKey::new(show).to_string_key();
        self.save(&key, SeasonMark::new(season).to_value()).await
    }

    /// Mark content paths as watched up to `at` seconds, in one bulk write.
    pub async fn mark_watched(&self, keys: &[String], at: f64) -> StoreResult<WriteReport> {
        let value = PositionEntry::new(at).to_value();
        let entries: Entries = keys.iter().map(|k| (k.clone(), value.clone())).collect();
        self.save_bulk(&entries).await
    }

    /// Forget all progress for content paths, in one bulk removal.
    pub async fn mark_new(&self, keys: &[String]) -> StoreResult<WriteReport> {
        self.remove_bulk(keys).await
    }

    /// Write `batch` to every remote concurrently. Entries that any remote
    /// rejected go back to the pending set unless a newer save replaced them
    /// or they were removed while the write was in flight.
    async fn write_remotes(&self, batch: Batch) -> WriteReport {
        let results = join_all(self.remotes.iter().map(|t| t.set(&batch.entries))).await;

        let mut report = WriteReport::default();
        let mut any_failed = false;
        for (tier, res) in self.remotes.iter().zip(results) {
            let outcome = match res {
                Ok(()) => {
                    tracing::debug!(
                        tier = tier.name(),
                        count = batch.entries.len(),
                        "synced to remote"
                    );
                    RemoteWrite::Written
                }
                Err(e) => {
                    any_failed = true;
                    tracing::warn!(tier = tier.name(), "remote write failed: {}", e);
                    RemoteWrite::Failed(e.to_string())
                }
            };
            report.remotes.push(TierWrite {
                tier: tier.name().to_string(),
                outcome,
            });
        }

        let settled = self.pending_lock().settle(batch, any_failed);
        if settled.requeued > 0 {
            tracing::debug!(count = settled.requeued, "requeued entries after failed sync");
        }
        if !settled.removed.is_empty() {
            self.undo_stale_writes(&settled.removed, &report).await;
        }
        report
    }

    /// Remove `keys` again from every remote that accepted a batch carrying
    /// them after they were removed.
    async fn undo_stale_writes(&self, keys: &[String], report: &WriteReport) {
        let written = self
            .remotes
            .iter()
            .zip(&report.remotes)
            .filter(|(_, w)| w.outcome == RemoteWrite::Written)
            .map(|(tier, _)| tier);
        let results =
            join_all(written.map(|t| async move { (t.name(), t.remove(keys).await) })).await;
        for (tier, res) in results {
            match res {
                Ok(()) => {
                    tracing::debug!(tier, count = keys.len(), "removed stale remote entries")
                }
                Err(e) => tracing::warn!(tier, "remote remove of stale entries failed: {}", e),
            }
        }
    }
}
