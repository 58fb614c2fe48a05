//! Store reads: single and bulk lookups with read-repair.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;

use super::PositionStore;
use crate::error::{StoreError, StoreResult};
use crate::tier::Tier;
use crate::value::{Entries, PersistedPosition, PositionEntry, SeasonKey, SeasonMark};

/// Entries of `merged` that `view` is missing or holds a different value for.
fn stale_entries(merged: &Entries, view: &Entries) -> Entries {
    merged
        .iter()
        .filter(|(k, v)| view.get(*k) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

impl PositionStore {
    /// Look up one key.
    ///
    /// Local wins whenever it has the key. On a local miss the remotes are
    /// tried in order; the first hit is copied into the local tier before it
    /// is returned. A failing remote counts as a miss.
    pub async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let keys = [key.to_string()];
        let local = self
            .local
            .get(&keys)
            .await
            .map_err(|e| StoreError::local(self.local.name(), e))?;
        if let Some(value) = local.into_values().next() {
            return Ok(Some(value));
        }

        for remote in &self.remotes {
            match remote.get(&keys).await {
                Ok(found) => {
                    if let Some(value) = found.into_values().next() {
                        let mut repair = Entries::new();
                        repair.insert(key.to_string(), value.clone());
                        self.write_local(&repair).await?;
                        tracing::debug!(key, tier = remote.name(), "repaired local from remote");
                        return Ok(Some(value));
                    }
                }
                Err(e) => {
                    tracing::warn!(key, tier = remote.name(), "remote read failed: {}", e);
                }
            }
        }

        Ok(None)
    }

    /// Look up many keys at once.
    ///
    /// Reads every tier concurrently, overlays the results so earlier tiers
    /// win (local over remotes), and writes the merged view back to every
    /// tier that was missing or disagreeing on some key. Keys found nowhere
    /// are absent from the result.
    pub async fn get_bulk(&self, keys: &[String]) -> StoreResult<Entries> {
        if keys.is_empty() {
            return Ok(Entries::new());
        }

        let (local, remote_reads) = tokio::join!(
            self.local.get(keys),
            join_all(self.remotes.iter().map(|t| t.get(keys)))
        );
        let local = local.map_err(|e| StoreError::local(self.local.name(), e))?;

        let mut remote_views: Vec<(&Arc<dyn Tier>, Entries)> = Vec::new();
        for (tier, res) in self.remotes.iter().zip(remote_reads) {
            match res {
                Ok(view) => remote_views.push((tier, view)),
                Err(e) => {
                    tracing::warn!(tier = tier.name(), "remote bulk read failed: {}", e);
                }
            }
        }

        let mut merged = Entries::new();
        for (_, view) in remote_views.iter().rev() {
            merged.extend(view.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged.extend(local.iter().map(|(k, v)| (k.clone(), v.clone())));

        let local_repair = stale_entries(&merged, &local);
        if !local_repair.is_empty() {
            self.write_local(&local_repair).await?;
            tracing::debug!(count = local_repair.len(), "repaired local from remote");
        }

        let repairs: Vec<(&Arc<dyn Tier>, Entries)> = remote_views
            .iter()
            .map(|(tier, view)| (*tier, stale_entries(&merged, view)))
            .filter(|(_, repair)| !repair.is_empty())
            .collect();
        if !repairs.is_empty() {
            self.limiter.mark_synced();
            let results = join_all(repairs.iter().map(|(tier, repair)| tier.set(repair))).await;
            for ((tier, repair), res) in repairs.iter().zip(results) {
                match res {
                    Ok(()) => {
                        tracing::debug!(tier = tier.name(), count = repair.len(), "repaired remote")
                    }
                    Err(e) => tracing::warn!(tier = tier.name(), "remote repair failed: {}", e),
                }
            }
        }

        Ok(merged)
    }

    /// Saved playback position for a content path, whichever shape it was stored in.
    pub async fn get_position(&self, key: &str) -> StoreResult<Option<PositionEntry>> {
        Ok(self
            .get(key)
            .await?
            .as_ref()
            .and_then(PersistedPosition::normalize_value))
    }

    /// Bulk form of [`Self::get_position`]. Keys without a usable position are omitted.
    pub async fn get_positions(
        &self,
        keys: &[String],
    ) -> StoreResult<BTreeMap<String, PositionEntry>> {
        let entries = self.get_bulk(keys).await?;
        Ok(entries
            .into_iter()
            .filter_map(|(k, v)| PersistedPosition::normalize_value(&v).map(|p| (k, p)))
            .collect())
    }

    /// Last watched season recorded for `show`.
    pub async fn get_season(&self, show: &str) -> StoreResult<Option<SeasonMark>> {
        let key = SeasonKey::new(show).to_string_key();
        Ok(self
            .get(&key)
            .await?
            .and_then(|v| serde_json::from_value(v).ok()))
    }
}
