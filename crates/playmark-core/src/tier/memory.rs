//! In-process tier backed by a map.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::Tier;
use crate::error::TierError;
use crate::value::Entries;

/// Map-backed tier with an availability switch and a write counter, so
/// callers can simulate an unreachable backend and count writes against it.
#[derive(Debug)]
pub struct MemoryTier {
    name: String,
    entries: Mutex<Entries>,
    available: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryTier {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_entries(name, Entries::new())
    }

    pub fn with_entries(name: impl Into<String>, entries: Entries) -> Self {
        Self {
            name: name.into(),
            entries: Mutex::new(entries),
            available: AtomicBool::new(true),
            writes: AtomicUsize::new(0),
        }
    }

    /// When false, every call fails with [`TierError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of successful `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of everything currently stored.
    pub fn snapshot(&self) -> Entries {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self) -> Result<(), TierError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(TierError::Unavailable(format!("{} is offline", self.name)))
        }
    }
}

#[async_trait]
impl Tier for MemoryTier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, keys: &[String]) -> Result<Entries, TierError> {
        self.check()?;
        let entries = self.lock();
        Ok(keys
            .iter()
            .filter_map(|k| entries.get(k).map(|v| (k.clone(), v.clone())))
            .collect())
    }

    async fn set(&self, entries: &Entries) -> Result<(), TierError> {
        self.check()?;
        let mut stored = self.lock();
        for (k, v) in entries {
            stored.insert(k.clone(), v.clone());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<(), TierError> {
        self.check()?;
        let mut stored = self.lock();
        for k in keys {
            stored.remove(k);
        }
        Ok(())
    }
}
