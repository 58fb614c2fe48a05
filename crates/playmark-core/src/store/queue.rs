//! Entries waiting for a remote write, plus bookkeeping for batches in flight.
//!
//! A batch drained from the queue is tagged with a generation. Removing a key
//! while a batch carrying it is in flight records a newer generation for that
//! key. The batch's entry is then not requeued if its write fails, and if the
//! write succeeded the store removes the key from the remotes again, unless
//! the key was saved once more after the removal.

use std::collections::BTreeMap;

use crate::value::Entries;

#[derive(Debug, Default)]
pub(crate) struct SyncQueue {
    entries: Entries,
    generation: u64,
    /// Number of in-flight batches carrying each key.
    in_flight: BTreeMap<String, usize>,
    /// Last removal of each key that was in flight at the time.
    removed: BTreeMap<String, Removal>,
}

#[derive(Debug, Clone, Copy)]
struct Removal {
    generation: u64,
    /// A save for the key arrived after the removal.
    resaved: bool,
}

/// Outcome of [`SyncQueue::settle`].
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Settled {
    /// Entries put back in the queue.
    pub(crate) requeued: usize,
    /// Keys removed (and not saved again) while the batch was in flight. A
    /// remote that accepted the batch holds them again.
    pub(crate) removed: Vec<String>,
}

/// A drained batch and the generation it was drained at.
#[derive(Debug)]
pub(crate) struct Batch {
    pub(crate) entries: Entries,
    generation: u64,
}

impl SyncQueue {
    pub(crate) fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queue entries held back by the limiter. Newer values replace queued ones.
    pub(crate) fn push(&mut self, entries: Entries) {
        self.note_resaved(&entries);
        self.entries.extend(entries);
    }

    /// Take everything queued, overlay `newer`, and mark the result in flight.
    pub(crate) fn drain_with(&mut self, newer: Entries) -> Batch {
        self.note_resaved(&newer);
        let mut entries = std::mem::take(&mut self.entries);
        entries.extend(newer);
        self.generation += 1;
        for k in entries.keys() {
            *self.in_flight.entry(k.clone()).or_insert(0) += 1;
        }
        Batch {
            entries,
            generation: self.generation,
        }
    }

    /// Forget queued values for `keys` and cancel requeueing of in-flight ones.
    pub(crate) fn remove(&mut self, keys: &[String]) {
        self.generation += 1;
        for k in keys {
            self.entries.remove(k);
            if self.in_flight.contains_key(k) {
                self.removed.insert(
                    k.clone(),
                    Removal {
                        generation: self.generation,
                        resaved: false,
                    },
                );
            }
        }
    }

    fn note_resaved(&mut self, entries: &Entries) {
        for k in entries.keys() {
            if let Some(r) = self.removed.get_mut(k) {
                r.resaved = true;
            }
        }
    }

    /// Finish an in-flight batch. On failure, entries go back to the queue
    /// unless a newer save replaced them or the key was removed meanwhile.
    pub(crate) fn settle(&mut self, batch: Batch, failed: bool) -> Settled {
        let mut settled = Settled::default();
        for (k, v) in batch.entries {
            let removed_since = self
                .removed
                .get(&k)
                .copied()
                .filter(|r| r.generation > batch.generation);
            if let Some(r) = removed_since {
                if !r.resaved {
                    settled.removed.push(k.clone());
                }
            } else if failed && !self.entries.contains_key(&k) {
                self.entries.insert(k.clone(), v);
                settled.requeued += 1;
            }

            let last = match self.in_flight.get_mut(&k) {
                Some(n) => {
                    *n -= 1;
                    *n == 0
                }
                None => true,
            };
            if last {
                self.in_flight.remove(&k);
                self.removed.remove(&k);
            }
        }
        settled
    }
}
