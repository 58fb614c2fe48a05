//! Key-value storage tiers.
//!
//! Every backend exposes the same three bulk operations. The store decides
//! what role a tier plays (local cache or rate-limited remote); the tiers
//! themselves know nothing about ordering, throttling, or value shapes.

mod file;
mod memory;
mod sqlite;

use async_trait::async_trait;

use crate::error::TierError;
use crate::value::Entries;

pub use file::JsonFileTier;
pub use memory::MemoryTier;
pub use sqlite::SqliteTier;

#[async_trait]
pub trait Tier: Send + Sync {
    /// Short label used in logs and reports.
    fn name(&self) -> &str;

    /// Read the given keys. Missing keys are absent from the result.
    async fn get(&self, keys: &[String]) -> Result<Entries, TierError>;

    /// Insert or overwrite every entry in `entries`.
    async fn set(&self, entries: &Entries) -> Result<(), TierError>;

    /// Delete the given keys. Deleting a missing key is not an error.
    async fn remove(&self, keys: &[String]) -> Result<(), TierError>;
}
