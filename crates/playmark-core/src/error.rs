//! Error types for tiers and the position store.

use thiserror::Error;

/// Failure reported by a single storage tier.
#[derive(Debug, Error)]
pub enum TierError {
    /// SQLite / sqlx failure in the database-backed tier.
    #[error("sqlite: {0}")]
    Sql(#[from] sqlx::Error),
    /// Filesystem failure in the file-backed tier.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// Stored data could not be encoded or decoded.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// Backend refused the call or is offline.
    #[error("tier unavailable: {0}")]
    Unavailable(String),
}

/// Failure surfaced by [`crate::store::PositionStore`].
///
/// Only the local tier can fail a store operation; remote failures are
/// reported through [`crate::store::WriteReport`] instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("local tier '{tier}': {source}")]
    Local {
        tier: String,
        #[source]
        source: TierError,
    },
}

impl StoreError {
    pub(crate) fn local(tier: &str, source: TierError) -> Self {
        StoreError::Local {
            tier: tier.to_string(),
            source,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
