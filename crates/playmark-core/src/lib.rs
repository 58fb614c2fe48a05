//! Playback position store: a local cache tier backed by a rate-limited
//! remote sync tier, with read-repair between them.

pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod sync;
pub mod tier;
pub mod value;

pub use error::{StoreError, StoreResult, TierError};
pub use store::{PositionStore, RemoteWrite, TierWrite, WriteReport};
