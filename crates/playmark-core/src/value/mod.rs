//! Value shapes persisted under store keys.
//!
//! The store itself moves opaque JSON (`serde_json::Value`); these types give
//! callers typed views of the two key shapes in use:
//! - content paths hold a playback position ([`PositionEntry`], or a bare number
//!   written by older versions);
//! - `"<show>\season"` keys hold a [`SeasonMark`].

mod position;
mod season;

pub use position::{PersistedPosition, PositionEntry};
pub use season::{SeasonKey, SeasonMark};

/// Map of key to stored JSON value, as read from or written to a tier.
pub type Entries = std::collections::BTreeMap<String, serde_json::Value>;
