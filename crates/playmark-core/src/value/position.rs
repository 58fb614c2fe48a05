use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Saved playback position for one piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionEntry {
    /// Seconds from the start of the video.
    #[serde(rename = "currentTime")]
    pub current_time: f64,
}

impl PositionEntry {
    pub fn new(current_time: f64) -> Self {
        Self { current_time }
    }

    pub fn to_value(self) -> Value {
        serde_json::json!({ "currentTime": self.current_time })
    }
}

/// Every shape a playback position has been persisted in.
///
/// Both shapes remain valid forever; nothing rewrites old values in place.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PersistedPosition {
    /// Bare number of seconds.
    Legacy(f64),
    /// `{ "currentTime": seconds }`.
    Entry(PositionEntry),
}

impl PersistedPosition {
    /// Interpret a stored value. Unrecognised shapes yield None.
    pub fn from_value(value: &Value) -> Option<Self> {
        PersistedPosition::deserialize(value).ok()
    }

    /// Collapse to the structured form. Negative or non-finite times are
    /// treated as "no saved time".
    pub fn normalize(self) -> Option<PositionEntry> {
        let t = match self {
            PersistedPosition::Legacy(t) => t,
            PersistedPosition::Entry(e) => e.current_time,
        };
        (t.is_finite() && t >= 0.0).then(|| PositionEntry::new(t))
    }

    /// Shorthand for `from_value(..)` followed by `normalize()`.
    pub fn normalize_value(value: &Value) -> Option<PositionEntry> {
        Self::from_value(value).and_then(Self::normalize)
    }
}
