use serde::{Deserialize, Serialize};

const SEASON_SUFFIX: &str = "\\season";

/// Key under which a show's last watched season is stored: `"<show>\season"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeasonKey {
    pub show: String,
}

impl SeasonKey {
    pub fn new(show: impl Into<String>) -> Self {
        Self { show: show.into() }
    }

    /// String form used as the store key.
    pub fn to_string_key(&self) -> String {
        format!("{}{}", self.show, SEASON_SUFFIX)
    }

    /// Parse from a store key; None for keys of any other shape.
    pub fn from_string_key(s: &str) -> Option<Self> {
        let show = s.strip_suffix(SEASON_SUFFIX)?;
        if show.is_empty() {
            return None;
        }
        Some(Self::new(show))
    }
}

/// Value stored under a [`SeasonKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonMark {
    #[serde(rename = "lastWatchedSeason")]
    pub last_watched_season: String,
}

impl SeasonMark {
    pub fn new(season: impl Into<String>) -> Self {
        Self {
            last_watched_season: season.into(),
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({ "lastWatchedSeason": self.last_watched_season })
    }
}
