use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::sync::window_for_quota;

/// Global configuration loaded from `~/.config/playmark/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaymarkConfig {
    /// Remote writes the sync backend accepts per hour (account-wide).
    pub sync_quota_per_hour: u32,
    /// Fraction of the quota held back as headroom (0.2 = use 80% of it).
    pub sync_safety_margin: f64,
    /// Fixed interval between remote writes in seconds; overrides the quota-derived window.
    #[serde(default)]
    pub sync_interval_secs: Option<f64>,
    /// Local tier database file (None = `~/.local/state/playmark/positions.db`).
    #[serde(default)]
    pub local_db_path: Option<PathBuf>,
    /// Remote tier file, typically inside a synced folder (None = `~/.local/share/playmark/sync.json`).
    #[serde(default)]
    pub remote_path: Option<PathBuf>,
    /// Set to false to run with the local tier only.
    #[serde(default = "default_remote_enabled")]
    pub remote_enabled: bool,
}

fn default_remote_enabled() -> bool {
    true
}

impl Default for PlaymarkConfig {
    fn default() -> Self {
        Self {
            sync_quota_per_hour: 1800,
            sync_safety_margin: 0.2,
            sync_interval_secs: None,
            local_db_path: None,
            remote_path: None,
            remote_enabled: true,
        }
    }
}

impl PlaymarkConfig {
    /// Minimum spacing between remote writes.
    pub fn sync_window(&self) -> Result<Duration> {
        if let Some(secs) = self.sync_interval_secs {
            return Duration::try_from_secs_f64(secs).map_err(|_| {
                anyhow!("sync_interval_secs must be a non-negative number of seconds, got {secs}")
            });
        }
        if self.sync_quota_per_hour == 0 {
            bail!("sync_quota_per_hour must be greater than zero");
        }
        if !(0.0..1.0).contains(&self.sync_safety_margin) {
            bail!(
                "sync_safety_margin must be in [0, 1), got {}",
                self.sync_safety_margin
            );
        }
        Ok(window_for_quota(
            self.sync_quota_per_hour,
            self.sync_safety_margin,
        ))
    }

    /// Resolved path of the local tier database.
    pub fn local_db_path(&self) -> Result<PathBuf> {
        if let Some(p) = &self.local_db_path {
            return Ok(p.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("playmark")?;
        Ok(xdg_dirs.get_state_home().join("positions.db"))
    }

    /// Resolved path of the remote tier file, or None when the remote tier is disabled.
    pub fn remote_path(&self) -> Result<Option<PathBuf>> {
        if !self.remote_enabled {
            return Ok(None);
        }
        if let Some(p) = &self.remote_path {
            return Ok(Some(p.clone()));
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("playmark")?;
        Ok(Some(xdg_dirs.get_data_home().join("sync.json")))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("playmark")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PlaymarkConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PlaymarkConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PlaymarkConfig = toml::from_str(&data)?;
    Ok(cfg)
}
