//! `playmark status` – show configuration and where each tier lives.

use anyhow::Result;
use playmark_core::config::{self, PlaymarkConfig};
use playmark_core::PositionStore;

pub fn run_status(store: &PositionStore, cfg: &PlaymarkConfig) -> Result<()> {
    println!("config:      {}", config::config_path()?.display());
    println!("local tier:  {}", cfg.local_db_path()?.display());
    match cfg.remote_path()? {
        Some(p) => println!("remote tier: {}", p.display()),
        None => println!("remote tier: disabled"),
    }
    let window = store.limiter().window();
    println!(
        "sync window: {:.1}s ({} writes/hour, {:.0}% margin{})",
        window.as_secs_f64(),
        cfg.sync_quota_per_hour,
        cfg.sync_safety_margin * 100.0,
        if cfg.sync_interval_secs.is_some() {
            ", fixed interval override"
        } else {
            ""
        }
    );
    println!("tiers:       {}", store.tier_names().join(" -> "));
    Ok(())
}
