//! `playmark remove <key>...` – delete keys from every tier.

use anyhow::Result;
use playmark_core::PositionStore;

use super::describe_sync;

pub async fn run_remove(store: &PositionStore, keys: &[String]) -> Result<()> {
    let report = match keys {
        [key] => store.remove(key).await?,
        _ => store.remove_bulk(keys).await?,
    };
    for failed in report.failures() {
        tracing::warn!(tier = %failed.tier, "remote copy may still exist");
    }
    println!("Removed {} key(s) ({})", keys.len(), describe_sync(&report));
    Ok(())
}
