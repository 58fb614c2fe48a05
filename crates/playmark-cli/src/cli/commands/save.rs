//! `playmark save <key> <seconds>` and `playmark save-bulk <file>`.

use anyhow::{Context, Result};
use playmark_core::value::{Entries, PositionEntry};
use playmark_core::PositionStore;
use std::path::Path;

use super::{check_seconds, describe_sync};

pub async fn run_save(store: &PositionStore, key: &str, seconds: f64) -> Result<()> {
    let seconds = check_seconds(seconds)?;
    let report = store
        .save_position(key, PositionEntry::new(seconds))
        .await?;
    println!("Saved {key} at {seconds:.1}s ({})", describe_sync(&report));
    Ok(())
}

/// Reads a JSON object (`{"<key>": <value>, ...}`) and saves it in one bulk write.
pub async fn run_save_bulk(store: &PositionStore, path: &Path) -> Result<()> {
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    let entries: Entries = serde_json::from_str(&data)
        .with_context(|| format!("{} must contain a JSON object", path.display()))?;
    let report = store.save_bulk(&entries).await?;
    println!(
        "Saved {} entr{} ({})",
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" },
        describe_sync(&report)
    );
    Ok(())
}
