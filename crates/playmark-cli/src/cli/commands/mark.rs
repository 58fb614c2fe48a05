//! `playmark mark <key>... (--at <seconds> | --new)` – bulk watched/new toggle.

use anyhow::{bail, Result};
use playmark_core::PositionStore;

use super::{check_seconds, describe_sync};

pub async fn run_mark(
    store: &PositionStore,
    keys: &[String],
    new: bool,
    at: Option<f64>,
) -> Result<()> {
    if new {
        let report = store.mark_new(keys).await?;
        println!("Marked {} as new ({})", keys.len(), describe_sync(&report));
        return Ok(());
    }
    let Some(at) = at else {
        bail!("--at <SECONDS> is required unless --new is given");
    };
    let at = check_seconds(at)?;
    let report = store.mark_watched(keys, at).await?;
    println!(
        "Marked {} as watched at {at:.1}s ({})",
        keys.len(),
        describe_sync(&report)
    );
    Ok(())
}
