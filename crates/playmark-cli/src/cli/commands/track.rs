//! `playmark track <key>` – feed playback times from stdin, as a player's
//! time-update listener would, then flush queued syncs at EOF.

use anyhow::Result;
use playmark_core::value::PositionEntry;
use playmark_core::PositionStore;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::describe_sync;

pub async fn run_track(store: &PositionStore, key: &str) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut saved = 0usize;
    let mut synced = 0usize;
    let mut last = None;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let seconds = match line.parse::<f64>() {
            Ok(s) if s.is_finite() && s >= 0.0 => s,
            _ => {
                tracing::warn!(line, "ignoring invalid playback time");
                continue;
            }
        };
        let report = store
            .save_position(key, PositionEntry::new(seconds))
            .await?;
        saved += 1;
        if report.synced() {
            synced += 1;
        }
        last = Some(seconds);
    }

    let flushed = store.flush().await;
    match last {
        Some(t) => println!(
            "Tracked {key}: {saved} update(s), {synced} synced during playback, last {t:.1}s (flush: {})",
            if flushed.remotes.is_empty() {
                "nothing queued".to_string()
            } else {
                describe_sync(&flushed)
            }
        ),
        None => println!("Tracked {key}: no playback times read"),
    }
    Ok(())
}
