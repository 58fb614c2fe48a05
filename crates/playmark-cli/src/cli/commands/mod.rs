//! CLI command handlers. Each command is in its own file.

mod get;
mod mark;
mod remove;
mod save;
mod season;
mod status;
mod track;

pub use get::{run_get, run_get_bulk};
pub use mark::run_mark;
pub use remove::run_remove;
pub use save::{run_save, run_save_bulk};
pub use season::run_season;
pub use status::run_status;
pub use track::run_track;

use anyhow::{bail, Result};
use playmark_core::{RemoteWrite, WriteReport};

/// One-line summary of what happened on the remote side of a write.
pub(crate) fn describe_sync(report: &WriteReport) -> String {
    if report.remotes.is_empty() {
        return "local only".to_string();
    }
    report
        .remotes
        .iter()
        .map(|w| match &w.outcome {
            RemoteWrite::Written => format!("{}: synced", w.tier),
            RemoteWrite::Throttled => format!("{}: queued", w.tier),
            RemoteWrite::Failed(e) => format!("{}: failed ({e})", w.tier),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reject times a player could never report.
pub(crate) fn check_seconds(seconds: f64) -> Result<f64> {
    if !seconds.is_finite() || seconds < 0.0 {
        bail!("position must be a non-negative number of seconds, got {seconds}");
    }
    Ok(seconds)
}
