//! `playmark season <show> [<season>]` – last watched season of a show.

use anyhow::Result;
use playmark_core::PositionStore;

use super::describe_sync;

pub async fn run_season(store: &PositionStore, show: &str, season: Option<&str>) -> Result<()> {
    match season {
        Some(season) => {
            let report = store.save_season(show, season).await?;
            println!("{show}: season {season} ({})", describe_sync(&report));
        }
        None => match store.get_season(show).await? {
            Some(mark) => println!("{show}: season {}", mark.last_watched_season),
            None => println!("{show}: no season recorded"),
        },
    }
    Ok(())
}
