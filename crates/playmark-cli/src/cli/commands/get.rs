//! `playmark get <key>` and `playmark get-bulk <key>...` – read stored values.

use anyhow::Result;
use playmark_core::value::PersistedPosition;
use playmark_core::PositionStore;
use serde_json::Value;

fn print_entry(key: &str, value: &Value) {
    match PersistedPosition::normalize_value(value) {
        Some(pos) => println!("{key}\t{value}\t({:.1}s)", pos.current_time),
        None => println!("{key}\t{value}"),
    }
}

pub async fn run_get(store: &PositionStore, key: &str) -> Result<()> {
    match store.get(key).await? {
        Some(value) => print_entry(key, &value),
        None => println!("No saved value for {key}"),
    }
    Ok(())
}

pub async fn run_get_bulk(store: &PositionStore, keys: &[String]) -> Result<()> {
    let found = store.get_bulk(keys).await?;
    if found.is_empty() {
        println!("No saved values.");
        return Ok(());
    }
    for (key, value) in &found {
        print_entry(key, value);
    }
    let missing = keys.iter().filter(|k| !found.contains_key(*k)).count();
    if missing > 0 {
        println!("({missing} key(s) not found)");
    }
    Ok(())
}
