//! SQLite-backed tier (sqlx). Default local tier.
//!
//! One row per key; values are stored as JSON text so any shape a caller
//! saves round-trips unchanged.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, QueryBuilder, Row, Sqlite};

use super::Tier;
use crate::error::TierError;
use crate::value::Entries;

/// Keys per `IN (...)` query, well under SQLite's bound-parameter limit.
const READ_CHUNK: usize = 500;

/// `sqlite://` URI for a database file. Characters the URI parser treats as
/// delimiters are escaped.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Handle to the SQLite-backed key-value table.
///
/// The default database file lives under the XDG state directory:
/// `~/.local/state/playmark/positions.db`.
#[derive(Clone)]
pub struct SqliteTier {
    name: String,
    pool: Pool<Sqlite>,
}

impl SqliteTier {
    /// Open (or create) the database at `path`. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self, TierError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&uri)
            .await?;
        let tier = SqliteTier {
            name: "local".to_string(),
            pool,
        };
        tier.migrate().await?;
        tracing::debug!(path = %path.display(), "opened local tier");
        Ok(tier)
    }

    /// Open an in-memory database (no disk I/O).
    pub async fn open_memory() -> Result<Self, TierError> {
        // Single connection so the pool never hands back a different empty DB.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let tier = SqliteTier {
            name: "local".to_string(),
            pool,
        };
        tier.migrate().await?;
        Ok(tier)
    }

    /// Rename the tier in logs and reports.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    async fn migrate(&self) -> Result<(), TierError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                key TEXT PRIMARY KEY NOT NULL,
                value_json TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Number of stored keys.
    pub async fn count(&self) -> Result<i64, TierError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}

#[async_trait]
impl Tier for SqliteTier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, keys: &[String]) -> Result<Entries, TierError> {
        let mut out = Entries::new();
        for chunk in keys.chunks(READ_CHUNK) {
            let mut qb: QueryBuilder<Sqlite> =
                QueryBuilder::new("SELECT key, value_json FROM entries WHERE key IN (");
            let mut sep = qb.separated(", ");
            for k in chunk {
                sep.push_bind(k.as_str());
            }
            sep.push_unseparated(")");

            let rows = qb.build().fetch_all(&self.pool).await?;
            for row in rows {
                let key: String = row.get("key");
                let json: String = row.get("value_json");
                match serde_json::from_str(&json) {
                    Ok(value) => {
                        out.insert(key, value);
                    }
                    Err(e) => tracing::warn!(key, "skipping unreadable stored value: {}", e),
                }
            }
        }
        Ok(out)
    }

    async fn set(&self, entries: &Entries) -> Result<(), TierError> {
        if entries.is_empty() {
            return Ok(());
        }
        let now = unix_timestamp();
        let mut tx = self.pool.begin().await?;
        for (key, value) in entries {
            let json = serde_json::to_string(value)?;
            sqlx::query(
                r#"
                INSERT INTO entries (key, value_json, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE
                SET value_json = excluded.value_json,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(json)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<(), TierError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for key in keys {
            sqlx::query("DELETE FROM entries WHERE key = ?1")
                .bind(key)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(ks: &[&str]) -> Vec<String> {
        ks.iter().map(|k| k.to_string()).collect()
    }

    #[tokio::test]
    async fn set_get_remove_roundtrip() {
        let tier = SqliteTier::open_memory().await.unwrap();
        assert!(tier.get(&keys(&["/a"])).await.unwrap().is_empty());

        let mut entries = Entries::new();
        entries.insert("/a".into(), json!(42));
        entries.insert("/b".into(), json!({ "currentTime": 300.5 }));
        entries.insert("/show\\season".into(), json!({ "lastWatchedSeason": "2" }));
        tier.set(&entries).await.unwrap();
        assert_eq!(tier.count().await.unwrap(), 3);

        let got = tier
            .get(&keys(&["/a", "/b", "/show\\season", "/missing"]))
            .await
            .unwrap();
        assert_eq!(got, entries);

        tier.remove(&keys(&["/a", "/missing"])).await.unwrap();
        assert_eq!(tier.count().await.unwrap(), 2);
        assert!(tier.get(&keys(&["/a"])).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_overwrites_existing_value() {
        let tier = SqliteTier::open_memory().await.unwrap();
        let mut first = Entries::new();
        first.insert("/a".into(), json!(10));
        tier.set(&first).await.unwrap();

        let mut second = Entries::new();
        second.insert("/a".into(), json!({ "currentTime": 20 }));
        tier.set(&second).await.unwrap();

        let got = tier.get(&keys(&["/a"])).await.unwrap();
        assert_eq!(got["/a"], json!({ "currentTime": 20 }));
        assert_eq!(tier.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn get_handles_more_keys_than_one_chunk() {
        let tier = SqliteTier::open_memory().await.unwrap();
        let entries: Entries = (0..(READ_CHUNK + 25))
            .map(|i| (format!("/ep{i}"), json!(i)))
            .collect();
        tier.set(&entries).await.unwrap();

        let all: Vec<String> = entries.keys().cloned().collect();
        let got = tier.get(&all).await.unwrap();
        assert_eq!(got.len(), entries.len());
    }

    #[tokio::test]
    async fn open_at_creates_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("positions.db");
        let tier = SqliteTier::open_at(&path).await.unwrap().with_name("primary");
        assert_eq!(tier.name(), "primary");
        assert!(path.exists());
        assert_eq!(tier.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unreadable_row_reads_as_missing() {
        let tier = SqliteTier::open_memory().await.unwrap();
        let mut entries = Entries::new();
        entries.insert("/good".into(), json!({ "currentTime": 12 }));
        tier.set(&entries).await.unwrap();
        sqlx::query("INSERT INTO entries (key, value_json, updated_at) VALUES (?1, ?2, 0)")
            .bind("/bad")
            .bind("{ truncated")
            .execute(&tier.pool)
            .await
            .unwrap();

        let got = tier.get(&keys(&["/good", "/bad"])).await.unwrap();
        assert_eq!(got, entries);
        assert_eq!(tier.count().await.unwrap(), 2);
    }

    #[test]
    fn sqlite_uri_escapes_special_chars() {
        let uri = path_to_sqlite_uri(Path::new("/tmp/my dir/#1.db"));
        assert_eq!(uri, "sqlite:///tmp/my%20dir/%231.db");
    }
}
