//! Tier stored as a single JSON object file.
//!
//! Meant for a directory kept in sync by an external service (cloud drive,
//! network share), which is where the write quota comes from. The whole file
//! is rewritten on every change via a temp file and rename, so a reader on
//! another machine never sees a half-written document.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::Tier;
use crate::error::TierError;
use crate::value::Entries;

pub struct JsonFileTier {
    name: String,
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    io: Mutex<()>,
}

impl JsonFileTier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            name: "remote".to_string(),
            path: path.into(),
            io: Mutex::new(()),
        }
    }

    /// Rename the tier in logs and reports.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole document. A missing file is an empty store.
    async fn load(&self) -> Result<Entries, TierError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Entries::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn store(&self, entries: &Entries) -> Result<(), TierError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(entries)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl Tier for JsonFileTier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, keys: &[String]) -> Result<Entries, TierError> {
        let _guard = self.io.lock().await;
        let mut all = self.load().await?;
        Ok(keys
            .iter()
            .filter_map(|k| all.remove_entry(k))
            .collect())
    }

    async fn set(&self, entries: &Entries) -> Result<(), TierError> {
        if entries.is_empty() {
            return Ok(());
        }
        let _guard = self.io.lock().await;
        let mut all = self.load().await?;
        all.extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.store(&all).await?;
        tracing::debug!(path = %self.path.display(), count = entries.len(), "wrote file tier");
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<(), TierError> {
        let _guard = self.io.lock().await;
        let mut all = self.load().await?;
        let before = all.len();
        for k in keys {
            all.remove(k);
        }
        if all.len() != before {
            self.store(&all).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn keys(ks: &[&str]) -> Vec<String> {
        ks.iter().map(|k| k.to_string()).collect()
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let tier = JsonFileTier::new(dir.path().join("sync.json")).with_name("cloud");
        assert_eq!(tier.name(), "cloud");
        assert!(tier.get(&keys(&["/a"])).await.unwrap().is_empty());
        // Removing from a missing file does not create it.
        tier.remove(&keys(&["/a"])).await.unwrap();
        assert!(!tier.path().exists());
    }

    #[tokio::test]
    async fn set_merges_into_existing_document() {
        let dir = tempdir().unwrap();
        let tier = JsonFileTier::new(dir.path().join("nested").join("sync.json"));

        let mut first = Entries::new();
        first.insert("/a".into(), json!(1));
        tier.set(&first).await.unwrap();

        let mut second = Entries::new();
        second.insert("/b".into(), json!({ "currentTime": 2 }));
        tier.set(&second).await.unwrap();

        let got = tier.get(&keys(&["/a", "/b"])).await.unwrap();
        assert_eq!(got["/a"], json!(1));
        assert_eq!(got["/b"], json!({ "currentTime": 2 }));

        let on_disk: serde_json::Value =
            serde_json::from_slice(&std::fs::read(tier.path()).unwrap()).unwrap();
        assert_eq!(on_disk, json!({ "/a": 1, "/b": { "currentTime": 2 } }));
    }

    #[tokio::test]
    async fn remove_deletes_only_named_keys() {
        let dir = tempdir().unwrap();
        let tier = JsonFileTier::new(dir.path().join("sync.json"));
        let entries: Entries = [("/a", 1), ("/b", 2), ("/c", 3)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();
        tier.set(&entries).await.unwrap();

        tier.remove(&keys(&["/a", "/c"])).await.unwrap();
        let got = tier.get(&keys(&["/a", "/b", "/c"])).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got["/b"], json!(2));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sync.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let tier = JsonFileTier::new(&path);
        assert!(matches!(
            tier.get(&keys(&["/a"])).await,
            Err(TierError::Json(_))
        ));
    }
}
