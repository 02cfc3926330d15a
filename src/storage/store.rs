use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::core::models::CachedSummary;
use crate::errors::SummarizerError;

/// Storage key of the single cached summary.
pub const SAVED_SUMMARY_KEY: &str = "savedSummary";

/// Single-slot store for the most recent summary. Last write wins.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backing storage cannot be read or decoded.
    async fn get(&self) -> Result<Option<CachedSummary>, SummarizerError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backing storage cannot be written.
    async fn set(&self, summary: &CachedSummary) -> Result<(), SummarizerError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backing storage cannot be written.
    async fn delete(&self) -> Result<(), SummarizerError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<CachedSummary>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SummaryStore for MemoryStore {
    async fn get(&self) -> Result<Option<CachedSummary>, SummarizerError> {
        Ok(self.slot.lock().await.clone())
    }

    async fn set(&self, summary: &CachedSummary) -> Result<(), SummarizerError> {
        *self.slot.lock().await = Some(summary.clone());
        Ok(())
    }

    async fn delete(&self) -> Result<(), SummarizerError> {
        self.slot.lock().await.take();
        Ok(())
    }
}

/// Key-value JSON file, laid out like extension local storage:
/// `{ "savedSummary": { "summaryHtml": ..., ... } }`.
///
/// Other keys in the file are preserved.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<HashMap<String, Value>, SummarizerError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                SummarizerError::StorageError(format!("{}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(SummarizerError::StorageError(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn write_all(&self, entries: &HashMap<String, Value>) -> Result<(), SummarizerError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

#[async_trait]
impl SummaryStore for FileStore {
    async fn get(&self) -> Result<Option<CachedSummary>, SummarizerError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        let Some(value) = entries.remove(SAVED_SUMMARY_KEY) else {
            debug!(path = %self.path.display(), "No saved summary");
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(value)?))
    }

    async fn set(&self, summary: &CachedSummary) -> Result<(), SummarizerError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        entries.insert(SAVED_SUMMARY_KEY.to_string(), serde_json::to_value(summary)?);
        self.write_all(&entries).await?;
        info!(url = %summary.url, summary_id = %summary.summary_id, "Saved summary");
        Ok(())
    }

    async fn delete(&self) -> Result<(), SummarizerError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        if entries.remove(SAVED_SUMMARY_KEY).is_some() {
            self.write_all(&entries).await?;
            info!("Removed saved summary");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(url: &str) -> CachedSummary {
        CachedSummary {
            summary_html: "<h3>NOTICE:</h3><p>Payment due</p>".into(),
            summary_id: "20240101_1".into(),
            url: url.into(),
            title: "Example".into(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn memory_store_is_single_slot() {
        let store = MemoryStore::new();
        store.set(&sample("https://a.example")).await.unwrap();
        store.set(&sample("https://b.example")).await.unwrap();
        assert_eq!(store.get().await.unwrap().unwrap().url, "https://b.example");

        store.delete().await.unwrap();
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_store_keeps_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = FileStore::new(&path);
        store.set(&sample("https://a.example")).await.unwrap();
        store.delete().await.unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert!(raw.get(SAVED_SUMMARY_KEY).is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileStore::new(&path).get().await.unwrap_err();
        assert!(matches!(err, SummarizerError::StorageError(_)));
    }
}
