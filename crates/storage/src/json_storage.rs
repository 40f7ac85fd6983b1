//! JSON file storage implementation.
//!
//! Stores each task's progress history as a JSON array in a `progress/`
//! directory and keeps a small per-task meta marker (version + updated_at)
//! that is bumped on every append.

use std::path::{Path, PathBuf};
use taskdash_core::{ProgressEntry, TaskId};
use super::{ProgressStore, Result};
use tokio::fs;
use tracing::{debug, warn};

/// File-based JSON progress store.
pub struct JsonProgressStore {
    root: PathBuf,
}

impl JsonProgressStore {
    /// Create storage. This will create the `progress/` and `meta/progress/`
    /// subdirectories under `root`.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("progress")).await?;
        fs::create_dir_all(root.join("meta").join("progress")).await?;

        Ok(Self { root })
    }

    fn history_path(&self, id: TaskId) -> PathBuf {
        self.root.join("progress").join(format!("{}.json", id))
    }

    fn meta_path(&self, id: TaskId) -> PathBuf {
        self.root
            .join("meta")
            .join("progress")
            .join(format!("{}.meta.json", id))
    }

    /// Read and increment the task's version, return the new version.
    async fn bump_version(&self, id: TaskId) -> Result<u64> {
        let path = self.meta_path(id);
        let mut version = 0u64;
        if let Ok(s) = fs::read_to_string(&path).await {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&s) {
                if let Some(v) = json.get("version").and_then(|v| v.as_u64()) {
                    version = v;
                }
            }
        }
        version += 1;
        let meta = serde_json::json!({"version": version, "updated_at": chrono::Utc::now()});
        fs::write(&path, serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(version)
    }

    /// Current meta version of a task's history (0 if never written).
    pub async fn version(&self, id: TaskId) -> Result<u64> {
        let meta: Option<serde_json::Value> = read_json(&self.meta_path(id)).await?;
        Ok(meta
            .and_then(|m| m.get("version").and_then(|v| v.as_u64()))
            .unwrap_or(0))
    }
}

#[async_trait::async_trait]
impl ProgressStore for JsonProgressStore {
    async fn append_entry(&mut self, task_id: TaskId, entry: &ProgressEntry) -> Result<()> {
        entry.validate()?;

        let path = self.history_path(task_id);
        let mut history: Vec<ProgressEntry> = read_json(&path).await?.unwrap_or_default();
        history.push(entry.clone());

        let json = serde_json::to_string_pretty(&history)?;
        fs::write(&path, json.as_bytes()).await?;

        let version = self.bump_version(task_id).await?;
        debug!(%task_id, version, entries = history.len(), "Appended progress entry");
        Ok(())
    }

    async fn load_history(&self, task_id: TaskId) -> Result<Vec<ProgressEntry>> {
        Ok(read_json(&self.history_path(task_id)).await?.unwrap_or_default())
    }

    async fn list_tasks(&self) -> Result<Vec<TaskId>> {
        let mut ids = Vec::new();
        let mut rd = fs::read_dir(self.root.join("progress")).await?;
        while let Some(entry) = rd.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match stem.parse::<TaskId>() {
                Ok(id) => ids.push(id),
                Err(_) => warn!(file = %path.display(), "Skipping history file with invalid task id"),
            }
        }
        ids.sort();
        Ok(ids)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
