// src/tracker/store.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::fs;

/// Persisted cursor record: `{ "lastVideoId": "..." }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CursorRecord {
    #[serde(rename = "lastVideoId")]
    last_video_id: Option<String>,
}

/// Load/save seam for the announcement cursor, so the backend can move to a
/// key-value store or a database row without touching tracker logic.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// `None` covers both "no record yet" and "record unreadable" — either
    /// way the tracker behaves as on a first run.
    async fn load(&self) -> Option<String>;
    async fn save(&self, video_id: &str) -> Result<()>;
}

pub struct FileCursorStore {
    path: PathBuf,
}

impl FileCursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CursorStore for FileCursorStore {
    async fn load(&self) -> Option<String> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(_) => return None,
        };
        match serde_json::from_str::<CursorRecord>(&raw) {
            Ok(rec) => rec.last_video_id,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "malformed cursor record, treating as first run"
                );
                None
            }
        }
    }

    async fn save(&self, video_id: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("creating cursor dir {}", dir.display()))?;
            }
        }
        let rec = CursorRecord {
            last_video_id: Some(video_id.to_string()),
        };
        let body = serde_json::to_vec_pretty(&rec).context("encoding cursor record")?;
        fs::write(&self.path, body)
            .await
            .with_context(|| format!("writing cursor to {}", self.path.display()))
    }
}

/// In-process store, used by tests and handy for dry runs.
#[derive(Default)]
pub struct MemoryCursorStore {
    inner: Mutex<Option<String>>,
}

impl MemoryCursorStore {
    pub fn with_cursor(video_id: &str) -> Self {
        Self {
            inner: Mutex::new(Some(video_id.to_string())),
        }
    }

    pub fn current(&self) -> Option<String> {
        self.inner.lock().expect("cursor mutex poisoned").clone()
    }
}

#[async_trait]
impl CursorStore for MemoryCursorStore {
    async fn load(&self) -> Option<String> {
        self.current()
    }

    async fn save(&self, video_id: &str) -> Result<()> {
        *self.inner.lock().expect("cursor mutex poisoned") = Some(video_id.to_string());
        Ok(())
    }
}
