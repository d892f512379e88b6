//! Detection cache
//!
//! A located toolkit is written out as JSON so subsequent runs can skip the
//! probing entirely. A cache entry whose recorded executables no longer
//! exist is considered stale and ignored.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::Toolkit;
use crate::fs::FileSystem;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    detected_at: DateTime<Utc>,
    toolkit: Toolkit,
}

/// File-backed cache of the last successful detection.
pub struct ToolkitCache {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl ToolkitCache {
    pub fn new(path: PathBuf, fs: Arc<dyn FileSystem>) -> Self {
        Self { path, fs }
    }

    /// Default cache location under the user cache directory.
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("qtbuild")
            .join("toolkit.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cached toolkit, if any. A missing, unreadable or corrupt
    /// cache file and a stale entry all come back as `None` so the caller
    /// falls through to detection.
    pub fn load(&self) -> Option<Toolkit> {
        let content = match self.fs.read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => {
                debug!(path = %self.path.display(), "No toolkit cache");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt toolkit cache");
                return None;
            }
        };

        if !self.fs.is_file(&entry.toolkit.uic) || !self.fs.is_file(&entry.toolkit.moc) {
            warn!(
                path = %self.path.display(),
                "Cached toolkit executables no longer exist, re-detecting"
            );
            return None;
        }

        debug!(
            path = %self.path.display(),
            detected_at = %entry.detected_at,
            "Toolkit loaded from cache"
        );
        Some(entry.toolkit)
    }

    /// Persists a freshly detected toolkit.
    pub fn store(&self, toolkit: &Toolkit) -> Result<()> {
        let entry = CacheEntry {
            detected_at: Utc::now(),
            toolkit: toolkit.clone(),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create cache directory {:?}", parent))?;
        }

        let content =
            serde_json::to_string_pretty(&entry).context("Failed to serialize toolkit cache")?;
        fs::write(&self.path, content)
            .context(format!("Failed to write toolkit cache {:?}", self.path))?;

        debug!(path = %self.path.display(), "Toolkit cache written");
        Ok(())
    }
}
