//! JSON snapshot files backing each collection.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::actor_framework::{Entity, SnapshotSink};

/// One collection stored as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonCollection {
    path: PathBuf,
}

impl JsonCollection {
    pub fn new(dir: &Path, file_name: &str) -> Self {
        Self {
            path: dir.join(file_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every document. A missing file is an empty collection.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No collection file yet, starting empty");
            return Ok(Vec::new());
        }
        let bytes = fs::read(&self.path).with_context(|| format!("failed to read {}", self.path.display()))?;
        let documents: Vec<T> = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        info!(path = %self.path.display(), documents = documents.len(), "Collection loaded");
        Ok(documents)
    }

    /// Writes the snapshot to a temporary file, then renames it over the old one.
    pub fn save<T: Serialize>(&self, documents: &[&T]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(documents)
            .with_context(|| format!("failed to serialize {}", self.path.display()))?;
        fs::write(&tmp_path, body).with_context(|| format!("failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "failed to atomically move {} to {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;
        debug!(path = %self.path.display(), documents = documents.len(), "Snapshot written");
        Ok(())
    }
}

impl<T: Entity + Serialize> SnapshotSink<T> for JsonCollection {
    fn persist(&self, documents: &[&T]) -> Result<(), String> {
        self.save(documents).map_err(|e| format!("{e:#}"))
    }
}
