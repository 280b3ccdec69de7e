//! Workflow persistence: one JSON file per workflow id.
//!
//! Opaque key-value store keyed by workflow id. The engine never depends on
//! storage internals; it only consumes `Workflow` values loaded from here.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::model::Workflow;

/// Storage failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("workflow not found: {0}")]
    NotFound(String),

    /// Ids become file names; path-unsafe characters are rejected up front.
    #[error("invalid workflow id: {0}")]
    InvalidId(String),
}

/// Listing metadata for one saved workflow.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowMetadata {
    pub id: String,
    pub name: String,
    pub description: String,
    pub node_count: usize,
}

/// Directory-backed workflow store: `<dir>/<workflow-id>.json`.
#[derive(Debug, Clone)]
pub struct WorkflowStorage {
    dir: PathBuf,
}

impl WorkflowStorage {
    /// Opens (and creates when missing) the storage directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StorageError> {
        let safe = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(StorageError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }

    /// Saves (or overwrites) a workflow under its id.
    pub fn save(&self, workflow: &Workflow) -> Result<(), StorageError> {
        let path = self.path_for(&workflow.id)?;
        let json = serde_json::to_string_pretty(workflow)?;
        fs::write(&path, json)?;
        info!(id = %workflow.id, name = %workflow.name, "workflow saved");
        Ok(())
    }

    /// Loads the workflow saved under `id`.
    pub fn load(&self, id: &str) -> Result<Workflow, StorageError> {
        let path = self.path_for(id)?;
        if !path.is_file() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        let json = fs::read_to_string(&path)?;
        let workflow = serde_json::from_str(&json)?;
        debug!(id = %id, "workflow loaded");
        Ok(workflow)
    }

    /// Deletes the workflow saved under `id`.
    pub fn delete(&self, id: &str) -> Result<(), StorageError> {
        let path = self.path_for(id)?;
        if !path.is_file() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        fs::remove_file(&path)?;
        info!(id = %id, "workflow deleted");
        Ok(())
    }

    /// Ids of all saved workflows, sorted.
    pub fn list_all(&self) -> Result<Vec<String>, StorageError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Listing metadata for all saved workflows, sorted by id.
    ///
    /// Unreadable or malformed files are skipped rather than failing the
    /// whole listing.
    pub fn list_with_metadata(&self) -> Result<Vec<WorkflowMetadata>, StorageError> {
        let mut out = Vec::new();
        for id in self.list_all()? {
            match self.load(&id) {
                Ok(wf) => out.push(WorkflowMetadata {
                    id: wf.id,
                    name: wf.name,
                    description: wf.description,
                    node_count: wf.nodes.len(),
                }),
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "skipping unreadable workflow file");
                }
            }
        }
        Ok(out)
    }
}
