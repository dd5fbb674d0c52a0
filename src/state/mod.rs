//! Snapshot persistence for the application registry.
//!
//! The snapshot stores restart metadata only (name, spec, constructor
//! arguments), never resolved paths or live instances; those are
//! re-derived on restore. Writes go through a temp file plus rename so a
//! crash mid-write never leaves a truncated snapshot behind. Concurrent
//! writers from multiple processes are unsupported: last writer wins.

use crate::core::{DockError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Restart metadata for one registered application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub name: String,
    pub spec: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

/// The persisted registry artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub version: u32,
    pub autosave: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    pub apps: Vec<SnapshotEntry>,
}

impl RegistrySnapshot {
    pub fn empty(autosave: bool) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            autosave,
            saved_at: None,
            apps: Vec::new(),
        }
    }
}

/// Reads and writes [`RegistrySnapshot`] files.
#[derive(Debug, Clone)]
pub struct StateManager {
    snapshot_path: PathBuf,
}

impl StateManager {
    pub fn new<P: AsRef<Path>>(snapshot_path: P) -> Self {
        Self {
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
        }
    }

    /// Default location under the per-user configuration directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("appdock")
            .join("registry.json")
    }

    pub fn path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn exists(&self) -> bool {
        self.snapshot_path.exists()
    }

    pub fn save(&self, snapshot: &RegistrySnapshot) -> Result<()> {
        if let Some(parent) = self.snapshot_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DockError::IoError(format!("Failed to create snapshot directory: {e}"))
            })?;
        }

        let mut snapshot = snapshot.clone();
        snapshot.saved_at = Some(Utc::now());
        let serialized = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| DockError::IoError(format!("Failed to serialize snapshot: {e}")))?;

        let temp_path = self.snapshot_path.with_extension("tmp");
        let temp_file = File::create(&temp_path)
            .map_err(|e| DockError::IoError(format!("Failed to create temp file: {e}")))?;
        let mut writer = BufWriter::new(temp_file);
        writer
            .write_all(serialized.as_bytes())
            .map_err(|e| DockError::IoError(format!("Failed to write snapshot: {e}")))?;
        writer
            .flush()
            .map_err(|e| DockError::IoError(format!("Failed to flush snapshot: {e}")))?;
        writer
            .get_mut()
            .sync_all()
            .map_err(|e| DockError::IoError(format!("Failed to sync snapshot: {e}")))?;
        fs::rename(&temp_path, &self.snapshot_path)
            .map_err(|e| DockError::IoError(format!("Failed to rename snapshot: {e}")))?;

        tracing::debug!(
            path = %self.snapshot_path.display(),
            apps = snapshot.apps.len(),
            "snapshot written"
        );
        Ok(())
    }

    pub fn load(&self) -> Result<RegistrySnapshot> {
        if !self.exists() {
            return Err(DockError::SnapshotMissing(self.snapshot_path.clone()));
        }

        let raw = fs::read_to_string(&self.snapshot_path)
            .map_err(|e| DockError::IoError(format!("Failed to read snapshot: {e}")))?;
        let document: Value = serde_json::from_str(&raw)
            .map_err(|e| DockError::MalformedSnapshot(format!("not valid JSON: {e}")))?;

        if !document
            .get("apps")
            .map(Value::is_array)
            .unwrap_or(false)
        {
            return Err(DockError::MalformedSnapshot(
                "missing 'apps' list".to_string(),
            ));
        }

        serde_json::from_value(document)
            .map_err(|e| DockError::MalformedSnapshot(e.to_string()))
    }

    pub fn delete(&self) -> Result<()> {
        if self.exists() {
            fs::remove_file(&self.snapshot_path)
                .map_err(|e| DockError::IoError(format!("Failed to delete snapshot: {e}")))?;
        }
        Ok(())
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_snapshot() -> RegistrySnapshot {
        let mut snapshot = RegistrySnapshot::empty(true);
        snapshot.apps.push(SnapshotEntry {
            name: "shop".to_string(),
            spec: "/tmp/shop.unit:Shop".to_string(),
            args: vec![json!("flagship")],
            kwargs: Map::new(),
        });
        snapshot
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let state = StateManager::new(dir.path().join("registry.json"));

        state.save(&sample_snapshot()).unwrap();
        let loaded = state.load().unwrap();

        assert_eq!(loaded.version, SNAPSHOT_VERSION);
        assert!(loaded.autosave);
        assert!(loaded.saved_at.is_some());
        assert_eq!(loaded.apps.len(), 1);
        assert_eq!(loaded.apps[0].name, "shop");
        assert_eq!(loaded.apps[0].args, vec![json!("flagship")]);
    }

    #[test]
    fn missing_snapshot_is_reported() {
        let dir = TempDir::new().unwrap();
        let state = StateManager::new(dir.path().join("registry.json"));
        assert!(matches!(
            state.load(),
            Err(DockError::SnapshotMissing(_))
        ));
    }

    #[test]
    fn snapshot_without_apps_list_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, r#"{"version": 1, "autosave": false}"#).unwrap();

        let state = StateManager::new(&path);
        assert!(matches!(
            state.load(),
            Err(DockError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, "not json").unwrap();

        let state = StateManager::new(&path);
        assert!(matches!(
            state.load(),
            Err(DockError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let state = StateManager::new(dir.path().join("registry.json"));
        state.save(&sample_snapshot()).unwrap();

        assert!(state.exists());
        assert!(!dir.path().join("registry.tmp").exists());
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let state = StateManager::new(dir.path().join("registry.json"));
        state.save(&sample_snapshot()).unwrap();

        state.delete().unwrap();
        assert!(!state.exists());
        state.delete().unwrap();
    }
}
