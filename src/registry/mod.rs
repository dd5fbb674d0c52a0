//! The application registry: named handler instances plus their restart
//! metadata, with optional snapshot persistence.
//!
//! Every mutation goes through the registry so the routing tree and the
//! metadata records can never drift apart. Registration is all-or-nothing:
//! a failed load or construction leaves both untouched.

use crate::core::{DockError, Result};
use crate::loader::{ConstructRequest, UnitLoader};
use crate::routing::{Handler, Router};
use crate::spec::UnitSpec;
use crate::state::{RegistrySnapshot, SnapshotEntry, StateManager};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Names starting with this character are reserved for system handlers.
pub const RESERVED_PREFIX: char = '_';

/// One registered application: identity, provenance and the live instance.
pub struct ApplicationRecord {
    pub name: String,
    pub spec: String,
    pub resolved_path: PathBuf,
    pub module_id: String,
    pub class_name: String,
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
    instance: Arc<dyn Handler>,
}

impl ApplicationRecord {
    pub fn instance(&self) -> Arc<dyn Handler> {
        Arc::clone(&self.instance)
    }
}

/// Flat description of a record, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct AppSummary {
    pub name: String,
    pub spec: String,
    pub path: String,
    pub module: String,
    pub class: String,
}

impl From<&ApplicationRecord> for AppSummary {
    fn from(record: &ApplicationRecord) -> Self {
        Self {
            name: record.name.clone(),
            spec: record.spec.clone(),
            path: record.resolved_path.display().to_string(),
            module: record.module_id.clone(),
            class: record.class_name.clone(),
        }
    }
}

/// Result of a remove request. Removing an unknown name is not an error;
/// the outcome says what happened and what is available.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemoveOutcome {
    Removed { name: String },
    NotFound { name: String, available: Vec<String> },
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub name: String,
    pub error: String,
}

/// What a restore actually did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RestoreReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedEntry>,
}

/// Named application instances backed by a unit loader, mounted on a
/// routing tree, optionally persisted through a [`StateManager`].
pub struct AppRegistry {
    records: BTreeMap<String, ApplicationRecord>,
    router: Router,
    loader: Box<dyn UnitLoader>,
    state: Option<StateManager>,
    autosave: bool,
    autosave_suspended: bool,
}

impl AppRegistry {
    pub fn new(loader: Box<dyn UnitLoader>) -> Self {
        Self {
            records: BTreeMap::new(),
            router: Router::new(),
            loader,
            state: None,
            autosave: false,
            autosave_suspended: false,
        }
    }

    pub fn with_state(mut self, state: StateManager) -> Self {
        self.state = Some(state);
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn state(&self) -> Option<&StateManager> {
        self.state.as_ref()
    }

    /// Register an application under a unique name. The spec is parsed and
    /// resolved, its class loaded and constructed, and only then does the
    /// registry change.
    pub fn add(
        &mut self,
        name: &str,
        spec: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<AppSummary> {
        if self.records.contains_key(name) {
            return Err(DockError::DuplicateName(name.to_string()));
        }
        if name.starts_with(RESERVED_PREFIX) {
            return Err(DockError::ReservedName(name.to_string(), RESERVED_PREFIX));
        }

        let parsed = UnitSpec::parse(spec)?;
        let loaded = self.loader.load(&parsed)?;
        let request = ConstructRequest {
            unit_path: parsed.resolved_path.clone(),
            class_name: parsed.class_name.clone(),
            args: args.clone(),
            kwargs: kwargs.clone(),
        };
        let instance: Arc<dyn Handler> = Arc::from(loaded.factory.construct(&request)?);

        let record = ApplicationRecord {
            name: name.to_string(),
            spec: spec.to_string(),
            resolved_path: parsed.resolved_path,
            module_id: loaded.module_id,
            class_name: parsed.class_name,
            args,
            kwargs,
            instance: Arc::clone(&instance),
        };
        let summary = AppSummary::from(&record);

        self.router.attach(name, instance);
        self.records.insert(name.to_string(), record);
        tracing::info!(name, spec, "application registered");

        self.after_mutation();
        Ok(summary)
    }

    /// Remove a registered application. Idempotent.
    pub fn remove(&mut self, name: &str) -> RemoveOutcome {
        if self.records.remove(name).is_some() {
            self.router.detach(name);
            tracing::info!(name, "application removed");
            self.after_mutation();
            RemoveOutcome::Removed {
                name: name.to_string(),
            }
        } else {
            RemoveOutcome::NotFound {
                name: name.to_string(),
                available: self.names(),
            }
        }
    }

    /// Summaries of every registered application, sorted by name.
    pub fn list(&self) -> Vec<AppSummary> {
        self.records.values().map(AppSummary::from).collect()
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Handler>> {
        self.records
            .get(name)
            .map(ApplicationRecord::instance)
            .ok_or_else(|| DockError::NotRegistered {
                name: name.to_string(),
                available: self.names(),
            })
    }

    pub fn record(&self, name: &str) -> Option<&ApplicationRecord> {
        self.records.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pure view of the current state as a persistable snapshot.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut snapshot = RegistrySnapshot::empty(self.autosave);
        snapshot.apps = self
            .records
            .values()
            .map(|record| SnapshotEntry {
                name: record.name.clone(),
                spec: record.spec.clone(),
                args: record.args.clone(),
                kwargs: record.kwargs.clone(),
            })
            .collect();
        snapshot
    }

    /// Replace the current contents with a snapshot's applications.
    ///
    /// With `skip_missing`, entries that fail to load are recorded in the
    /// report and the rest proceed. Without it, the first failure aborts
    /// and the registry is left with whatever loaded before the failure.
    /// Autosave is suspended for the duration so a restore performs at
    /// most one snapshot write, after it fully succeeds.
    pub fn restore(
        &mut self,
        snapshot: &RegistrySnapshot,
        skip_missing: bool,
    ) -> Result<RestoreReport> {
        let was_suspended = self.autosave_suspended;
        self.autosave_suspended = true;

        self.autosave = snapshot.autosave;
        self.clear_all();

        let mut report = RestoreReport::default();
        let mut outcome = Ok(());
        for entry in &snapshot.apps {
            match self.add(
                &entry.name,
                &entry.spec,
                entry.args.clone(),
                entry.kwargs.clone(),
            ) {
                Ok(_) => report.loaded += 1,
                Err(err) if skip_missing => {
                    tracing::warn!(name = %entry.name, error = %err, "snapshot entry skipped");
                    report.skipped.push(SkippedEntry {
                        name: entry.name.clone(),
                        error: err.to_string(),
                    });
                }
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }

        self.autosave_suspended = was_suspended;
        outcome?;
        self.after_mutation();
        Ok(report)
    }

    /// Restore from the configured snapshot file if one exists. A missing
    /// file is a normal first run, not an error.
    pub fn restore_saved(&mut self) -> Result<Option<RestoreReport>> {
        let Some(state) = &self.state else {
            return Ok(None);
        };
        let snapshot = match state.load() {
            Ok(snapshot) => snapshot,
            Err(DockError::SnapshotMissing(_)) => return Ok(None),
            Err(err) => return Err(err),
        };
        let report = self.restore(&snapshot, true)?;
        for skipped in &report.skipped {
            tracing::warn!(name = %skipped.name, error = %skipped.error, "not restored");
        }
        Ok(Some(report))
    }

    /// Query or set the autosave flag. Setting the flag does not write a
    /// snapshot by itself; the next mutation does.
    pub fn autosave(&mut self, enable: Option<bool>) -> bool {
        if let Some(enable) = enable {
            self.autosave = enable;
            tracing::info!(enable, "autosave flag changed");
        }
        self.autosave
    }

    /// Explicitly write the current state to the configured snapshot file.
    pub fn save(&self) -> Result<()> {
        let state = self.state.as_ref().ok_or(DockError::StateNotConfigured)?;
        state.save(&self.snapshot())
    }

    fn clear_all(&mut self) {
        for name in self.names() {
            self.router.detach(&name);
        }
        self.records.clear();
    }

    /// Post-mutation hook: persist if autosave is on. The mutation itself
    /// already committed, so a failed write is logged, not propagated.
    fn after_mutation(&mut self) {
        if !self.autosave || self.autosave_suspended {
            return;
        }
        let Some(state) = &self.state else {
            return;
        };
        if let Err(err) = state.save(&self.snapshot()) {
            tracing::warn!(error = %err, "autosave failed");
        }
    }
}
