//! Unit loading: resolve a parsed spec into a constructible class.
//!
//! Arbitrary post-build code loading is not native to a compiled target, so
//! the shipped loader is a build-time registry of unit classes keyed by
//! class name: classes register themselves through [`inventory`] and the
//! unit *file* carries per-instance configuration that the factory may
//! read. The loader stays behind the [`UnitLoader`] trait so tests (or an
//! embedding application) can plug in their own factories.

use crate::core::{DockError, Result};
use crate::routing::Handler;
use crate::spec::UnitSpec;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a factory needs to build one handler instance: the unit file
/// plus the constructor arguments replayed verbatim on restore.
#[derive(Debug, Clone)]
pub struct ConstructRequest {
    pub unit_path: PathBuf,
    pub class_name: String,
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

/// Factory for one unit class.
pub trait UnitFactory: Send + Sync {
    /// Load-time hook, run once per `load`. This is where a unit performs
    /// its top-level initialization side effects.
    fn on_load(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn construct(&self, request: &ConstructRequest) -> Result<Box<dyn Handler>>;
}

/// A class resolved from a unit spec.
pub struct LoadedClass {
    /// Synthetic module identifier, collision-resistant across registry
    /// names: file stem plus a hash of the full path.
    pub module_id: String,
    pub factory: Arc<dyn UnitFactory>,
}

impl std::fmt::Debug for LoadedClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedClass")
            .field("module_id", &self.module_id)
            .finish_non_exhaustive()
    }
}

pub trait UnitLoader: Send + Sync {
    fn load(&self, spec: &UnitSpec) -> Result<LoadedClass>;
}

pub type ConstructFn = fn(&ConstructRequest) -> Result<Box<dyn Handler>>;

/// Build-time registered unit class, collected through `inventory`.
pub struct UnitClass {
    pub name: &'static str,
    pub construct: ConstructFn,
}

inventory::collect!(UnitClass);

struct FnFactory(ConstructFn);

impl UnitFactory for FnFactory {
    fn construct(&self, request: &ConstructRequest) -> Result<Box<dyn Handler>> {
        (self.0)(request)
    }
}

/// Loader backed by the build-time class registry.
pub struct StaticUnitLoader {
    classes: BTreeMap<String, Arc<dyn UnitFactory>>,
}

impl StaticUnitLoader {
    pub fn new() -> Self {
        Self {
            classes: BTreeMap::new(),
        }
    }

    /// Loader pre-populated with every `inventory`-registered class.
    pub fn with_builtin_classes() -> Self {
        let mut loader = Self::new();
        for class in inventory::iter::<UnitClass> {
            loader.register(class.name, Arc::new(FnFactory(class.construct)));
        }
        loader
    }

    pub fn register(&mut self, name: &str, factory: Arc<dyn UnitFactory>) {
        tracing::debug!(class = name, "unit class registered");
        self.classes.insert(name.to_string(), factory);
    }

    pub fn class_names(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }
}

impl Default for StaticUnitLoader {
    fn default() -> Self {
        Self::with_builtin_classes()
    }
}

impl UnitLoader for StaticUnitLoader {
    fn load(&self, spec: &UnitSpec) -> Result<LoadedClass> {
        let module_id = module_id(&spec.resolved_path);
        let factory = self
            .classes
            .get(&spec.class_name)
            .cloned()
            .ok_or_else(|| DockError::ClassNotFound {
                module: module_id.clone(),
                class: spec.class_name.clone(),
            })?;
        factory.on_load(&spec.resolved_path)?;
        Ok(LoadedClass { module_id, factory })
    }
}

/// Synthesize a module identifier from the file stem and a hash of the
/// full path, so loading the same file under different registry names
/// never collides with another unit of the same stem.
pub fn module_id(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unit");
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    format!("unit_{}_{:016x}", stem, hasher.finish())
}
