use appdock::core::DockError;
use appdock::loader::{ConstructRequest, StaticUnitLoader, UnitFactory};
use appdock::registry::{AppRegistry, RemoveOutcome};
use appdock::routing::Handler;
use serde_json::Map;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

struct FailingFactory;

impl UnitFactory for FailingFactory {
    fn construct(&self, request: &ConstructRequest) -> appdock::Result<Box<dyn Handler>> {
        Err(DockError::ConstructorError {
            class: request.class_name.clone(),
            reason: "refused to start".to_string(),
        })
    }
}

fn unit_file(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, "{}").unwrap();
    path
}

fn registry() -> AppRegistry {
    AppRegistry::new(Box::new(StaticUnitLoader::with_builtin_classes()))
}

#[test]
fn added_app_appears_in_sorted_list() {
    let dir = TempDir::new().unwrap();
    let spec_b = unit_file(&dir, "b.unit").display().to_string();
    let spec_a = unit_file(&dir, "a.unit").display().to_string();

    let mut registry = registry();
    registry.add("zeta", &spec_b, vec![], Map::new()).unwrap();
    let summary = registry.add("alpha", &spec_a, vec![], Map::new()).unwrap();

    assert_eq!(summary.name, "alpha");
    assert_eq!(summary.class, "Main");
    assert_eq!(registry.names(), vec!["alpha", "zeta"]);
    assert!(registry.router().contains("alpha"));
}

#[test]
fn duplicate_name_fails_and_leaves_registry_unchanged() {
    let dir = TempDir::new().unwrap();
    let spec = unit_file(&dir, "app.unit").display().to_string();

    let mut registry = registry();
    registry.add("app", &spec, vec![], Map::new()).unwrap();
    let err = registry.add("app", &spec, vec![], Map::new()).unwrap_err();

    assert!(matches!(err, DockError::DuplicateName(name) if name == "app"));
    assert_eq!(registry.names(), vec!["app"]);
}

#[test]
fn reserved_prefix_is_rejected() {
    let dir = TempDir::new().unwrap();
    let spec = unit_file(&dir, "app.unit").display().to_string();

    let mut registry = registry();
    let err = registry.add("_app", &spec, vec![], Map::new()).unwrap_err();

    assert!(matches!(err, DockError::ReservedName(name, '_') if name == "_app"));
    assert!(registry.is_empty());
}

#[test]
fn get_unknown_lists_available_names() {
    let dir = TempDir::new().unwrap();
    let spec = unit_file(&dir, "app.unit").display().to_string();

    let mut registry = registry();
    registry.add("shop", &spec, vec![], Map::new()).unwrap();

    let err = registry.get("ghost").unwrap_err();
    match err {
        DockError::NotRegistered { name, available } => {
            assert_eq!(name, "ghost");
            assert_eq!(available, vec!["shop"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn removal_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let spec = unit_file(&dir, "app.unit").display().to_string();

    let mut registry = registry();
    registry.add("shop", &spec, vec![], Map::new()).unwrap();

    assert!(matches!(
        registry.remove("shop"),
        RemoveOutcome::Removed { name } if name == "shop"
    ));
    assert!(matches!(
        registry.remove("shop"),
        RemoveOutcome::NotFound { name, .. } if name == "shop"
    ));
    assert!(matches!(
        registry.remove("shop"),
        RemoveOutcome::NotFound { .. }
    ));
    assert!(!registry.router().contains("shop"));
}

#[test]
fn constructor_failure_leaves_registry_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = unit_file(&dir, "broken.unit");

    let mut loader = StaticUnitLoader::with_builtin_classes();
    loader.register("Broken", Arc::new(FailingFactory));
    let mut registry = AppRegistry::new(Box::new(loader));

    let spec = format!("{}:Broken", path.display());
    let err = registry.add("bad", &spec, vec![], Map::new()).unwrap_err();

    assert!(matches!(err, DockError::ConstructorError { .. }));
    assert!(registry.is_empty());
    assert!(!registry.router().contains("bad"));
}

#[test]
fn unknown_class_fails_add() {
    let dir = TempDir::new().unwrap();
    let path = unit_file(&dir, "app.unit");

    let mut registry = registry();
    let spec = format!("{}:Ghost", path.display());
    let err = registry.add("app", &spec, vec![], Map::new()).unwrap_err();

    assert!(matches!(err, DockError::ClassNotFound { class, .. } if class == "Ghost"));
    assert!(registry.is_empty());
}

#[test]
fn missing_unit_file_fails_add() {
    let dir = TempDir::new().unwrap();
    let spec = dir.path().join("nope.unit").display().to_string();

    let mut registry = registry();
    let err = registry.add("app", &spec, vec![], Map::new()).unwrap_err();
    assert!(matches!(err, DockError::PathNotFound(_)));
}
