use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DockError {
    // Spec errors
    #[error("Application spec cannot be empty")]
    EmptySpec,

    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Spec must reference a unit file, got directory: {0}")]
    NotAFile(PathBuf),

    // Load errors
    #[error("Unit '{module}' has no class '{class}'")]
    ClassNotFound { module: String, class: String },

    #[error("Constructor for class '{class}' failed: {reason}")]
    ConstructorError { class: String, reason: String },

    // Registry errors
    #[error("App '{0}' already registered")]
    DuplicateName(String),

    #[error("App name '{0}' is reserved: names must not start with '{1}'")]
    ReservedName(String, char),

    #[error("App '{name}' not registered. Available: {}", format_available(.available))]
    NotRegistered { name: String, available: Vec<String> },

    // State errors
    #[error("Snapshot file not found: {0}")]
    SnapshotMissing(PathBuf),

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("No snapshot file configured")]
    StateNotConfigured,

    // Dispatch errors
    #[error("Handler '{0}' not found")]
    HandlerNotFound(String),

    #[error("Method '{method}' not found on handler '{handler}'")]
    MethodNotFound { handler: String, method: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, DockError>;

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

impl From<std::io::Error> for DockError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for DockError {
    fn from(err: serde_json::Error) -> Self {
        Self::ExecutionError(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for DockError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
