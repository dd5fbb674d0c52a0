// ============================================================================
// AppDock Library
// ============================================================================

pub mod cli;
pub mod core;
pub mod loader;
pub mod registry;
pub mod routing;
pub mod spec;
pub mod state;
pub mod units;

// Re-export main types for convenience
pub use crate::core::{DockError, Result};
pub use registry::{AppRegistry, AppSummary, RemoveOutcome, RestoreReport};
pub use routing::{Handler, HandlerSchema, Router};
pub use spec::UnitSpec;
pub use state::{RegistrySnapshot, StateManager};
