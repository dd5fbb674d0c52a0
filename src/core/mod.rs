pub mod error;

pub use error::{DockError, Result};
