//! Unit spec parsing: `path[:ClassName]` -> resolved path, module name, class name.

use crate::core::{DockError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Separator between the unit path and the class name.
pub const CLASS_SEPARATOR: char = ':';

/// Class assumed when the spec names no class or leaves the segment empty.
pub const DEFAULT_CLASS: &str = "Main";

/// A parsed and validated application unit specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSpec {
    /// Original spec string, retained verbatim for snapshots.
    pub raw: String,
    /// Absolute path to the unit file. Always an existing regular file
    /// at parse time.
    pub resolved_path: PathBuf,
    /// File stem of the unit file, without extension.
    pub module_name: String,
    pub class_name: String,
}

impl UnitSpec {
    /// Parse a `path[:ClassName]` spec.
    ///
    /// Splits on the *last* separator so paths containing `:` keep working.
    /// An empty class segment (trailing `:`) falls back to [`DEFAULT_CLASS`].
    pub fn parse(spec: &str) -> Result<Self> {
        if spec.is_empty() {
            return Err(DockError::EmptySpec);
        }

        let (path_part, class_name) = match spec.rsplit_once(CLASS_SEPARATOR) {
            Some((path, class)) if class.is_empty() => (path, DEFAULT_CLASS),
            Some((path, class)) => (path, class),
            None => (spec, DEFAULT_CLASS),
        };

        let resolved_path = resolve_path(path_part)?;
        if !resolved_path.exists() {
            return Err(DockError::PathNotFound(resolved_path));
        }
        if resolved_path.is_dir() {
            return Err(DockError::NotAFile(resolved_path));
        }

        let module_name = resolved_path
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or("unit")
            .to_string();

        Ok(Self {
            raw: spec.to_string(),
            resolved_path,
            module_name,
            class_name: class_name.to_string(),
        })
    }
}

/// Expand `~` and make the path absolute relative to the current directory.
fn resolve_path(path_part: &str) -> Result<PathBuf> {
    let expanded = expand_user(path_part);
    if expanded.is_absolute() {
        return Ok(normalize(&expanded));
    }
    let cwd = std::env::current_dir()?;
    Ok(normalize(&cwd.join(expanded)))
}

/// Expands bare `~` and `~/...` only. `~user/...` forms are passed
/// through untouched and will fail path validation instead.
fn expand_user(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Lexically drop `.` and resolve `..` components. Avoids `canonicalize`
/// so the unresolved path can still be reported when it does not exist.
fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}
