//! Script host port: interface for the embedded interpreter.
//!
//! This port abstracts the interpreter so that:
//! - The application/presentation layers don't depend on mlua
//! - A no-op implementation (`NoScriptHost`) is always available
//! - The `scripting` feature gate only affects infrastructure + CLI

use luna_domain::{FenceSet, TableObject, TaggedValue};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

/// Errors surfaced by a script host.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// A value that had to be a table was something else.
    #[error("type mismatch: expected table, found {found}")]
    TypeMismatch { found: String },

    /// No function was found at the requested call target.
    #[error("no callable value at '{target}'")]
    InvalidCallTarget { target: String },

    /// The script raised an error; `message` carries the traceback text.
    #[error("script error: {message}")]
    Runtime { message: String },

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// Any other interpreter failure (syntax errors, allocation, ...).
    #[error("lua error: {0}")]
    Lua(String),

    #[error("{0} lock poisoned")]
    Poisoned(&'static str),
}

/// Port for the script host.
///
/// The application and presentation layers reach the interpreter
/// exclusively through this trait. The infrastructure layer provides the
/// real `LuaScriptHost`; when the `scripting` feature is disabled,
/// `NoScriptHost` is used instead.
pub trait ScriptHostPort: Send + Sync {
    /// Load and execute a script file.
    fn load_script(&self, path: &Path) -> Result<(), HostError>;

    /// Execute a chunk of source code under the given chunk name.
    fn exec_source(&self, name: &str, source: &str) -> Result<(), HostError>;

    /// Record a fence. Returns `false` if it was already recorded.
    fn set_fence(&self, name: &str) -> bool;

    /// Remove a fence; unknown names are ignored.
    fn clear_fence(&self, name: &str);

    /// Snapshot the table held by a global as a [`TableObject`].
    ///
    /// Fails with [`HostError::TypeMismatch`] if the global is not a table.
    fn read_table(&self, global: &str) -> Result<TableObject, HostError>;

    /// Publish a [`TableObject`] as a global. An empty table publishes nil.
    fn write_table(&self, global: &str, table: &TableObject) -> Result<(), HostError>;

    /// Call the function at a dotted path (`"main"`, `"app.handlers.start"`)
    /// with a traceback handler installed.
    fn call_function(&self, path: &str, args: Vec<TaggedValue>)
    -> Result<Vec<TaggedValue>, HostError>;

    /// Whether a function exists at the dotted path.
    fn has_function(&self, path: &str) -> bool;

    /// Whether the host is backed by a real interpreter.
    fn is_available(&self) -> bool;
}

/// No-op script host used when the `scripting` feature is disabled.
///
/// Scripts are silently ignored, tables read back empty and no function
/// exists. Fences are still tracked, so a fence is granted once per host.
#[derive(Debug, Default)]
pub struct NoScriptHost {
    fences: Mutex<FenceSet>,
}

impl NoScriptHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScriptHostPort for NoScriptHost {
    fn load_script(&self, _path: &Path) -> Result<(), HostError> {
        Ok(())
    }

    fn exec_source(&self, _name: &str, _source: &str) -> Result<(), HostError> {
        Ok(())
    }

    fn set_fence(&self, name: &str) -> bool {
        self.fences
            .lock()
            .map(|mut fences| fences.try_set(name))
            .unwrap_or(false)
    }

    fn clear_fence(&self, name: &str) {
        if let Ok(mut fences) = self.fences.lock() {
            fences.clear(name);
        }
    }

    fn read_table(&self, _global: &str) -> Result<TableObject, HostError> {
        Ok(TableObject::new())
    }

    fn write_table(&self, _global: &str, _table: &TableObject) -> Result<(), HostError> {
        Ok(())
    }

    fn call_function(
        &self,
        _path: &str,
        _args: Vec<TaggedValue>,
    ) -> Result<Vec<TaggedValue>, HostError> {
        Ok(Vec::new())
    }

    fn has_function(&self, _path: &str) -> bool {
        false
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_script_host_is_noop() {
        let host = NoScriptHost::new();
        assert!(!host.is_available());
        assert!(host.load_script(Path::new("/nonexistent")).is_ok());
        assert!(host.read_table("config").unwrap().is_empty());
        assert!(host.call_function("main", vec![]).unwrap().is_empty());
        assert!(!host.has_function("main"));
    }

    #[test]
    fn test_no_script_host_tracks_fences() {
        let host = NoScriptHost::new();
        assert!(host.set_fence("x"));
        assert!(!host.set_fence("x"));
        assert!(host.set_fence("y"));

        host.clear_fence("x");
        host.clear_fence("never-set");
        assert!(host.set_fence("x"));
    }

    #[test]
    fn test_host_error_display() {
        let err = HostError::TypeMismatch {
            found: "number".into(),
        };
        assert_eq!(err.to_string(), "type mismatch: expected table, found number");

        let err = HostError::InvalidCallTarget {
            target: "app.start".into(),
        };
        assert_eq!(err.to_string(), "no callable value at 'app.start'");
    }
}
