//! Sandbox policy: restrictions applied to a fresh interpreter.

use serde::{Deserialize, Serialize};

/// Restrictions a script host applies before any script runs.
///
/// Script code is trusted (it is the user's own), so the standard
/// libraries stay available; only native extension loading is blocked by
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxPolicy {
    /// Clear `package.loadlib` and `package.cpath` so scripts cannot load
    /// native modules.
    pub block_c_modules: bool,
    /// Globals removed after the standard libraries are loaded.
    pub remove_globals: Vec<String>,
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self {
            block_c_modules: true,
            remove_globals: Vec::new(),
        }
    }
}

impl SandboxPolicy {
    /// A policy that leaves the interpreter untouched.
    pub fn permissive() -> Self {
        Self {
            block_c_modules: false,
            remove_globals: Vec::new(),
        }
    }

    pub fn with_removed_global(mut self, name: impl Into<String>) -> Self {
        self.remove_globals.push(name.into());
        self
    }
}
