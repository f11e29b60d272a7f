//! Registration fences.
//!
//! A fence is a named one-time guard: setup code that must run at most once
//! per interpreter checks `try_set` first and skips itself when the fence is
//! already up.

use std::collections::HashSet;

/// Set of fence names owned by a single interpreter instance.
#[derive(Debug, Clone, Default)]
pub struct FenceSet {
    names: HashSet<String>,
}

impl FenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name`. Returns `false` without changing anything when it is
    /// already recorded.
    pub fn try_set(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            return false;
        }
        self.names.insert(name.to_string())
    }

    /// Remove `name`; absent names are ignored.
    pub fn clear(&mut self, name: &str) {
        self.names.remove(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
