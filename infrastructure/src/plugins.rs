//! Plugin discovery: finds the Lua files loaded before the main script.

use std::path::{Path, PathBuf};
use tracing::debug;

/// All `*.lua` files directly inside `dir`, sorted by path.
///
/// A missing or unreadable directory yields no plugins.
pub fn discover_plugins(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("No plugins loaded from {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut plugins: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "lua"))
        .collect();
    plugins.sort();
    plugins
}
