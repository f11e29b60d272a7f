//! Infrastructure layer for luna
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the mlua-backed script host, configuration
//! file loading and plugin discovery.

pub mod config;
pub mod plugins;
#[cfg(feature = "scripting")]
pub mod scripting;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLoggingConfig, FileSandboxConfig,
    FileScriptConfig,
};
pub use plugins::discover_plugins;
#[cfg(feature = "scripting")]
pub use scripting::{LuaScriptHost, ScriptLog};
