//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

use luna_application::SandboxPolicy;
use luna_domain::TableObject;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("script.entry cannot be empty")]
    EmptyEntry,

    #[error("script.globals_name cannot be empty")]
    EmptyGlobalsName,

    #[error("script.export cannot contain an empty name")]
    EmptyExportName,
}

/// Raw script configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileScriptConfig {
    /// Main script, used when none is given on the command line
    pub path: Option<PathBuf>,
    /// Function called after the script is loaded
    pub entry: Option<String>,
    /// Directory of `*.lua` plugins loaded before the main script
    pub plugins_dir: Option<PathBuf>,
    /// Global name the `[globals]` table is published under
    pub globals_name: String,
    /// Globals snapshotted after the run
    pub export: Vec<String>,
}

impl Default for FileScriptConfig {
    fn default() -> Self {
        Self {
            path: None,
            entry: None,
            plugins_dir: None,
            globals_name: "config".to_string(),
            export: Vec::new(),
        }
    }
}

/// Raw sandbox configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSandboxConfig {
    /// Block native module loading
    pub block_c_modules: bool,
    /// Globals removed before any script runs
    pub remove_globals: Vec<String>,
}

impl Default for FileSandboxConfig {
    fn default() -> Self {
        let policy = SandboxPolicy::default();
        Self {
            block_c_modules: policy.block_c_modules,
            remove_globals: policy.remove_globals,
        }
    }
}

impl FileSandboxConfig {
    /// Convert to the application-layer policy
    pub fn to_policy(&self) -> SandboxPolicy {
        SandboxPolicy {
            block_c_modules: self.block_c_modules,
            remove_globals: self.remove_globals.clone(),
        }
    }
}

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Write logs to this file instead of stderr
    pub file: Option<PathBuf>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub script: FileScriptConfig,
    pub sandbox: FileSandboxConfig,
    pub logging: FileLoggingConfig,
    /// Table published to scripts under `script.globals_name`
    pub globals: TableObject,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.script.entry.as_deref().is_some_and(|e| e.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyEntry);
        }
        if self.script.globals_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyGlobalsName);
        }
        if self.script.export.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyExportName);
        }
        Ok(())
    }
}
