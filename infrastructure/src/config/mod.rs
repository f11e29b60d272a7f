//! Configuration file loading for luna
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `LUNA_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./luna.toml` or `./.luna.toml`
//! 4. Global: `<config_dir>/luna/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileLoggingConfig, FileSandboxConfig, FileScriptConfig,
};
pub use loader::ConfigLoader;
