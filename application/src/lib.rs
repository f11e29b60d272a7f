//! Application layer for luna
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::SandboxPolicy;
pub use ports::script_host::{HostError, NoScriptHost, ScriptHostPort};
pub use use_cases::run_script::{
    GLOBALS_FENCE, RunScriptError, RunScriptInput, RunScriptOutput, RunScriptUseCase,
};
