//! Run Script use case
//!
//! Publishes configuration into the interpreter, loads plugins and the main
//! script, calls the entry function and snapshots the requested globals.

use crate::ports::script_host::{HostError, ScriptHostPort};
use luna_domain::{TableObject, TaggedValue};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fence guarding the one-time publication of configuration globals.
pub const GLOBALS_FENCE: &str = "run_script.globals";

/// Errors that can occur while running a script
#[derive(Error, Debug)]
pub enum RunScriptError {
    #[error("Failed to publish globals: {0}")]
    Globals(#[source] HostError),

    #[error("Script {path} failed: {source}")]
    Script {
        path: PathBuf,
        #[source]
        source: HostError,
    },

    #[error("Entry function '{0}' is not defined")]
    MissingEntry(String),

    #[error("Entry function '{name}' failed: {source}")]
    Entry {
        name: String,
        #[source]
        source: HostError,
    },

    #[error("Cannot export '{name}': {source}")]
    Export {
        name: String,
        #[source]
        source: HostError,
    },
}

/// Input for the RunScript use case
#[derive(Debug, Clone)]
pub struct RunScriptInput {
    /// Main script path
    pub script: PathBuf,
    /// Plugin scripts, loaded in order before the main script
    pub plugins: Vec<PathBuf>,
    /// Global name the configuration table is published under
    pub globals_name: String,
    /// Configuration table handed to scripts
    pub globals: TableObject,
    /// Function called after loading, if any
    pub entry: Option<String>,
    /// Arguments for the entry function
    pub args: Vec<TaggedValue>,
    /// Globals snapshotted after the run
    pub exports: Vec<String>,
}

impl RunScriptInput {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            plugins: Vec::new(),
            globals_name: "config".to_string(),
            globals: TableObject::new(),
            entry: None,
            args: Vec::new(),
            exports: Vec::new(),
        }
    }

    pub fn with_plugins(mut self, plugins: Vec<PathBuf>) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn with_globals(mut self, name: impl Into<String>, globals: TableObject) -> Self {
        self.globals_name = name.into();
        self.globals = globals;
        self
    }

    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = Some(entry.into());
        self
    }

    pub fn with_args(mut self, args: Vec<TaggedValue>) -> Self {
        self.args = args;
        self
    }

    pub fn with_export(mut self, name: impl Into<String>) -> Self {
        self.exports.push(name.into());
        self
    }
}

/// Output of the RunScript use case
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunScriptOutput {
    /// Values returned by the entry function
    pub results: Vec<TaggedValue>,
    /// Exported globals by name
    pub exports: BTreeMap<String, TableObject>,
    /// Plugins that failed to load
    pub failed_plugins: Vec<PathBuf>,
}

/// Use case for running a script against a host
pub struct RunScriptUseCase<H: ScriptHostPort + ?Sized> {
    host: Arc<H>,
}

impl<H: ScriptHostPort + ?Sized> RunScriptUseCase<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    pub fn execute(&self, input: RunScriptInput) -> Result<RunScriptOutput, RunScriptError> {
        if !self.host.is_available() {
            warn!("Scripting is not available; {} will not run", input.script.display());
        }

        let mut output = RunScriptOutput::default();

        self.publish_globals(&input)?;

        for plugin in &input.plugins {
            match self.host.load_script(plugin) {
                Ok(()) => debug!("Loaded plugin {}", plugin.display()),
                Err(e) => {
                    warn!("Plugin {} failed to load: {}", plugin.display(), e);
                    output.failed_plugins.push(plugin.clone());
                }
            }
        }

        info!("Running {}", input.script.display());
        self.host
            .load_script(&input.script)
            .map_err(|source| RunScriptError::Script {
                path: input.script.clone(),
                source,
            })?;

        if let Some(entry) = &input.entry {
            if !self.host.has_function(entry) {
                return Err(RunScriptError::MissingEntry(entry.clone()));
            }
            output.results = self
                .host
                .call_function(entry, input.args.clone())
                .map_err(|source| RunScriptError::Entry {
                    name: entry.clone(),
                    source,
                })?;
            debug!("{} returned {} value(s)", entry, output.results.len());
        }

        for name in &input.exports {
            let table = self
                .host
                .read_table(name)
                .map_err(|source| RunScriptError::Export {
                    name: name.clone(),
                    source,
                })?;
            output.exports.insert(name.clone(), table);
        }

        Ok(output)
    }

    /// Publish the configuration table once per host.
    fn publish_globals(&self, input: &RunScriptInput) -> Result<(), RunScriptError> {
        if !self.host.set_fence(GLOBALS_FENCE) {
            debug!("Globals already published, skipping");
            return Ok(());
        }

        if let Err(e) = self.host.write_table(&input.globals_name, &input.globals) {
            // let a later run retry
            self.host.clear_fence(GLOBALS_FENCE);
            return Err(RunScriptError::Globals(e));
        }

        debug!(
            "Published {} global entries as '{}'",
            input.globals.len(),
            input.globals_name
        );
        Ok(())
    }
}
