//! CLI entrypoint for luna
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use luna_application::{RunScriptInput, RunScriptUseCase, ScriptHostPort};
use luna_infrastructure::{ConfigLoader, FileConfig, discover_plugins};
use luna_presentation::{Cli, ConsoleFormatter, OutputFormat};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    config.validate()?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _guard = init_logging(&cli, config.logging.file.as_deref())?;

    info!("Starting luna {}", env!("CARGO_PKG_VERSION"));

    let input = build_input(&cli, &config)?;

    // === Dependency Injection ===
    let host = create_host(&config)?;
    let use_case = RunScriptUseCase::new(host);

    let result = use_case.execute(input)?;

    if cli.quiet {
        return Ok(());
    }

    let output = match cli.output {
        OutputFormat::Text => ConsoleFormatter::format(&result),
        OutputFormat::Json => ConsoleFormatter::format_json(&result),
    };

    println!("{}", output);

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(cli: &Cli, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else {
        match cli.verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"), // -vvv or more
        }
    };

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory)
        .with_context(|| format!("Could not create log directory {}", directory.display()))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .init();

    Ok(Some(guard))
}

/// Merge command-line values over the loaded configuration
fn build_input(cli: &Cli, config: &FileConfig) -> Result<RunScriptInput> {
    let script = match cli.script.as_ref().or(config.script.path.as_ref()) {
        Some(path) => path.clone(),
        None => bail!("No script given. Pass a path or set script.path in the config."),
    };

    let plugins = config
        .script
        .plugins_dir
        .as_deref()
        .map(discover_plugins)
        .unwrap_or_default();
    debug!("Discovered {} plugin(s)", plugins.len());

    let mut input = RunScriptInput::new(script)
        .with_plugins(plugins)
        .with_globals(config.script.globals_name.clone(), config.globals.clone())
        .with_args(cli.entry_args());

    if let Some(entry) = cli.entry.as_ref().or(config.script.entry.as_ref()) {
        input = input.with_entry(entry.clone());
    }

    for name in config.script.export.iter().chain(&cli.export) {
        if !input.exports.contains(name) {
            input = input.with_export(name.clone());
        }
    }

    Ok(input)
}

#[cfg(feature = "scripting")]
fn create_host(config: &FileConfig) -> Result<Arc<dyn ScriptHostPort>> {
    let host = luna_infrastructure::LuaScriptHost::new(&config.sandbox.to_policy())
        .context("Failed to start the Lua interpreter")?;
    Ok(Arc::new(host))
}

#[cfg(not(feature = "scripting"))]
fn create_host(_config: &FileConfig) -> Result<Arc<dyn ScriptHostPort>> {
    tracing::warn!("Built without the scripting feature; scripts will not run");
    Ok(Arc::new(luna_application::NoScriptHost::new()))
}
