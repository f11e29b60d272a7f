//! CLI command definitions

use clap::{Parser, ValueEnum};
use luna_domain::TaggedValue;
use std::path::PathBuf;

/// Output format for script results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, coloured output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// CLI arguments for luna
#[derive(Parser, Debug)]
#[command(name = "luna")]
#[command(author, version, about = "Run Lua scripts against a typed native host")]
#[command(long_about = r#"
luna loads a Lua script into a sandboxed interpreter, publishes the [globals]
configuration table to it, calls an entry function and prints what came back.

Plugins found in script.plugins_dir are loaded before the main script.

Configuration files are loaded from (in priority order):
1. LUNA_* environment variables (e.g. LUNA_SCRIPT__ENTRY=main)
2. --config <path>     Explicit config file
3. ./luna.toml         Project-level config
4. ~/.config/luna/config.toml   Global config

Example:
  luna init.lua
  luna init.lua -e main -a 42 -a hello
  luna init.lua -x state -o json
"#)]
pub struct Cli {
    /// Script to run (defaults to script.path from the config)
    pub script: Option<PathBuf>,

    /// Function to call after the script is loaded
    #[arg(short, long, value_name = "FUNCTION")]
    pub entry: Option<String>,

    /// Argument passed to the entry function (can be specified multiple times)
    #[arg(short, long = "arg", value_name = "VALUE")]
    pub arg: Vec<String>,

    /// Global table to print after the run (can be specified multiple times)
    #[arg(short = 'x', long, value_name = "GLOBAL")]
    pub export: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print nothing but errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Entry arguments, each read as a literal (`nil`, `true`, `42`, `1.5`, text)
    pub fn entry_args(&self) -> Vec<TaggedValue> {
        self.arg.iter().map(|a| TaggedValue::from_literal(a)).collect()
    }
}
