use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::LOCAL_CONFIG_NAME;
use crate::output::OutputFormat;

/// Color output control
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal capability
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Parser, Debug)]
#[command(name = "pa-checker")]
#[command(author, version, about = "Grade a programming assignment against its test suite")]
#[command(long_about = "Runs the assignment executable on every configured test, then scores \
    output correctness, memory leaks, code style and commit hygiene.\n\n\
    Exit codes:\n  \
    0 - Run completed\n  \
    1 - Run could not start (missing executable, unwritable directories)\n  \
    2 - Configuration or runtime error")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Control color output
    #[arg(long, value_enum, default_value = "auto", global = true)]
    pub color: ColorChoice,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every test and checker once and print the report
    Run(RunArgs),

    /// Re-run whenever the executable is rebuilt
    Watch(WatchArgs),

    /// Generate a default configuration file
    Init(InitArgs),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Output format [possible values: text, json]
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Executable under test (overrides config)
    #[arg(short, long)]
    pub executable: Option<PathBuf>,

    /// Do not wrap tests in valgrind
    #[arg(long)]
    pub no_valgrind: bool,
}

#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Quiet period after a filesystem change before re-running, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub debounce_ms: u64,

    /// Executable under test (overrides config)
    #[arg(short, long)]
    pub executable: Option<PathBuf>,

    /// Do not wrap tests in valgrind
    #[arg(long)]
    pub no_valgrind: bool,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output path for configuration file
    #[arg(default_value = LOCAL_CONFIG_NAME)]
    pub path: PathBuf,

    /// Overwrite existing configuration
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
