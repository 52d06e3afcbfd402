use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use pa_checker::EXIT_CONFIG_ERROR;
use pa_checker::cli::{Cli, Commands};
use pa_checker::commands::{run_checker, run_init, run_watch};

const fn default_level(quiet: bool, verbose: u8) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    }
}

/// `RUST_LOG` wins over the verbosity flags.
fn init_logging(cli: &Cli) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(cli.quiet, cli.verbose)));

    match cli.log_file.as_deref() {
        Some(path) => {
            let file = open_log(path)?;
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
                .with(filter)
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    }
    Ok(())
}

fn open_log(path: &Path) -> std::io::Result<File> {
    File::options().create(true).append(true).open(path)
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Error: cannot open log file: {e}");
        std::process::exit(EXIT_CONFIG_ERROR);
    }

    let exit_code = match &cli.command {
        Commands::Run(args) => run_checker(args, &cli),
        Commands::Watch(args) => run_watch(args, &cli),
        Commands::Init(args) => run_init(args),
    };

    std::process::exit(exit_code);
}
