use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use crate::cli::{Cli, WatchArgs};
use crate::output::RunProgress;
use crate::runner::Manager;
use crate::watch::{ExecutableWatcher, spawn_stdin_reader, watch};
use crate::{EXIT_CONFIG_ERROR, EXIT_SUCCESS, Result};

use super::{apply_overrides, load_config};

#[must_use]
pub fn run_watch(args: &WatchArgs, cli: &Cli) -> i32 {
    match run_watch_impl(args, cli) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_CONFIG_ERROR
        }
    }
}

/// Interactive session: progress bar attached, re-run on rebuild or Enter,
/// quit on `q`.
///
/// # Errors
/// Returns an error if the configuration cannot be loaded or the executable's
/// directory cannot be watched; run failures are shown as captions.
pub fn run_watch_impl(args: &WatchArgs, cli: &Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    apply_overrides(&mut config, args.executable.as_deref(), args.no_valgrind);

    let progress = Arc::new(RunProgress::new(cli.quiet));
    let manager = Manager::new(config)?.with_sink(progress.clone());
    let (events, received) = mpsc::channel();
    let debounce = Duration::from_millis(args.debounce_ms.max(1));
    let watcher = ExecutableWatcher::start(&manager.paths().executable, debounce, events.clone())?;

    if !cli.quiet {
        println!("Watching {} for changes...", watcher.path().display());
        println!("  Press Enter to re-run, q to quit\n");
    }

    // The watcher keeps its own sender, so closing stdin only stops commands.
    spawn_stdin_reader(events);
    let runs = watch(&manager, &received);
    drop(watcher);
    progress.finish();

    tracing::info!(runs, "watch session ended");
    if !cli.quiet {
        println!("Score: {}", manager.total_score());
    }
    Ok(())
}
