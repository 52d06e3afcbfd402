//! Re-runs the checker whenever the target executable is rebuilt.

use std::ffi::{OsStr, OsString};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{
    DebounceEventResult, DebouncedEvent, Debouncer, RecommendedCache, new_debouncer,
};

use crate::probe::find_executable;
use crate::runner::Manager;
use crate::{CheckerError, Result};

/// Keyboard commands accepted while watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchCommand {
    Rerun,
    Quit,
}

impl WatchCommand {
    /// Enter re-runs, `q` quits, anything else is ignored.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "" => Some(Self::Rerun),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Everything the watch loop reacts to, on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    Command(WatchCommand),
    Rebuilt,
}

/// Filesystem watch on the target executable.
///
/// A path is watched through its parent directory. A bare program name is
/// watched through every existing `PATH` directory, so installing the program
/// counts as a rebuild. Each debounced batch that creates or modifies the
/// target, while it resolves to an executable, sends one
/// [`WatchEvent::Rebuilt`].
pub struct ExecutableWatcher {
    path: PathBuf,
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl ExecutableWatcher {
    /// # Errors
    /// `CheckerError::Watch` when the path has no file name or its directory
    /// cannot be watched.
    pub fn start(
        path: impl Into<PathBuf>,
        debounce: Duration,
        events: Sender<WatchEvent>,
    ) -> Result<Self> {
        let path = path.into();
        let Some(file_name) = path.file_name().map(OsString::from) else {
            return Err(CheckerError::Watch {
                source: notify::Error::generic("executable path has no file name"),
                path,
            });
        };

        let target = path.clone();
        let mut debouncer = new_debouncer(debounce, None, move |result: DebounceEventResult| {
            match result {
                Ok(batch) => {
                    if batch.iter().any(|event| touches(event, &file_name))
                        && find_executable(&target).is_some()
                    {
                        let _ = events.send(WatchEvent::Rebuilt);
                    }
                }
                Err(errors) => {
                    for error in errors {
                        tracing::warn!(error = %error, "watch error");
                    }
                }
            }
        })
        .map_err(|source| CheckerError::Watch {
            path: path.clone(),
            source,
        })?;

        if is_bare_name(&path) {
            for dir in watch_dirs(&path) {
                if let Err(e) = debouncer.watch(&dir, RecursiveMode::NonRecursive) {
                    tracing::warn!(dir = %dir.display(), error = %e, "skipping PATH directory");
                }
            }
        } else {
            for dir in watch_dirs(&path) {
                debouncer
                    .watch(&dir, RecursiveMode::NonRecursive)
                    .map_err(|source| CheckerError::Watch { path: dir, source })?;
            }
        }

        Ok(Self {
            path,
            _debouncer: debouncer,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn is_bare_name(path: &Path) -> bool {
    !path.is_absolute() && path.components().count() == 1
}

/// Directories whose entries decide what `path` resolves to.
fn watch_dirs(path: &Path) -> Vec<PathBuf> {
    if is_bare_name(path) {
        return std::env::var_os("PATH")
            .map(|search| {
                std::env::split_paths(&search)
                    .filter(|dir| dir.is_dir())
                    .collect()
            })
            .unwrap_or_default();
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => vec![parent.to_path_buf()],
        _ => vec![PathBuf::from(".")],
    }
}

fn touches(event: &DebouncedEvent, file_name: &OsStr) -> bool {
    let kind = &event.event.kind;
    (kind.is_create() || kind.is_modify())
        && event
            .event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name))
}

/// Forwards commands typed on stdin until end of input.
pub fn spawn_stdin_reader(events: Sender<WatchEvent>) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if let Some(command) = WatchCommand::parse(&line)
                && events.send(WatchEvent::Command(command)).is_err()
            {
                break;
            }
        }
        tracing::debug!("command input closed");
    });
}

/// Performs an initial run, then one run per rebuild or
/// [`WatchCommand::Rerun`], until [`WatchCommand::Quit`] or until every
/// sender is gone. Returns the number of runs performed.
pub fn watch(manager: &Manager, events: &Receiver<WatchEvent>) -> usize {
    let mut runs = 0;
    let mut trigger = |reason: &str| {
        tracing::info!(reason, "Starting run");
        if let Err(e) = manager.run() {
            tracing::error!(error = %e, "run failed");
        }
        runs += 1;
    };

    trigger("initial");
    while let Ok(event) = events.recv() {
        match event {
            WatchEvent::Command(WatchCommand::Quit) => break,
            WatchEvent::Command(WatchCommand::Rerun) => trigger("manual"),
            WatchEvent::Rebuilt => trigger("executable changed"),
        }
    }
    runs
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
