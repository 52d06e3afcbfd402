//! Run coordination: capability probe, test execution and the two module
//! phases.

mod executor;
mod reporter;

pub use executor::{Invocation, execute_test};

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, Scope, ScopedJoinHandle};

use crate::checker::{
    CheckerModule, ModuleSlot, ModuleStatus, RunContext, build_registry, lock_module,
};
use crate::config::{Config, ResolvedPaths, VALGRIND};
use crate::error::{CheckerError, Result};
use crate::macros::MacroTable;
use crate::probe::{Capabilities, PathProbe, ToolPolicy, ToolProbe, find_executable, probe_modules};
use crate::report::{ExecutionRecord, ModuleReport, ReportSink, RunSummary};
use crate::score::registry_score;

use reporter::{CountOnDrop, ProgressReporter};

/// Held for the duration of a run; clears the flag on drop.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the module registry and drives runs over it.
///
/// A manager with a [`ReportSink`] is interactive: fatal preconditions are
/// reported to the sink and `run` still returns `Ok`.
pub struct Manager {
    config: Config,
    paths: ResolvedPaths,
    macros: MacroTable,
    policy: ToolPolicy,
    modules: Vec<ModuleSlot>,
    probe: Box<dyn ToolProbe>,
    sink: Option<Arc<dyn ReportSink>>,
    running: AtomicBool,
    capabilities: Mutex<Capabilities>,
    executions: Mutex<Vec<ExecutionRecord>>,
    caption: Mutex<Option<String>>,
}

impl Manager {
    /// Builds a manager with paths resolved against the current directory.
    ///
    /// # Errors
    /// Returns `CheckerError::PathResolve` if the current directory is unavailable.
    pub fn new(config: Config) -> Result<Self> {
        let paths = ResolvedPaths::resolve(&config.paths)?;
        Ok(Self::with_paths(config, paths))
    }

    #[must_use]
    pub fn with_paths(config: Config, paths: ResolvedPaths) -> Self {
        let macros = MacroTable::process_wide(&paths, &config.macros);
        let policy = ToolPolicy::from_settings(&config.settings);
        let modules = build_registry(&config).into_iter().map(Mutex::new).collect();
        Self {
            config,
            paths,
            macros,
            policy,
            modules,
            probe: Box::new(PathProbe),
            sink: None,
            running: AtomicBool::new(false),
            capabilities: Mutex::new(Capabilities::default()),
            executions: Mutex::new(Vec::new()),
            caption: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_probe(mut self, probe: Box<dyn ToolProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Attaches a display collaborator, making runs interactive.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replaces the registry built from the configuration.
    #[must_use]
    pub fn with_modules(mut self, modules: Vec<Box<dyn CheckerModule>>) -> Self {
        self.modules = modules.into_iter().map(Mutex::new).collect();
        self
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    #[must_use]
    pub fn modules(&self) -> &[ModuleSlot] {
        &self.modules
    }

    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        self.sink.is_some()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        lock(&self.capabilities).clone()
    }

    /// Sum of every module's weighted score.
    #[must_use]
    pub fn total_score(&self) -> u32 {
        registry_score(&self.modules)
    }

    /// Snapshot of the last run for formatters.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            caption: lock(&self.caption).clone(),
            modules: self
                .modules
                .iter()
                .map(|slot| ModuleReport::capture(&**lock_module(slot)))
                .collect(),
            tests: lock(&self.executions).clone(),
            total_score: self.total_score(),
        }
    }

    /// Performs one complete run.
    ///
    /// # Errors
    /// Non-interactive only: `AlreadyRunning` when another run holds the
    /// manager, or the fatal precondition that stopped this one (every module
    /// is then in panic).
    pub fn run(&self) -> Result<()> {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            tracing::warn!("run requested while another is in progress");
            return self.report_failure(CheckerError::AlreadyRunning);
        };
        *lock(&self.caption) = None;

        let capabilities = probe_modules(&self.modules, self.probe.as_ref(), &self.policy);
        let executable = match self.prepare() {
            Ok(executable) => executable,
            Err(e) => {
                for slot in &self.modules {
                    lock_module(slot).panic();
                }
                lock(&self.executions).clear();
                return self.report_failure(e);
            }
        };

        for slot in &self.modules {
            lock_module(slot).reset();
        }

        let use_valgrind = self.config.settings.run_valgrind && capabilities.has(VALGRIND);
        *lock(&self.capabilities) = capabilities;
        let ctx = RunContext {
            config: &self.config,
            paths: &self.paths,
            macros: &self.macros,
            executable: &executable,
        };
        let records = self.run_phases(&ctx, use_valgrind);
        *lock(&self.executions) = records;

        tracing::info!(total = self.total_score(), "Run finished");
        if let Some(sink) = &self.sink {
            sink.status("");
            for slot in &self.modules {
                lock_module(slot).display(sink.as_ref());
            }
        }
        Ok(())
    }

    /// Resolves the executable and creates the working directories.
    fn prepare(&self) -> Result<PathBuf> {
        let executable = find_executable(&self.paths.executable)
            .ok_or_else(|| CheckerError::ExecutableNotFound(self.paths.executable.clone()))?;
        for dir in [&self.paths.temp, &self.paths.output, &self.paths.forward] {
            fs::create_dir_all(dir).map_err(|source| CheckerError::DirectoryCreate {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(executable)
    }

    fn report_failure(&self, error: CheckerError) -> Result<()> {
        let caption = match &error {
            CheckerError::ExecutableNotFound(path) => format!("[ERR] {} not found", path.display()),
            other => format!("[ERR] {other}"),
        };
        tracing::error!(kind = error.error_type(), "{caption}");

        if !matches!(error, CheckerError::AlreadyRunning) {
            *lock(&self.caption) = Some(caption.clone());
        }
        match &self.sink {
            Some(sink) => {
                sink.status(&caption);
                Ok(())
            }
            None => Err(error),
        }
    }

    /// Phase A (independent modules alongside every test), then Phase B
    /// (output-dependent modules) once all test outputs exist.
    fn run_phases(&self, ctx: &RunContext<'_>, use_valgrind: bool) -> Vec<ExecutionRecord> {
        let tests = &self.config.tests;
        let completed = AtomicUsize::new(0);

        thread::scope(|scope| {
            let reporter = self
                .sink
                .as_deref()
                .map(|sink| ProgressReporter::spawn(scope, sink, &completed, tests.len()));

            let modules = self.spawn_modules(scope, ctx, false);
            let workers: Vec<_> = tests
                .iter()
                .enumerate()
                .map(|(index, test)| {
                    let completed = &completed;
                    scope.spawn(move || {
                        let _count = CountOnDrop(completed);
                        execute_test(ctx, index, test, use_valgrind)
                    })
                })
                .collect();

            self.join_modules(modules);
            let records = workers
                .into_iter()
                .zip(tests.iter().enumerate())
                .map(|(worker, (index, test))| {
                    worker.join().unwrap_or_else(|_| {
                        tracing::error!(test = %test.name, "test worker panicked");
                        executor::aborted(index, test)
                    })
                })
                .collect();
            if let Some(reporter) = reporter {
                reporter.stop();
            }

            let modules = self.spawn_modules(scope, ctx, true);
            self.join_modules(modules);
            records
        })
    }

    /// Starts one thread per queued module of the given phase.
    fn spawn_modules<'scope, 'env>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        ctx: &'env RunContext<'env>,
        output_dependent: bool,
    ) -> Vec<(usize, ScopedJoinHandle<'scope, ()>)> {
        self.modules
            .iter()
            .enumerate()
            .filter(|(_, slot)| {
                let module = lock_module(slot);
                module.is_output_dependent() == output_dependent
                    && module.status() == ModuleStatus::Queued
            })
            .map(|(index, slot)| (index, scope.spawn(move || lock_module(slot).run(ctx))))
            .collect()
    }

    /// Joins module threads; a panicked module is marked as such.
    fn join_modules(&self, handles: Vec<(usize, ScopedJoinHandle<'_, ()>)>) {
        for (index, handle) in handles {
            if handle.join().is_err() {
                let mut module = lock_module(&self.modules[index]);
                tracing::error!(module = %module.name(), "module panicked during run");
                module.panic();
            }
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
