//! Temporary grading workspaces for unit tests.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;

use crate::checker::RunContext;
use crate::config::{Config, ResolvedPaths, TestCase};
use crate::macros::MacroTable;
use crate::probe::ToolProbe;
use crate::report::{ModuleReport, ReportSink};

pub struct Workspace {
    pub dir: TempDir,
    pub config: Config,
    pub paths: ResolvedPaths,
    pub macros: MacroTable,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let config = Config::default();
        let paths = ResolvedPaths::resolve_in(&config.paths, dir.path());
        Self {
            dir,
            config,
            paths,
            macros: MacroTable::new(),
        }
    }

    /// Adds `(name, file, score)` tests in order.
    pub fn with_tests(mut self, tests: &[(&str, &str, u32)]) -> Self {
        self.config.tests = tests
            .iter()
            .map(|(name, file, score)| TestCase {
                name: (*name).to_string(),
                file: (*file).to_string(),
                args: Vec::new(),
                score: *score,
            })
            .collect();
        self
    }

    /// Re-resolves paths after `config.paths` was edited.
    pub fn refresh_paths(&mut self) {
        self.paths = ResolvedPaths::resolve_in(&self.config.paths, self.dir.path());
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Writes an executable `/bin/sh` script.
    #[cfg(unix)]
    pub fn write_script(&self, relative: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.write(relative, format!("#!/bin/sh\n{body}\n"));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("Failed to mark script executable");
        path
    }

    pub fn context(&self) -> RunContext<'_> {
        RunContext {
            config: &self.config,
            paths: &self.paths,
            macros: &self.macros,
            executable: &self.paths.executable,
        }
    }
}

/// Probe that reports a fixed set of tools as installed.
pub struct FixedProbe(pub BTreeSet<String>);

impl FixedProbe {
    pub fn with(tools: &[&str]) -> Self {
        Self(tools.iter().map(|t| (*t).to_string()).collect())
    }
}

impl ToolProbe for FixedProbe {
    fn locate(&self, tool: &str) -> Option<PathBuf> {
        self.0.contains(tool).then(|| PathBuf::from("/usr/bin").join(tool))
    }
}

/// Sink that records every call.
#[derive(Default)]
pub struct RecordingSink {
    pub fractions: Mutex<Vec<f64>>,
    pub captions: Mutex<Vec<String>>,
    pub reports: Mutex<Vec<ModuleReport>>,
}

impl ReportSink for RecordingSink {
    fn progress(&self, fraction: f64) {
        self.fractions.lock().unwrap().push(fraction);
    }

    fn status(&self, caption: &str) {
        self.captions.lock().unwrap().push(caption.to_string());
    }

    fn present(&self, report: &ModuleReport) {
        self.reports.lock().unwrap().push(report.clone());
    }
}
