mod commit;
mod diagnostic;
mod fanout;
mod memory;
mod module;
mod refs;
mod registry;
mod state;
mod style;

pub use commit::{CommitCheck, CommitEntry, parse_log};
pub use diagnostic::Diagnostic;
pub use fanout::fan_out_indexed;
pub use memory::{MemoryCheck, MemoryFinding, TestMemoryResult, TestMemoryStatus};
pub use module::{CheckKind, Module, ModuleSettings};
pub use refs::{CompareResult, RefDiff, compare_outputs};
pub use registry::build_registry;
pub use state::ModuleState;
pub use style::{StyleCheck, StyleFinding, parse_cppcheck_xml, threshold_score};

use std::fmt;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::config::{Config, ResolvedPaths};
use crate::macros::MacroTable;
use crate::report::{ModuleReport, ReportSink};

/// Lifecycle of a checker module.
///
/// `Disabled` and `DependencyFail` survive [`CheckerModule::reset`]; only a
/// fresh capability probe moves a module out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    Ready,
    Running,
    Queued,
    Disabled,
    DependencyFail,
    Panic,
}

impl ModuleStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Running => "RUNNING",
            Self::Queued => "QUEUED",
            Self::Disabled => "DISABLED",
            Self::DependencyFail => "ERR",
            Self::Panic => "PANIC!",
        }
    }

    /// Statuses that only a capability probe can leave.
    #[must_use]
    pub const fn is_sticky(self) -> bool {
        matches!(self, Self::Disabled | Self::DependencyFail)
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Explanation shown in place of results for a module that is not `Ready`.
#[must_use]
pub fn status_notice(status: ModuleStatus, dependencies: &[String]) -> Option<String> {
    match status {
        ModuleStatus::Ready => None,
        ModuleStatus::Disabled => Some("This module is disabled.".to_string()),
        ModuleStatus::DependencyFail => Some(format!(
            "One or more dependencies have failed.\nCheck if you have the following installed: {}",
            dependencies.join(", ")
        )),
        ModuleStatus::Queued | ModuleStatus::Running => {
            Some("This module is currently running. Please wait".to_string())
        }
        ModuleStatus::Panic => {
            Some("The checker went into panic. Check the config and run again".to_string())
        }
    }
}

/// A single finding reported by a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub critical: bool,
}

impl Issue {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file: None,
            line: None,
            column: None,
            critical: false,
        }
    }

    /// A finding that invalidates the module's result.
    #[must_use]
    pub fn critical(message: impl Into<String>) -> Self {
        Self {
            critical: true,
            ..Self::new(message)
        }
    }

    #[must_use]
    pub fn at(mut self, file: impl Into<String>, line: u32, column: Option<u32>) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self.column = column;
        self
    }

    #[must_use]
    pub const fn at_position(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line, self.column) {
            (Some(file), Some(line), Some(col)) => write!(f, "{file}:{line}:{col}: ")?,
            (Some(file), Some(line), None) => write!(f, "{file}:{line}: ")?,
            (None, Some(line), Some(col)) => write!(f, "{line}:{col} ")?,
            _ => {}
        }
        f.write_str(&self.message)
    }
}

/// Immutable snapshot handed to every [`CheckerModule::run`].
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    pub config: &'a Config,
    pub paths: &'a ResolvedPaths,
    pub macros: &'a MacroTable,
    /// Target executable as resolved at the start of the run.
    pub executable: &'a Path,
}

/// Capability contract every checker module implements.
pub trait CheckerModule: Send {
    /// Stable identifier, e.g. `REFS`.
    fn name(&self) -> &str;

    /// Human-readable heading, e.g. `Ref checker`.
    fn title(&self) -> &str;

    /// Output-dependent modules run only after every test has finished.
    fn is_output_dependent(&self) -> bool;

    /// External binaries the module needs.
    fn dependencies(&self) -> &[String];

    fn status(&self) -> ModuleStatus;

    /// Makes the module runnable again. No-op while running.
    fn enable(&mut self);

    /// `failure = true` marks a missing dependency; otherwise an administrative
    /// switch turned the module off. No-op while running.
    fn disable(&mut self, failure: bool);

    /// Clears findings and queues the module, unless it is disabled or failed
    /// a dependency check.
    fn reset(&mut self);

    /// Performs the check. Running on entry, Ready on exit.
    fn run(&mut self, ctx: &RunContext<'_>);

    /// Marks the module as aborted for this run.
    fn panic(&mut self);

    /// Weighted score, never negative.
    fn score(&self) -> u32;

    /// One-line result, e.g. `2 / 3`.
    fn summary(&self) -> String;

    fn issues(&self) -> &[Issue];

    /// Full text report of the last run.
    fn dump(&self) -> String;

    /// Pushes this module's report to a display sink.
    fn display(&self, sink: &dyn ReportSink) {
        sink.present(&ModuleReport::capture(self));
    }
}

/// Registry entry: each module sits behind its own lock so that Phase A and
/// Phase B threads touch disjoint modules.
pub type ModuleSlot = Mutex<Box<dyn CheckerModule>>;

/// Locks a module slot, recovering the module if a previous holder panicked.
pub fn lock_module(slot: &ModuleSlot) -> MutexGuard<'_, Box<dyn CheckerModule>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
