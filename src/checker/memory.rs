use std::fmt::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::TestCase;

use super::module::Check;
use super::{Issue, ModuleState, RunContext, fan_out_indexed};

const DEFINITELY_LOST: &str = "Leak_DefinitelyLost";

// ============================================================================
// valgrind --xml=yes report
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ValgrindReport {
    #[serde(rename = "error", default)]
    pub errors: Vec<ValgrindError>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValgrindError {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub what: Option<String>,
    #[serde(default)]
    pub xwhat: Option<ValgrindXWhat>,
    #[serde(rename = "stack", default)]
    pub stacks: Vec<ValgrindStack>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValgrindXWhat {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub leakedbytes: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValgrindStack {
    #[serde(rename = "frame", default)]
    pub frames: Vec<ValgrindFrame>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValgrindFrame {
    #[serde(default)]
    pub obj: Option<String>,
    #[serde(rename = "fn", default)]
    pub function: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

impl ValgrindError {
    fn frames(&self) -> &[ValgrindFrame] {
        self.stacks.first().map_or(&[], |stack| stack.frames.as_slice())
    }

    fn description(&self) -> String {
        self.xwhat
            .as_ref()
            .map(|x| x.text.clone())
            .or_else(|| self.what.clone())
            .unwrap_or_else(|| self.kind.clone())
    }

    /// Top frame belongs to the program under test.
    fn is_user_generated(&self, target: &Path) -> bool {
        self.frames()
            .first()
            .and_then(|frame| frame.obj.as_deref())
            .is_some_and(|obj| Path::new(obj) == target)
    }
}

/// Parses a valgrind XML report.
///
/// # Errors
/// Returns the deserializer error for malformed documents.
pub fn parse_valgrind_xml(xml: &str) -> Result<ValgrindReport, quick_xml::DeError> {
    quick_xml::de::from_str(xml)
}

// ============================================================================
// Per-test results
// ============================================================================

/// One leak or memory error, located at the most relevant stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryFinding {
    pub kind: String,
    pub message: String,
    pub function: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub leaked_bytes: Option<u64>,
}

impl MemoryFinding {
    fn from_error(error: &ValgrindError, frame: Option<&ValgrindFrame>) -> Self {
        Self {
            kind: error.kind.clone(),
            message: error.description(),
            function: frame.and_then(|f| f.function.clone()),
            file: frame.and_then(|f| f.file.clone()),
            line: frame.and_then(|f| f.line),
            leaked_bytes: error.xwhat.as_ref().and_then(|x| x.leakedbytes),
        }
    }
}

impl fmt::Display for MemoryFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{file}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
            }
            f.write_str(" ")?;
        }
        if let Some(function) = &self.function {
            write!(f, "inside {function}: ")?;
        }
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestMemoryStatus {
    Ok,
    Warning,
    Issue,
    Critical,
}

impl fmt::Display for TestMemoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Issue => "ISSUE",
            Self::Critical => "CRITICAL",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestMemoryResult {
    pub name: String,
    pub file: String,
    /// Set when the report could not be parsed.
    pub critical: Option<String>,
    pub leaks: Vec<MemoryFinding>,
    pub warnings: Vec<MemoryFinding>,
}

impl TestMemoryResult {
    /// Classifies a report: definite leaks are issues, other errors raised
    /// from the target's own code are warnings.
    #[must_use]
    pub fn from_xml(test: &TestCase, xml: &str, target: &Path) -> Self {
        let mut result = Self {
            name: test.name.clone(),
            file: test.file.clone(),
            critical: None,
            leaks: Vec::new(),
            warnings: Vec::new(),
        };

        let report = match parse_valgrind_xml(xml) {
            Ok(report) => report,
            Err(e) => {
                result.critical = Some(e.to_string());
                return result;
            }
        };

        for error in &report.errors {
            if error.kind == DEFINITELY_LOST {
                // Frame 0 is the allocator; the caller is what matters.
                let frames = error.frames();
                let frame = frames.get(1).or_else(|| frames.first());
                result.leaks.push(MemoryFinding::from_error(error, frame));
            } else if error.is_user_generated(target) {
                result
                    .warnings
                    .push(MemoryFinding::from_error(error, error.frames().first()));
            }
        }
        result
    }

    #[must_use]
    pub fn status(&self) -> TestMemoryStatus {
        if self.critical.is_some() {
            TestMemoryStatus::Critical
        } else if !self.leaks.is_empty() {
            TestMemoryStatus::Issue
        } else if !self.warnings.is_empty() {
            TestMemoryStatus::Warning
        } else {
            TestMemoryStatus::Ok
        }
    }

    #[must_use]
    pub fn leaked_bytes(&self) -> u64 {
        self.leaks.iter().filter_map(|leak| leak.leaked_bytes).sum()
    }
}

// ============================================================================
// Module
// ============================================================================

/// Leak and memory-error check over the valgrind reports of every test.
#[derive(Debug)]
pub struct MemoryCheck {
    max_warnings: u32,
    slots: Vec<Option<TestMemoryResult>>,
    leaks: usize,
}

impl MemoryCheck {
    #[must_use]
    pub const fn new(max_warnings: u32) -> Self {
        Self {
            max_warnings,
            slots: Vec::new(),
            leaks: 0,
        }
    }

    pub fn results(&self) -> impl Iterator<Item = &TestMemoryResult> {
        self.slots.iter().flatten()
    }

    /// 100, minus `100 / max_warnings` per leak, zero from `max_warnings` leaks on.
    #[must_use]
    pub fn score_for(&self, leaks: usize) -> i64 {
        let max = u64::from(self.max_warnings.max(1));
        let leaks = leaks as u64;
        if leaks >= max {
            return 0;
        }
        let deduction = 100 / max;
        i64::try_from(100u64.saturating_sub(leaks * deduction)).unwrap_or(0)
    }
}

impl Check for MemoryCheck {
    fn execute(&mut self, ctx: &RunContext<'_>, state: &mut ModuleState) {
        let target = dunce::canonicalize(ctx.executable).unwrap_or_else(|_| ctx.executable.to_path_buf());
        let slots = fan_out_indexed(&ctx.config.tests, |_, test| {
            let path = ctx.paths.memory_report(&test.file);
            match std::fs::read_to_string(&path) {
                Ok(xml) => Some(TestMemoryResult::from_xml(test, &xml, &target)),
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "failed reading file: {}", path.display());
                    None
                }
            }
        });

        let mut leaks = 0;
        for result in slots.iter().flatten() {
            if let Some(reason) = &result.critical {
                state.push(Issue::critical(format!(
                    "{}: unreadable valgrind report: {reason}",
                    result.name
                )));
            }
            for leak in &result.leaks {
                state.push(Issue::new(format!("{}: {leak}", result.name)));
            }
            for warning in &result.warnings {
                state.push(Issue::new(format!("{}: warning: {warning}", result.name)));
            }
            leaks += result.leaks.len();
        }

        let score = if state.has_critical() { 0 } else { self.score_for(leaks) };
        state.set_raw_score(score);
        self.slots = slots;
        self.leaks = leaks;
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.leaks = 0;
    }

    fn summary(&self, _state: &ModuleState) -> String {
        format!("{} leaks", self.leaks)
    }

    fn details(&self, _state: &ModuleState) -> String {
        let mut out = String::new();
        for result in self.results() {
            let _ = write!(out, "[{}] {}", result.status(), result.name);
            match result.leaked_bytes() {
                0 => out.push('\n'),
                bytes => {
                    let _ = writeln!(out, " ({bytes} bytes leaked)");
                }
            }
            if let Some(reason) = &result.critical {
                let _ = writeln!(out, "    {reason}");
            }
            for leak in &result.leaks {
                let _ = writeln!(out, "    leak: {leak}");
            }
            for warning in &result.warnings {
                let _ = writeln!(out, "    warning: {warning}");
            }
        }
        if out.is_empty() {
            out.push_str("No memory reports found.\n");
        }
        out
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
