use std::fmt::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

use crate::config::TestCase;
use crate::diff::{Segment, SideBySide, diff_text, is_identical};

use super::module::Check;
use super::{Issue, ModuleState, RunContext, fan_out_indexed};

/// Outcome of comparing one test's output with its reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompareResult {
    pub name: String,
    pub file: String,
    pub matched: bool,
    pub points: u32,
    pub segments: Vec<Segment>,
    pub rendering: SideBySide,
}

impl CompareResult {
    #[must_use]
    pub fn compare(test: &TestCase, reference: &[u8], candidate: &[u8]) -> Self {
        let segments = diff_text(reference, candidate);
        let matched = is_identical(&segments);
        Self {
            name: test.name.clone(),
            file: test.file.clone(),
            matched,
            points: if matched { test.score } else { 0 },
            rendering: SideBySide::from_segments(&segments),
            segments,
        }
    }
}

/// Compares `<out>/<file>.out` with `<ref>/<file>.ref` for every test.
///
/// Slot `i` belongs to `tests[i]`; it stays empty when either file cannot be
/// read. Also returns the number of matches.
pub fn compare_outputs(
    tests: &[TestCase],
    reference_dir: &Path,
    output_dir: &Path,
) -> (Vec<Option<CompareResult>>, usize) {
    let matches = Mutex::new(0usize);
    let slots = fan_out_indexed(tests, |_, test| {
        let reference_path = reference_dir.join(format!("{}.ref", test.file));
        let output_path = output_dir.join(format!("{}.out", test.file));
        let reference = read_or_log(&reference_path)?;
        let candidate = read_or_log(&output_path)?;

        let result = CompareResult::compare(test, &reference, &candidate);
        if result.matched {
            *matches.lock().unwrap_or_else(std::sync::PoisonError::into_inner) += 1;
        }
        tracing::info!(test = %test.name, matched = result.matched, "Checked {}", test.name);
        Some(result)
    });
    let matches = matches
        .into_inner()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    (slots, matches)
}

fn read_or_log(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed reading file: {}", path.display());
            None
        }
    }
}

/// Reference-output comparison.
#[derive(Debug, Default)]
pub struct RefDiff {
    slots: Vec<Option<CompareResult>>,
    matches: usize,
    total: usize,
}

impl RefDiff {
    /// Results of the last run in configured test order, unreadable tests
    /// omitted.
    pub fn results(&self) -> impl Iterator<Item = &CompareResult> {
        self.slots.iter().flatten()
    }

    #[must_use]
    pub fn slots(&self) -> &[Option<CompareResult>] {
        &self.slots
    }

    #[must_use]
    pub const fn matches(&self) -> usize {
        self.matches
    }
}

impl Check for RefDiff {
    fn execute(&mut self, ctx: &RunContext<'_>, state: &mut ModuleState) {
        let tests = &ctx.config.tests;
        let (slots, matches) = compare_outputs(tests, &ctx.paths.reference, &ctx.paths.output);

        let mut total_points: i64 = 0;
        for result in slots.iter().flatten() {
            total_points += i64::from(result.points);
            if !result.matched {
                state.push(Issue::new(format!("File {} has differences", result.name)));
            }
        }
        state.set_raw_score(total_points);

        self.slots = slots;
        self.matches = matches;
        self.total = tests.len();
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.matches = 0;
        self.total = 0;
    }

    fn summary(&self, _state: &ModuleState) -> String {
        format!("{} / {}", self.matches, self.total)
    }

    fn details(&self, state: &ModuleState) -> String {
        let mut out = String::new();
        for (slot, index) in self.slots.iter().zip(1..) {
            match slot {
                Some(result) => {
                    let mark = if result.matched { "passed" } else { "failed" };
                    let _ = writeln!(out, "[{index:02}] {} - {mark} ({} pts)", result.name, result.points);
                    if !result.matched {
                        out.push_str(&result.rendering.render());
                    }
                }
                None => {
                    let _ = writeln!(out, "[{index:02}] not checked");
                }
            }
        }
        if state.issues().is_empty() {
            out.push_str("All tests passed!\n");
        } else {
            for issue in state.issues() {
                let _ = writeln!(out, "{issue}");
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "refs_tests.rs"]
mod tests;
