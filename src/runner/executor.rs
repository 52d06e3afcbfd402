//! Runs the target executable for one test case.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use crate::checker::RunContext;
use crate::config::{ResolvedPaths, TestCase, VALGRIND};
use crate::error::{CheckerError, Result};
use crate::macros::MacroTable;
use crate::report::ExecutionRecord;

/// A program plus its arguments, optionally wrapped in valgrind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Invocation {
    /// `<exe> <args>`, or `valgrind --leak-check=yes --xml=yes
    /// --xml-file=<report> <exe> <args>` when `memory_report` is set.
    #[must_use]
    pub fn new(executable: &Path, args: Vec<String>, memory_report: Option<&Path>) -> Self {
        let args = args.into_iter().map(OsString::from);
        match memory_report {
            None => Self {
                program: executable.to_path_buf(),
                args: args.collect(),
            },
            Some(report) => {
                let mut xml_file = OsString::from("--xml-file=");
                xml_file.push(report);
                let mut wrapped = vec![
                    OsString::from("--leak-check=yes"),
                    OsString::from("--xml=yes"),
                    xml_file,
                    executable.as_os_str().to_owned(),
                ];
                wrapped.extend(args);
                Self {
                    program: PathBuf::from(VALGRIND),
                    args: wrapped,
                }
            }
        }
    }

    /// Runs to completion with stdin closed and both output streams captured.
    fn output(&self) -> std::io::Result<Output> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
    }
}

/// Executes test `index`, forwarding its streams to the forward directory.
///
/// Never fails: problems are logged and kept in the record so sibling tests
/// carry on.
pub fn execute_test(
    ctx: &RunContext<'_>,
    index: usize,
    test: &TestCase,
    use_valgrind: bool,
) -> ExecutionRecord {
    let started = Instant::now();
    let mut record = ExecutionRecord {
        index,
        name: test.name.clone(),
        file: test.file.clone(),
        exit_code: None,
        elapsed: Duration::ZERO,
        error: None,
    };

    match run_invocation(ctx, index, test, use_valgrind) {
        Ok(code) => record.exit_code = code,
        Err(e) => {
            let message = error_chain(&e);
            tracing::error!(test = %test.name, error = %message, "test execution failed");
            record.error = Some(message);
        }
    }

    record.elapsed = started.elapsed();
    tracing::info!(
        test = %test.name,
        elapsed_ms = record.elapsed.as_millis(),
        "Executed {} in {:.2?}",
        test.name,
        record.elapsed
    );
    record
}

fn run_invocation(
    ctx: &RunContext<'_>,
    index: usize,
    test: &TestCase,
    use_valgrind: bool,
) -> Result<Option<i32>> {
    let context = MacroTable::test_context(index, &test.file, ctx.paths);
    let args = ctx.macros.expand_all(&test.args, &context)?;
    let report = use_valgrind.then(|| ctx.paths.memory_report(&test.file));
    let invocation = Invocation::new(ctx.executable, args, report.as_deref());
    tracing::debug!(test = %test.name, program = %invocation.program.display(), args = ?invocation.args, "spawning");

    let output = invocation.output().map_err(|source| CheckerError::FileAccess {
        path: invocation.program.clone(),
        source,
    })?;
    forward_streams(ctx.paths, &test.file, &output)?;
    Ok(output.status.code())
}

/// Writes captured stdout/stderr verbatim to `<forward>/<file>.stdout|.stderr`.
fn forward_streams(paths: &ResolvedPaths, file: &str, output: &Output) -> Result<()> {
    for (stream, bytes) in [("stdout", &output.stdout), ("stderr", &output.stderr)] {
        let path = paths.forward_file(file, stream);
        fs::write(&path, bytes).map_err(|source| CheckerError::FileAccess { path, source })?;
    }
    Ok(())
}

fn error_chain(error: &CheckerError) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Record for a worker that died before producing one.
pub(super) fn aborted(index: usize, test: &TestCase) -> ExecutionRecord {
    ExecutionRecord {
        index,
        name: test.name.clone(),
        file: test.file.clone(),
        exit_code: None,
        elapsed: Duration::ZERO,
        error: Some("test worker panicked".to_string()),
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
