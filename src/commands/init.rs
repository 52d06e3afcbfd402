use std::fs;

use crate::{CheckerError, EXIT_CONFIG_ERROR, EXIT_SUCCESS, Result};

#[must_use]
pub fn run_init(args: &crate::cli::InitArgs) -> i32 {
    match run_init_impl(args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_CONFIG_ERROR
        }
    }
}

/// Initializes a new configuration file.
///
/// # Errors
/// Returns an error if the file already exists (without --force) or cannot be written.
pub fn run_init_impl(args: &crate::cli::InitArgs) -> Result<()> {
    let output_path = &args.path;

    if output_path.exists() && !args.force {
        return Err(CheckerError::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            output_path.display()
        )));
    }

    let template = generate_config_template();

    fs::write(output_path, template).map_err(|source| CheckerError::FileAccess {
        path: output_path.clone(),
        source,
    })?;

    println!("Created configuration file: {}", output_path.display());
    Ok(())
}

#[must_use]
pub fn generate_config_template() -> String {
    r#"# pa-checker configuration file
version = "1"

[paths]
# Sources handed to cppcheck
source = "src"
# Program under test; a bare name is looked up on PATH
executable = "./main"
# <input>/<file>.in, <output>/<file>.out, <reference>/<file>.ref
input = "tests/in"
output = "tests/out"
reference = "tests/ref"
# Captured stdout/stderr of every test
forward = "tests/forward"
# Scratch space for valgrind reports
temp = ".pa-checker"
# Repository inspected by the commit checker
repository = "."

[settings]
# Wrap every test in valgrind when it is installed
run_valgrind = true

# User macros, usable in test arguments as $NAME.
# Built-ins: $IN, $OUT, $N, $IN_DIR, $OUT_DIR, $SRC_DIR
[macros]
# DATA = "$IN_DIR/data"

[[tests]]
name = "Test 01"
file = "test01"
args = ["$IN", "$OUT"]
score = 100

# Compares every output with its reference
[ref_checker]
grade = 1.0

# Counts definitely-lost leaks reported by valgrind
[memory_checker]
grade = 0.2
dependencies = ["valgrind"]
max_warnings = 10

# Runs cppcheck over the sources
[style_checker]
grade = 0.1
dependencies = ["cppcheck"]
thresholds = [
    { under = 0, score = 100 },
    { under = 5, score = 75 },
    { under = 10, score = 50 },
    { under = 20, score = 25 },
]

# Checks commit count and message format
[commit_checker]
grade = 0.1
dependencies = ["git"]
min_commits = 3
use_format = true
format = "^(?P<kind>[^:]+):(?P<message>.*)$"
min_message_len = 10
max_issues = 3

# Self-test module emitting random findings
# [diagnostic]
# seed = 7
"#
    .to_string()
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
