use crate::cli::{Cli, RunArgs};
use crate::output::formatter_for;
use crate::runner::Manager;
use crate::{EXIT_CONFIG_ERROR, EXIT_RUN_FAILED, EXIT_SUCCESS, Result};

use super::{apply_overrides, color_choice_to_mode, load_config, write_output};

#[must_use]
pub fn run_checker(args: &RunArgs, cli: &Cli) -> i32 {
    match run_checker_impl(args, cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_CONFIG_ERROR
        }
    }
}

/// Performs one non-interactive run and prints the report.
///
/// A fatal run precondition still produces a report (every module in panic,
/// the error as caption) and maps to `EXIT_RUN_FAILED`.
///
/// # Errors
/// Returns an error if the configuration cannot be loaded or the report
/// cannot be written.
pub fn run_checker_impl(args: &RunArgs, cli: &Cli) -> Result<i32> {
    let mut config = load_config(cli.config.as_deref())?;
    apply_overrides(&mut config, args.executable.as_deref(), args.no_valgrind);

    let manager = Manager::new(config)?;
    let outcome = manager.run();

    let summary = manager.summary();
    let formatter = formatter_for(args.format, color_choice_to_mode(cli.color));
    let output = formatter.format(&summary)?;
    write_output(args.output.as_deref(), &output, cli.quiet)?;

    match outcome {
        Ok(()) => Ok(EXIT_SUCCESS),
        Err(e) if e.is_run_fatal() => {
            if cli.quiet {
                eprintln!("Error: {e}");
            }
            Ok(EXIT_RUN_FAILED)
        }
        Err(e) => Err(e),
    }
}
