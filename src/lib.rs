pub mod checker;
pub mod cli;
pub mod commands;
pub mod config;
pub mod diff;
pub mod error;
pub mod macros;
pub mod output;
pub mod probe;
pub mod report;
pub mod runner;
pub mod score;
pub mod watch;

#[cfg(test)]
mod test_support;

pub use error::{CheckerError, Result};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_RUN_FAILED: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
