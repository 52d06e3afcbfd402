use std::io::IsTerminal;
use std::sync::{Mutex, PoisonError};

use indicatif::{ProgressBar, ProgressStyle};

use crate::report::{ModuleReport, ReportSink};

const BAR_LENGTH: u64 = 1000;

/// Progress bar sink for interactive runs.
///
/// The bar draws to stderr and is hidden in quiet mode or when stderr is not
/// a TTY. Module dumps go to stdout above the bar.
pub struct RunProgress {
    progress_bar: ProgressBar,
    caption: Mutex<String>,
    quiet: bool,
}

impl RunProgress {
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let is_tty = std::io::stderr().is_terminal();
        Self::new_with_visibility(quiet, is_tty)
    }

    /// Internal constructor so tests can force either visibility.
    fn new_with_visibility(quiet: bool, is_tty: bool) -> Self {
        let progress_bar = if quiet || !is_tty {
            ProgressBar::hidden()
        } else {
            Self::create_visible_progress_bar()
        };

        Self {
            progress_bar,
            caption: Mutex::new(String::new()),
            quiet,
        }
    }

    fn create_visible_progress_bar() -> ProgressBar {
        let pb = ProgressBar::new(BAR_LENGTH);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} Running tests [{bar:40.cyan/blue}] {percent}% {msg}")
                // SAFETY: Template is a static string with valid format specifiers
                .expect("valid template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Last caption posted; empty when cleared.
    #[must_use]
    pub fn caption(&self) -> String {
        self.caption
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        self.progress_bar.position()
    }

    /// Clears the bar from the terminal.
    pub fn finish(&self) {
        self.progress_bar.finish_and_clear();
    }
}

impl ReportSink for RunProgress {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn progress(&self, fraction: f64) {
        if self.progress_bar.is_finished() {
            self.progress_bar.reset();
        }
        let position = (fraction.clamp(0.0, 1.0) * BAR_LENGTH as f64).round() as u64;
        self.progress_bar.set_position(position);
    }

    fn status(&self, caption: &str) {
        caption.clone_into(&mut self.caption.lock().unwrap_or_else(PoisonError::into_inner));
        if caption.is_empty() {
            self.progress_bar.finish_and_clear();
            return;
        }
        self.progress_bar.set_message(caption.to_string());
        if !self.quiet {
            self.progress_bar.suspend(|| eprintln!("{caption}"));
        }
    }

    fn present(&self, report: &ModuleReport) {
        if !self.quiet {
            self.progress_bar.suspend(|| println!("{}", report.dump));
        }
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
