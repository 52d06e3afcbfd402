use std::fmt::Write;

use crate::checker::ModuleStatus;
use crate::error::Result;
use crate::report::{ModuleReport, RunSummary};

use super::OutputFormatter;

/// Color output mode for terminal display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Auto-detect: use colors if stdout is a TTY and `NO_COLOR` is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// ANSI color codes
mod ansi {
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";
}

/// Every module dump followed by the score table.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    #[must_use]
    pub fn new(mode: ColorMode) -> Self {
        Self {
            use_colors: Self::should_use_colors(mode),
        }
    }

    fn should_use_colors(mode: ColorMode) -> bool {
        match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                // Respect NO_COLOR environment variable
                if std::env::var("NO_COLOR").is_ok() {
                    return false;
                }
                std::io::IsTerminal::is_terminal(&std::io::stdout())
            }
        }
    }

    const fn status_color(status: ModuleStatus) -> &'static str {
        match status {
            ModuleStatus::Ready => ansi::GREEN,
            ModuleStatus::Disabled => ansi::YELLOW,
            ModuleStatus::Running | ModuleStatus::Queued => ansi::CYAN,
            ModuleStatus::DependencyFail | ModuleStatus::Panic => ansi::RED,
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }
        format!("{color}{text}{}", ansi::RESET)
    }

    fn format_row(&self, report: &ModuleReport, output: &mut String) {
        let label = self.colorize(&report.result_label(), Self::status_color(report.status));
        writeln!(output, "{:<7} - {label}", report.name).ok();
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new(ColorMode::Auto)
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, summary: &RunSummary) -> Result<String> {
        let mut output = String::new();

        for report in &summary.modules {
            output.push_str(&report.dump);
            output.push('\n');
        }

        writeln!(output, "{}", self.colorize("===== Summary =====", ansi::BOLD)).ok();
        if let Some(caption) = &summary.caption {
            writeln!(output, "{}", self.colorize(caption, ansi::RED)).ok();
        }
        for report in &summary.modules {
            self.format_row(report, &mut output);
        }
        writeln!(output, "Score: {}", summary.total_score).ok();

        Ok(output)
    }
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
