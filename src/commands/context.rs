use std::fs;
use std::path::Path;

use crate::cli::ColorChoice;
use crate::config::{Config, ConfigLoader, FileConfigLoader};
use crate::output::ColorMode;

#[must_use]
pub const fn color_choice_to_mode(choice: ColorChoice) -> ColorMode {
    match choice {
        ColorChoice::Auto => ColorMode::Auto,
        ColorChoice::Always => ColorMode::Always,
        ColorChoice::Never => ColorMode::Never,
    }
}

/// Loads `config_path`, or searches the default locations when absent.
///
/// # Errors
/// Returns an error if the configuration file cannot be read, parsed or
/// validated.
pub fn load_config(config_path: Option<&Path>) -> crate::Result<Config> {
    let loader = FileConfigLoader::new();
    config_path.map_or_else(|| loader.load(), |path| loader.load_from_path(path))
}

/// Applies command-line overrides on top of the loaded configuration.
pub fn apply_overrides(config: &mut Config, executable: Option<&Path>, no_valgrind: bool) {
    if let Some(executable) = executable {
        config.paths.executable = executable.to_path_buf();
    }
    if no_valgrind {
        config.settings.run_valgrind = false;
    }
}

/// Writes `content` to `output_path`, or to stdout unless quiet.
///
/// # Errors
/// Returns an error if the output file or its parent directories cannot be
/// written.
pub fn write_output(output_path: Option<&Path>, content: &str, quiet: bool) -> crate::Result<()> {
    if let Some(path) = output_path {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    } else if !quiet {
        print!("{content}");
    }
    Ok(())
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
