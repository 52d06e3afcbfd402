use std::collections::HashSet;

use regex::Regex;

use crate::error::{CheckerError, Result};

use super::model::{CONFIG_VERSION, Config};

/// Validates a parsed configuration before any module is built from it.
///
/// # Errors
/// Returns `CheckerError::Config` describing the first invalid setting, or
/// `CheckerError::InvalidPattern` when the commit format does not compile.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_version(config)?;
    validate_tests(config)?;
    validate_macros(config)?;
    validate_grades(config)?;
    validate_checkers(config)
}

fn validate_version(config: &Config) -> Result<()> {
    match &config.version {
        None => Ok(()),
        Some(v) if v == CONFIG_VERSION => Ok(()),
        Some(v) => Err(CheckerError::Config(format!(
            "Unsupported config version '{v}'. Only version '{CONFIG_VERSION}' is supported."
        ))),
    }
}

fn validate_tests(config: &Config) -> Result<()> {
    let mut seen = HashSet::new();
    for test in &config.tests {
        if test.file.trim().is_empty() {
            return Err(CheckerError::Config(format!(
                "test '{}' has an empty file name",
                test.name
            )));
        }
        if !seen.insert(test.file.as_str()) {
            return Err(CheckerError::Config(format!(
                "duplicate test file '{}'",
                test.file
            )));
        }
    }
    Ok(())
}

fn validate_macros(config: &Config) -> Result<()> {
    for name in config.macros.keys() {
        if !is_macro_name(name) {
            return Err(CheckerError::Config(format!(
                "invalid macro name '{name}': use letters, digits and '_', not starting with a digit"
            )));
        }
    }
    Ok(())
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_macro_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_grades(config: &Config) -> Result<()> {
    let grades = [
        ("ref_checker", config.ref_checker.as_ref().map(|c| c.grade)),
        ("memory_checker", config.memory_checker.as_ref().map(|c| c.grade)),
        ("style_checker", config.style_checker.as_ref().map(|c| c.grade)),
        ("commit_checker", config.commit_checker.as_ref().map(|c| c.grade)),
        ("diagnostic", config.diagnostic.as_ref().map(|c| c.grade)),
    ];

    for (section, grade) in grades {
        if let Some(grade) = grade
            && !(0.0..=1.0).contains(&grade)
        {
            return Err(CheckerError::Config(format!(
                "{section}.grade must be between 0.0 and 1.0, got {grade}"
            )));
        }
    }
    Ok(())
}

fn validate_checkers(config: &Config) -> Result<()> {
    if let Some(memory) = &config.memory_checker
        && memory.max_warnings == 0
    {
        return Err(CheckerError::Config(
            "memory_checker.max_warnings must be at least 1".to_string(),
        ));
    }

    if let Some(commit) = &config.commit_checker {
        if commit.min_commits == 0 {
            return Err(CheckerError::Config(
                "commit_checker.min_commits must be at least 1".to_string(),
            ));
        }
        let pattern = Regex::new(&commit.format).map_err(|source| CheckerError::InvalidPattern {
            pattern: commit.format.clone(),
            source,
        })?;
        if !pattern.capture_names().flatten().any(|name| name == "message") {
            return Err(CheckerError::Config(format!(
                "commit_checker.format '{}' has no (?P<message>...) group",
                commit.format
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
