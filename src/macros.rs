//! `$NAME` substitution for test argument templates.
//!
//! Two layers are consulted for every token: the process-wide table built once
//! from the resolved paths and the user's `[macros]`, then the per-test context
//! (`FILE`, `IN`, `OUT`, `N`). Substitution repeats until the text stops
//! changing, so macros may refer to other macros.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};

use crate::config::ResolvedPaths;
use crate::error::{CheckerError, Result};

/// Upper bound on substitution passes before a definition is deemed cyclic.
pub const MAX_EXPANSION_PASSES: usize = 32;

static MACRO_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: static pattern
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("valid macro pattern")
});

/// Ordered `name -> value` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTable {
    entries: IndexMap<String, String>,
}

impl MacroTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in directory macros plus the user's table.
    ///
    /// `OUT_DIR` is always present; `IN_DIR` and `SRC_DIR` only when the
    /// directory exists at the time the table is built.
    #[must_use]
    pub fn process_wide(paths: &ResolvedPaths, user: &IndexMap<String, String>) -> Self {
        let mut table = Self::new();
        table.insert("OUT_DIR", paths.output.display().to_string());
        if let Ok(input) = dunce::canonicalize(&paths.input) {
            table.insert("IN_DIR", input.display().to_string());
        }
        if let Ok(source) = dunce::canonicalize(&paths.source) {
            table.insert("SRC_DIR", source.display().to_string());
        }
        for (name, value) in user {
            table.insert(name, value);
        }
        table
    }

    /// Context macros of the test at `index`.
    #[must_use]
    pub fn test_context(index: usize, file: &str, paths: &ResolvedPaths) -> Self {
        let mut table = Self::new();
        table.insert("FILE", file);
        table.insert("IN", paths.input_file(file).display().to_string());
        table.insert("OUT", paths.output_file(file).display().to_string());
        table.insert("N", index.to_string());
        table
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Expands `input` with `self` first and `context` second.
    ///
    /// Unknown tokens are left as written.
    ///
    /// # Errors
    /// Returns `CheckerError::MacroExpansion` when the text is still changing
    /// after [`MAX_EXPANSION_PASSES`] passes.
    pub fn expand(&self, input: &str, context: &Self) -> Result<String> {
        let mut current = input.to_string();
        for _ in 0..MAX_EXPANSION_PASSES {
            let next = self.substitute_once(&current, context);
            if next == current {
                return Ok(current);
            }
            current = next;
        }
        Err(CheckerError::MacroExpansion {
            input: input.to_string(),
            passes: MAX_EXPANSION_PASSES,
        })
    }

    /// Expands every argument of a template.
    ///
    /// # Errors
    /// Propagates the first expansion failure.
    pub fn expand_all(&self, args: &[String], context: &Self) -> Result<Vec<String>> {
        args.iter().map(|arg| self.expand(arg, context)).collect()
    }

    fn substitute_once(&self, text: &str, context: &Self) -> String {
        MACRO_TOKEN
            .replace_all(text, |caps: &Captures<'_>| {
                let name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map_or("", |m| m.as_str());
                self.get(name)
                    .or_else(|| context.get(name))
                    .map_or_else(|| caps[0].to_string(), str::to_string)
            })
            .into_owned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MacroTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, value) in iter {
            table.insert(name, value);
        }
        table
    }
}

#[cfg(test)]
#[path = "macros_tests.rs"]
mod tests;
