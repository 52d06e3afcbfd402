use std::path::{Component, Path, PathBuf};

use crate::error::{CheckerError, Result};

use super::PathsConfig;

/// Absolute form of [`PathsConfig`], fixed when the manager is built.
///
/// The executable keeps its configured spelling: a bare program name has to
/// go through a `PATH` lookup at the start of every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub source: PathBuf,
    pub executable: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub reference: PathBuf,
    pub forward: PathBuf,
    pub temp: PathBuf,
    pub repository: PathBuf,
}

impl ResolvedPaths {
    /// Resolves every configured path against the current directory.
    ///
    /// # Errors
    /// Returns `CheckerError::PathResolve` if the current directory is unavailable.
    pub fn resolve(paths: &PathsConfig) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|source| CheckerError::PathResolve {
            path: PathBuf::from("."),
            source,
        })?;
        Ok(Self::resolve_in(paths, &cwd))
    }

    /// Resolves every configured path against `base`.
    #[must_use]
    pub fn resolve_in(paths: &PathsConfig, base: &Path) -> Self {
        let abs = |p: &Path| {
            let joined: PathBuf = base
                .join(p)
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect();
            dunce::simplified(&joined).to_path_buf()
        };
        Self {
            source: abs(&paths.source),
            executable: paths.executable.clone(),
            input: abs(&paths.input),
            output: abs(&paths.output),
            reference: abs(&paths.reference),
            forward: abs(&paths.forward),
            temp: abs(&paths.temp),
            repository: abs(&paths.repository),
        }
    }

    #[must_use]
    pub fn input_file(&self, file: &str) -> PathBuf {
        self.input.join(format!("{file}.in"))
    }

    #[must_use]
    pub fn output_file(&self, file: &str) -> PathBuf {
        self.output.join(format!("{file}.out"))
    }

    #[must_use]
    pub fn reference_file(&self, file: &str) -> PathBuf {
        self.reference.join(format!("{file}.ref"))
    }

    #[must_use]
    pub fn forward_file(&self, file: &str, stream: &str) -> PathBuf {
        self.forward.join(format!("{file}.{stream}"))
    }

    #[must_use]
    pub fn memory_report(&self, file: &str) -> PathBuf {
        self.temp.join(format!("{file}.xml"))
    }
}
