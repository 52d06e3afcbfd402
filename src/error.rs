use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to access file: {}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("a run is already in progress")]
    AlreadyRunning,

    #[error("executable not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    #[error("could not create directory: {}", .path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to resolve path: {}", .path.display())]
    PathResolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("macro expansion of '{input}' did not settle after {passes} passes")]
    MacroExpansion { input: String, passes: usize },

    #[error("failed to watch {}: {source}", .path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl CheckerError {
    /// Short category name, used in logs and JSON error output.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::TomlParse(_) | Self::InvalidPattern { .. } => "Config",
            Self::FileAccess { .. } => "FileAccess",
            Self::Io(_) => "IO",
            Self::JsonSerialize(_) => "Serialize",
            Self::AlreadyRunning => "Busy",
            Self::ExecutableNotFound(_) => "Executable",
            Self::DirectoryCreate { .. } | Self::PathResolve { .. } => "Filesystem",
            Self::MacroExpansion { .. } => "Macro",
            Self::Watch { .. } => "Watch",
        }
    }

    /// Whether this error aborts a run (every module is put into panic).
    #[must_use]
    pub const fn is_run_fatal(&self) -> bool {
        matches!(
            self,
            Self::ExecutableNotFound(_) | Self::DirectoryCreate { .. } | Self::PathResolve { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CheckerError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
