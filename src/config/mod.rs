mod loader;
mod model;
mod paths;
mod validation;

pub use loader::{ConfigLoader, FileConfigLoader, FileSystem, LOCAL_CONFIG_NAME, RealFileSystem};
pub use model::{
    CONFIG_VERSION, CommitCheckerConfig, Config, DEFAULT_COMMIT_FORMAT, DiagnosticConfig,
    MemoryCheckerConfig, PathsConfig, RefCheckerConfig, SettingsConfig, StyleCheckerConfig,
    StyleThreshold, TestCase, VALGRIND,
};
pub use paths::ResolvedPaths;
pub use validation::validate_config;
