use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Supported config version.
pub const CONFIG_VERSION: &str = "1";

/// Name of the memory profiler every test is wrapped in.
pub const VALGRIND: &str = "valgrind";

/// Default commit message format: `<type>: <message>`.
pub const DEFAULT_COMMIT_FORMAT: &str = r"^(?P<kind>[^:]+):(?P<message>.*)$";

/// Top-level grading configuration.
///
/// Checker sections that are absent from the file are not registered. The
/// `Default` impl is the built-in template with every checker present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub settings: SettingsConfig,

    /// User macros, expanded after the built-in `OUT_DIR`/`IN_DIR`/`SRC_DIR`.
    #[serde(default)]
    pub macros: IndexMap<String, String>,

    #[serde(default)]
    pub tests: Vec<TestCase>,

    #[serde(default)]
    pub ref_checker: Option<RefCheckerConfig>,

    #[serde(default)]
    pub memory_checker: Option<MemoryCheckerConfig>,

    #[serde(default)]
    pub style_checker: Option<StyleCheckerConfig>,

    #[serde(default)]
    pub commit_checker: Option<CommitCheckerConfig>,

    #[serde(default)]
    pub diagnostic: Option<DiagnosticConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: Some(CONFIG_VERSION.to_string()),
            paths: PathsConfig::default(),
            settings: SettingsConfig::default(),
            macros: IndexMap::new(),
            tests: Vec::new(),
            ref_checker: Some(RefCheckerConfig::default()),
            memory_checker: Some(MemoryCheckerConfig::default()),
            style_checker: Some(StyleCheckerConfig::default()),
            commit_checker: Some(CommitCheckerConfig::default()),
            diagnostic: None,
        }
    }
}

// ============================================================================
// Paths & settings
// ============================================================================

/// Filesystem layout of the assignment. Relative paths resolve against the
/// working directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathsConfig {
    /// Sources handed to the static analyzer.
    #[serde(default = "default_source")]
    pub source: PathBuf,

    /// Program under test. A bare name is looked up on `PATH`.
    #[serde(default = "default_executable")]
    pub executable: PathBuf,

    /// `<input>/<test>.in`
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// `<output>/<test>.out`, written by the program under test.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// `<reference>/<test>.ref`
    #[serde(default = "default_reference")]
    pub reference: PathBuf,

    /// Captured stdout/stderr of every test.
    #[serde(default = "default_forward")]
    pub forward: PathBuf,

    /// Scratch space for tool reports (valgrind XML).
    #[serde(default = "default_temp")]
    pub temp: PathBuf,

    /// Repository inspected by the commit checker.
    #[serde(default = "default_repository")]
    pub repository: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            executable: default_executable(),
            input: default_input(),
            output: default_output(),
            reference: default_reference(),
            forward: default_forward(),
            temp: default_temp(),
            repository: default_repository(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettingsConfig {
    /// Run every test under valgrind when it is installed.
    #[serde(default = "default_true")]
    pub run_valgrind: bool,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self { run_valgrind: true }
    }
}

/// One entry of the test suite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestCase {
    /// Display name.
    pub name: String,

    /// File stem shared by the `.in`, `.out`, `.ref` and forwarded files.
    pub file: String,

    /// Argument template; may contain macros such as `$IN` or `$OUT`.
    #[serde(default)]
    pub args: Vec<String>,

    /// Points awarded when the output matches the reference.
    #[serde(default)]
    pub score: u32,
}

// ============================================================================
// Checker sections
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefCheckerConfig {
    #[serde(default = "default_grade")]
    pub grade: f64,

    #[serde(default = "default_true")]
    pub output_dependent: bool,
}

impl Default for RefCheckerConfig {
    fn default() -> Self {
        Self {
            grade: default_grade(),
            output_dependent: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryCheckerConfig {
    #[serde(default = "default_memory_grade")]
    pub grade: f64,

    #[serde(default = "default_true")]
    pub output_dependent: bool,

    #[serde(default = "default_memory_dependencies")]
    pub dependencies: Vec<String>,

    /// Leak count at which the memory score drops to zero.
    #[serde(default = "default_max_warnings")]
    pub max_warnings: u32,
}

impl Default for MemoryCheckerConfig {
    fn default() -> Self {
        Self {
            grade: default_memory_grade(),
            output_dependent: true,
            dependencies: default_memory_dependencies(),
            max_warnings: default_max_warnings(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StyleCheckerConfig {
    #[serde(default = "default_minor_grade")]
    pub grade: f64,

    #[serde(default)]
    pub output_dependent: bool,

    #[serde(default = "default_style_dependencies")]
    pub dependencies: Vec<String>,

    /// Score ladder keyed by the maximum number of findings.
    #[serde(default = "default_style_thresholds")]
    pub thresholds: Vec<StyleThreshold>,
}

impl Default for StyleCheckerConfig {
    fn default() -> Self {
        Self {
            grade: default_minor_grade(),
            output_dependent: false,
            dependencies: default_style_dependencies(),
            thresholds: default_style_thresholds(),
        }
    }
}

/// `score` is awarded when the number of findings is at most `under`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StyleThreshold {
    pub under: u32,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitCheckerConfig {
    #[serde(default = "default_minor_grade")]
    pub grade: f64,

    #[serde(default)]
    pub output_dependent: bool,

    #[serde(default = "default_commit_dependencies")]
    pub dependencies: Vec<String>,

    #[serde(default = "default_min_commits")]
    pub min_commits: u32,

    /// Enforce `format` on every commit message.
    #[serde(default = "default_true")]
    pub use_format: bool,

    /// Regex every message must match; the `message` group is length-checked.
    #[serde(default = "default_commit_format")]
    pub format: String,

    #[serde(default = "default_min_message_len")]
    pub min_message_len: usize,

    /// More issues than this zero the score.
    #[serde(default = "default_max_issues")]
    pub max_issues: usize,
}

impl Default for CommitCheckerConfig {
    fn default() -> Self {
        Self {
            grade: default_minor_grade(),
            output_dependent: false,
            dependencies: default_commit_dependencies(),
            min_commits: default_min_commits(),
            use_format: true,
            format: default_commit_format(),
            min_message_len: default_min_message_len(),
            max_issues: default_max_issues(),
        }
    }
}

/// Self-test module that emits random findings; useful to exercise displays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticConfig {
    #[serde(default = "default_grade")]
    pub grade: f64,

    /// Fixed seed for reproducible output; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            grade: default_grade(),
            seed: None,
        }
    }
}

// ============================================================================
// serde defaults
// ============================================================================

const fn default_true() -> bool {
    true
}

fn default_source() -> PathBuf {
    PathBuf::from("src")
}

fn default_executable() -> PathBuf {
    PathBuf::from("./main")
}

fn default_input() -> PathBuf {
    PathBuf::from("tests/in")
}

fn default_output() -> PathBuf {
    PathBuf::from("tests/out")
}

fn default_reference() -> PathBuf {
    PathBuf::from("tests/ref")
}

fn default_forward() -> PathBuf {
    PathBuf::from("tests/forward")
}

fn default_temp() -> PathBuf {
    PathBuf::from(".pa-checker")
}

fn default_repository() -> PathBuf {
    PathBuf::from(".")
}

const fn default_grade() -> f64 {
    1.0
}

const fn default_memory_grade() -> f64 {
    0.2
}

const fn default_minor_grade() -> f64 {
    0.1
}

fn default_memory_dependencies() -> Vec<String> {
    vec![VALGRIND.to_string()]
}

fn default_style_dependencies() -> Vec<String> {
    vec!["cppcheck".to_string()]
}

fn default_commit_dependencies() -> Vec<String> {
    vec!["git".to_string()]
}

const fn default_max_warnings() -> u32 {
    10
}

fn default_style_thresholds() -> Vec<StyleThreshold> {
    vec![
        StyleThreshold { under: 0, score: 100 },
        StyleThreshold { under: 5, score: 75 },
        StyleThreshold { under: 10, score: 50 },
        StyleThreshold { under: 20, score: 25 },
    ]
}

const fn default_min_commits() -> u32 {
    3
}

fn default_commit_format() -> String {
    DEFAULT_COMMIT_FORMAT.to_string()
}

const fn default_min_message_len() -> usize {
    10
}

const fn default_max_issues() -> usize {
    3
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
