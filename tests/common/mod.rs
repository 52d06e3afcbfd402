#![allow(dead_code)]

use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Creates an `assert_cmd` Command for the pa-checker binary.
#[macro_export]
macro_rules! pa_checker {
    () => {
        assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("pa-checker"))
    };
}

/// Creates a temporary assignment directory for integration tests.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    /// Creates a new test fixture with an empty temp directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Creates a file with the given content in the temp directory.
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Returns the path to the temp directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Creates a `.pa-checker.toml` config file.
    pub fn create_config(&self, content: &str) {
        self.create_file(".pa-checker.toml", content);
    }

    /// Creates an executable `/bin/sh` script.
    #[cfg(unix)]
    pub fn create_script(&self, relative_path: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.create_file(relative_path, &format!("#!/bin/sh\n{body}\n"));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("Failed to mark script executable");
        path
    }

    /// Writes `tests/in/<file>.in` and `tests/ref/<file>.ref`.
    pub fn create_case(&self, file: &str, input: &str, reference: &str) {
        self.create_file(&format!("tests/in/{file}.in"), input);
        self.create_file(&format!("tests/ref/{file}.ref"), reference);
    }
}

/// Config with only the reference checker, valgrind off, and
/// `(name, file, score)` tests that pass `$IN $OUT` to the executable.
pub fn refs_only_config(tests: &[(&str, &str, u32)]) -> String {
    let mut config = String::from(
        "version = \"1\"\n\n[settings]\nrun_valgrind = false\n\n[ref_checker]\ngrade = 1.0\n",
    );
    for (name, file, score) in tests {
        let _ = write!(
            config,
            "\n[[tests]]\nname = \"{name}\"\nfile = \"{file}\"\nargs = [\"$IN\", \"$OUT\"]\nscore = {score}\n"
        );
    }
    config
}
