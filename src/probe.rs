//! External tool discovery and module gating.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::checker::{ModuleSlot, lock_module};
use crate::config::{SettingsConfig, VALGRIND};

/// Resolves tool names to executables.
pub trait ToolProbe: Send + Sync {
    fn locate(&self, tool: &str) -> Option<PathBuf>;
}

/// Looks tools up on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathProbe;

impl ToolProbe for PathProbe {
    fn locate(&self, tool: &str) -> Option<PathBuf> {
        find_executable(Path::new(tool))
    }
}

/// Resolves `program` the way a shell would: a path with a separator is
/// checked as is, a bare name is searched on `PATH`.
#[must_use]
pub fn find_executable(program: &Path) -> Option<PathBuf> {
    if program.as_os_str().is_empty() {
        return None;
    }
    if program.components().count() > 1 || program.is_absolute() {
        return is_executable_file(program).then(|| program.to_path_buf());
    }
    let search = std::env::var_os("PATH")?;
    std::env::split_paths(&search)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable_file(candidate))
}

fn is_executable_file(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Tools the user switched off in the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolPolicy {
    disabled: BTreeSet<String>,
}

impl ToolPolicy {
    #[must_use]
    pub fn from_settings(settings: &SettingsConfig) -> Self {
        let mut policy = Self::default();
        if !settings.run_valgrind {
            policy.disable(VALGRIND);
        }
        policy
    }

    pub fn disable(&mut self, tool: impl Into<String>) {
        self.disabled.insert(tool.into());
    }

    #[must_use]
    pub fn is_disabled(&self, tool: &str) -> bool {
        self.disabled.contains(tool)
    }
}

/// Tools found installed and allowed by the policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    tools: BTreeSet<String>,
}

impl Capabilities {
    #[must_use]
    pub fn has(&self, tool: &str) -> bool {
        self.tools.contains(tool)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(String::as_str)
    }
}

/// Re-gates every module on its dependencies and returns what is usable.
///
/// A missing dependency fails the module; a dependency switched off by the
/// policy disables it; otherwise the module is re-enabled. Modules without
/// dependencies keep their status. `valgrind` is always probed because test
/// execution depends on it too.
pub fn probe_modules(modules: &[ModuleSlot], probe: &dyn ToolProbe, policy: &ToolPolicy) -> Capabilities {
    let mut located: BTreeMap<String, bool> = BTreeMap::new();
    let mut lookup = |tool: &str| -> bool {
        *located
            .entry(tool.to_string())
            .or_insert_with(|| probe.locate(tool).is_some())
    };

    for slot in modules {
        let mut module = lock_module(slot);
        let dependencies = module.dependencies().to_vec();
        if dependencies.is_empty() {
            continue;
        }

        let missing: Vec<&String> = dependencies.iter().filter(|tool| !lookup(tool.as_str())).collect();
        if !missing.is_empty() {
            for tool in missing {
                tracing::error!(module = %module.name(), "[ERR] {tool}");
            }
            module.disable(true);
            continue;
        }

        if let Some(tool) = dependencies.iter().find(|tool| policy.is_disabled(tool.as_str())) {
            tracing::info!(module = %module.name(), "[Disabled] {tool}");
            module.disable(false);
            continue;
        }

        for tool in &dependencies {
            tracing::info!(module = %module.name(), "[OK] {tool}");
        }
        module.enable();
    }

    lookup(VALGRIND);
    let tools = located
        .into_iter()
        .filter(|(tool, found)| *found && !policy.is_disabled(tool))
        .map(|(tool, _)| tool)
        .collect();
    Capabilities { tools }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
