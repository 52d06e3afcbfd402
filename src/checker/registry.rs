use crate::config::Config;

use super::{CheckerModule, Module};

/// Builds one module per configured checker section, in display order.
#[must_use]
pub fn build_registry(config: &Config) -> Vec<Box<dyn CheckerModule>> {
    let mut modules: Vec<Box<dyn CheckerModule>> = Vec::new();
    if let Some(refs) = &config.ref_checker {
        modules.push(Box::new(Module::ref_diff(refs)));
    }
    if let Some(memory) = &config.memory_checker {
        modules.push(Box::new(Module::memory(memory)));
    }
    if let Some(style) = &config.style_checker {
        modules.push(Box::new(Module::style(style)));
    }
    if let Some(commit) = &config.commit_checker {
        modules.push(Box::new(Module::commit(commit)));
    }
    if let Some(diagnostic) = &config.diagnostic {
        modules.push(Box::new(Module::diagnostic(diagnostic)));
    }
    modules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiagnosticConfig;

    fn names(config: &Config) -> Vec<String> {
        build_registry(config)
            .iter()
            .map(|m| m.name().to_string())
            .collect()
    }

    #[test]
    fn default_config_registers_four_checkers() {
        assert_eq!(names(&Config::default()), vec!["REFS", "MEMORY", "STYLE", "COMMIT"]);
    }

    #[test]
    fn missing_sections_are_not_registered() {
        let config = Config {
            memory_checker: None,
            commit_checker: None,
            ..Config::default()
        };
        assert_eq!(names(&config), vec!["REFS", "STYLE"]);
    }

    #[test]
    fn diagnostic_is_registered_last() {
        let config = Config {
            diagnostic: Some(DiagnosticConfig::default()),
            ..Config::default()
        };
        let names = names(&config);
        assert_eq!(names.len(), 5);
        assert!(names[4].starts_with("diagnostic-"));
    }

    #[test]
    fn registered_modules_start_queued() {
        assert!(
            build_registry(&Config::default())
                .iter()
                .all(|m| m.status() == crate::checker::ModuleStatus::Queued)
        );
    }
}
