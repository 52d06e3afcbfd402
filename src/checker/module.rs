use std::time::Instant;

use crate::config::{
    CommitCheckerConfig, DiagnosticConfig, MemoryCheckerConfig, RefCheckerConfig,
    StyleCheckerConfig,
};

use super::{
    CheckerModule, CommitCheck, Diagnostic, Issue, MemoryCheck, ModuleState, ModuleStatus,
    RefDiff, RunContext, StyleCheck, status_notice,
};

/// Behaviour specific to one checker kind. Lifecycle bookkeeping lives in
/// [`Module`]; implementors only fill `state` with findings and a raw score.
pub(super) trait Check {
    fn execute(&mut self, ctx: &RunContext<'_>, state: &mut ModuleState);

    /// Drops per-run results kept outside `ModuleState`.
    fn clear(&mut self);

    fn summary(&self, state: &ModuleState) -> String;

    /// Body of the text report, below the heading.
    fn details(&self, state: &ModuleState) -> String;
}

/// The closed set of checker kinds.
#[derive(Debug)]
pub enum CheckKind {
    RefDiff(RefDiff),
    Memory(MemoryCheck),
    Style(StyleCheck),
    Commit(CommitCheck),
    Diagnostic(Diagnostic),
}

macro_rules! with_check {
    ($kind:expr, $check:ident => $body:expr) => {
        match $kind {
            CheckKind::RefDiff($check) => $body,
            CheckKind::Memory($check) => $body,
            CheckKind::Style($check) => $body,
            CheckKind::Commit($check) => $body,
            CheckKind::Diagnostic($check) => $body,
        }
    };
}

/// Settings every kind shares.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSettings {
    pub grade: f64,
    pub output_dependent: bool,
    pub dependencies: Vec<String>,
}

/// A checker module: one [`CheckKind`] plus the shared lifecycle.
#[derive(Debug)]
pub struct Module {
    name: String,
    title: String,
    settings: ModuleSettings,
    state: ModuleState,
    kind: CheckKind,
}

impl Module {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        settings: ModuleSettings,
        kind: CheckKind,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            settings,
            state: ModuleState::default(),
            kind,
        }
    }

    #[must_use]
    pub fn ref_diff(config: &RefCheckerConfig) -> Self {
        let settings = ModuleSettings {
            grade: config.grade,
            output_dependent: config.output_dependent,
            dependencies: Vec::new(),
        };
        Self::new("REFS", "Ref checker", settings, CheckKind::RefDiff(RefDiff::default()))
    }

    #[must_use]
    pub fn memory(config: &MemoryCheckerConfig) -> Self {
        let settings = ModuleSettings {
            grade: config.grade,
            output_dependent: config.output_dependent,
            dependencies: config.dependencies.clone(),
        };
        Self::new(
            "MEMORY",
            "Memory checker",
            settings,
            CheckKind::Memory(MemoryCheck::new(config.max_warnings)),
        )
    }

    #[must_use]
    pub fn style(config: &StyleCheckerConfig) -> Self {
        let settings = ModuleSettings {
            grade: config.grade,
            output_dependent: config.output_dependent,
            dependencies: config.dependencies.clone(),
        };
        Self::new(
            "STYLE",
            "Style checker",
            settings,
            CheckKind::Style(StyleCheck::new(config.thresholds.clone())),
        )
    }

    #[must_use]
    pub fn commit(config: &CommitCheckerConfig) -> Self {
        let settings = ModuleSettings {
            grade: config.grade,
            output_dependent: config.output_dependent,
            dependencies: config.dependencies.clone(),
        };
        Self::new(
            "COMMIT",
            "Commit checker",
            settings,
            CheckKind::Commit(CommitCheck::new(config.clone())),
        )
    }

    #[must_use]
    pub fn diagnostic(config: &DiagnosticConfig) -> Self {
        let check = Diagnostic::new(config.seed);
        let settings = ModuleSettings {
            grade: config.grade,
            output_dependent: false,
            dependencies: Vec::new(),
        };
        let name = check.name().to_string();
        Self::new(name.clone(), name, settings, CheckKind::Diagnostic(check))
    }

    #[must_use]
    pub const fn kind(&self) -> &CheckKind {
        &self.kind
    }

    #[must_use]
    pub const fn state(&self) -> &ModuleState {
        &self.state
    }
}

impl CheckerModule for Module {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn is_output_dependent(&self) -> bool {
        self.settings.output_dependent
    }

    fn dependencies(&self) -> &[String] {
        &self.settings.dependencies
    }

    fn status(&self) -> ModuleStatus {
        self.state.status()
    }

    fn enable(&mut self) {
        self.state.enable();
    }

    fn disable(&mut self, failure: bool) {
        self.state.disable(failure);
    }

    fn reset(&mut self) {
        if self.state.reset() {
            with_check!(&mut self.kind, check => check.clear());
        }
    }

    fn run(&mut self, ctx: &RunContext<'_>) {
        if !self.state.begin() {
            tracing::warn!(module = %self.name, status = %self.state.status(), "module not runnable");
            return;
        }
        let started = Instant::now();
        with_check!(&mut self.kind, check => check.execute(ctx, &mut self.state));
        self.state.finish();
        tracing::info!(
            module = %self.name,
            elapsed_ms = started.elapsed().as_millis(),
            "Checked {}",
            self.title
        );
    }

    fn panic(&mut self) {
        self.state.panic();
        with_check!(&mut self.kind, check => check.clear());
    }

    fn score(&self) -> u32 {
        self.state.weighted(self.settings.grade)
    }

    fn summary(&self) -> String {
        with_check!(&self.kind, check => check.summary(&self.state))
    }

    fn issues(&self) -> &[Issue] {
        self.state.issues()
    }

    fn dump(&self) -> String {
        let mut out = format!("===== {} - {} =====\n", self.title, self.score());
        match status_notice(self.status(), &self.settings.dependencies) {
            Some(notice) => {
                out.push_str(&notice);
                out.push('\n');
            }
            None => out.push_str(&with_check!(&self.kind, check => check.details(&self.state))),
        }
        out
    }
}

#[cfg(test)]
#[path = "module_tests.rs"]
mod tests;
