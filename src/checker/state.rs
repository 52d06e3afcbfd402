use super::{Issue, ModuleStatus};
use crate::score::weighted_score;

/// Status, findings and raw score shared by every checker kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleState {
    status: ModuleStatus,
    issues: Vec<Issue>,
    raw_score: i64,
}

impl Default for ModuleState {
    fn default() -> Self {
        Self {
            status: ModuleStatus::Queued,
            issues: Vec::new(),
            raw_score: 0,
        }
    }
}

impl ModuleState {
    #[must_use]
    pub const fn status(&self) -> ModuleStatus {
        self.status
    }

    pub fn enable(&mut self) {
        if self.status != ModuleStatus::Running {
            self.status = ModuleStatus::Queued;
        }
    }

    pub fn disable(&mut self, failure: bool) {
        if self.status == ModuleStatus::Running {
            return;
        }
        self.status = if failure {
            ModuleStatus::DependencyFail
        } else {
            ModuleStatus::Disabled
        };
    }

    /// Returns `false` when the status is sticky and nothing was cleared.
    pub fn reset(&mut self) -> bool {
        if self.status.is_sticky() {
            return false;
        }
        self.issues.clear();
        self.raw_score = 0;
        self.status = ModuleStatus::Queued;
        true
    }

    /// Enters `Running`; refused for disabled, failed, panicked or already
    /// running modules.
    pub fn begin(&mut self) -> bool {
        match self.status {
            ModuleStatus::Queued | ModuleStatus::Ready => {
                self.status = ModuleStatus::Running;
                true
            }
            _ => false,
        }
    }

    pub fn finish(&mut self) {
        if self.status == ModuleStatus::Running {
            self.status = ModuleStatus::Ready;
        }
    }

    /// Terminal failure: findings and score from earlier runs are dropped.
    pub fn panic(&mut self) {
        self.issues.clear();
        self.raw_score = 0;
        self.status = ModuleStatus::Panic;
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    #[must_use]
    pub fn has_critical(&self) -> bool {
        self.issues.iter().any(|issue| issue.critical)
    }

    #[must_use]
    pub const fn raw_score(&self) -> i64 {
        self.raw_score
    }

    pub const fn set_raw_score(&mut self, score: i64) {
        self.raw_score = score;
    }

    #[must_use]
    pub fn weighted(&self, grade: f64) -> u32 {
        weighted_score(self.raw_score, grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_queued() {
        assert_eq!(ModuleState::default().status(), ModuleStatus::Queued);
    }

    #[test]
    fn reset_clears_findings() {
        let mut state = ModuleState::default();
        assert!(state.begin());
        state.push(Issue::new("x"));
        state.set_raw_score(40);
        state.finish();

        assert!(state.reset());
        assert_eq!(state.status(), ModuleStatus::Queued);
        assert!(state.issues().is_empty());
        assert_eq!(state.raw_score(), 0);
    }

    #[test]
    fn reset_is_sticky_for_disabled_and_dependency_fail() {
        for failure in [false, true] {
            let mut state = ModuleState::default();
            state.disable(failure);
            let before = state.status();
            assert!(!state.reset());
            assert_eq!(state.status(), before);
        }
    }

    #[test]
    fn reset_recovers_from_panic() {
        let mut state = ModuleState::default();
        state.panic();
        assert!(state.reset());
        assert_eq!(state.status(), ModuleStatus::Queued);
    }

    #[test]
    fn panic_drops_previous_score_and_findings() {
        let mut state = ModuleState::default();
        assert!(state.begin());
        state.push(Issue::new("x"));
        state.set_raw_score(40);
        state.finish();

        state.panic();
        assert_eq!(state.status(), ModuleStatus::Panic);
        assert!(state.issues().is_empty());
        assert_eq!(state.weighted(1.0), 0);
    }

    #[test]
    fn enable_and_disable_ignored_while_running() {
        let mut state = ModuleState::default();
        assert!(state.begin());
        state.disable(true);
        assert_eq!(state.status(), ModuleStatus::Running);
        state.enable();
        assert_eq!(state.status(), ModuleStatus::Running);
        state.finish();
        assert_eq!(state.status(), ModuleStatus::Ready);
    }

    #[test]
    fn begin_refused_unless_queued_or_ready() {
        let setters: [fn(&mut ModuleState); 3] = [
            |s| s.disable(false),
            |s| s.disable(true),
            |s| s.panic(),
        ];
        for status_setter in setters {
            let mut state = ModuleState::default();
            status_setter(&mut state);
            assert!(!state.begin());
        }
    }

    #[test]
    fn enable_leaves_dependency_fail() {
        let mut state = ModuleState::default();
        state.disable(true);
        state.enable();
        assert_eq!(state.status(), ModuleStatus::Queued);
    }

    #[test]
    fn critical_findings_are_detected() {
        let mut state = ModuleState::default();
        state.push(Issue::new("minor"));
        assert!(!state.has_critical());
        state.push(Issue::critical("broken"));
        assert!(state.has_critical());
    }
}
