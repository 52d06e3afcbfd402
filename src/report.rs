//! Data handed from a run to its display collaborators.

use std::time::Duration;

use serde::Serialize;

use crate::checker::{CheckerModule, Issue, ModuleStatus};

/// Display collaborator attached to an interactive run.
///
/// Calls may arrive from worker threads; implementations synchronise
/// internally.
pub trait ReportSink: Send + Sync {
    /// Fraction of test executions completed, in `[0, 1]`.
    fn progress(&self, fraction: f64);

    /// One-line caption; empty clears it.
    fn status(&self, caption: &str);

    fn present(&self, report: &ModuleReport);
}

/// Read-only snapshot of one module after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleReport {
    pub name: String,
    pub title: String,
    pub status: ModuleStatus,
    pub score: u32,
    pub summary: String,
    pub issues: Vec<Issue>,
    #[serde(skip)]
    pub dump: String,
}

impl ModuleReport {
    pub fn capture<M: CheckerModule + ?Sized>(module: &M) -> Self {
        Self {
            name: module.name().to_string(),
            title: module.title().to_string(),
            status: module.status(),
            score: module.score(),
            summary: module.summary(),
            issues: module.issues().to_vec(),
            dump: module.dump(),
        }
    }

    /// Summary column of the score table: the status label unless the
    /// module finished.
    #[must_use]
    pub fn result_label(&self) -> String {
        if self.status == ModuleStatus::Ready {
            self.summary.clone()
        } else {
            self.status.label().to_string()
        }
    }
}

/// Outcome of executing the target for one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionRecord {
    pub index: usize,
    pub name: String,
    pub file: String,
    /// `None` when the process could not be started or was killed by a signal.
    pub exit_code: Option<i32>,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn serialize_millis<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

/// Everything a formatter needs to render a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Fatal precondition that stopped the run, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub modules: Vec<ModuleReport>,
    pub tests: Vec<ExecutionRecord>,
    pub total_score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Module;
    use crate::config::MemoryCheckerConfig;

    #[test]
    fn capture_copies_module_view() {
        let mut module = Module::memory(&MemoryCheckerConfig::default());
        module.disable(true);
        let report = ModuleReport::capture(&module);

        assert_eq!(report.name, "MEMORY");
        assert_eq!(report.title, "Memory checker");
        assert_eq!(report.status, ModuleStatus::DependencyFail);
        assert_eq!(report.score, 0);
        assert!(report.dump.contains("valgrind"));
        assert_eq!(report.result_label(), "ERR");
    }

    #[test]
    fn capture_works_through_trait_objects() {
        let module: Box<dyn CheckerModule> = Box::new(Module::memory(&MemoryCheckerConfig::default()));
        let report = ModuleReport::capture(&*module);
        assert_eq!(report.result_label(), "QUEUED");
    }

    #[test]
    fn execution_record_serializes_millis() {
        let record = ExecutionRecord {
            index: 0,
            name: "Test 1".to_string(),
            file: "t1".to_string(),
            exit_code: Some(0),
            elapsed: Duration::from_millis(1500),
            error: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["elapsed_ms"], 1500);
        assert!(json.get("error").is_none());
    }
}
