use serde::Serialize;

use crate::checker::{Issue, ModuleStatus};
use crate::error::Result;
use crate::report::{ExecutionRecord, ModuleReport, RunSummary};

use super::OutputFormatter;

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonOutput<'a> {
    total_score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    modules: Vec<ModuleResult<'a>>,
    tests: &'a [ExecutionRecord],
}

#[derive(Serialize)]
struct ModuleResult<'a> {
    name: &'a str,
    title: &'a str,
    status: ModuleStatus,
    result: String,
    score: u32,
    issues: &'a [Issue],
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, summary: &RunSummary) -> Result<String> {
        let output = JsonOutput {
            total_score: summary.total_score,
            error: summary.caption.as_deref(),
            modules: summary.modules.iter().map(convert_module).collect(),
            tests: &summary.tests,
        };

        Ok(serde_json::to_string_pretty(&output)?)
    }
}

fn convert_module(report: &ModuleReport) -> ModuleResult<'_> {
    ModuleResult {
        name: &report.name,
        title: &report.title,
        status: report.status,
        result: report.result_label(),
        score: report.score,
        issues: &report.issues,
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
