use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::config::StyleThreshold;

use super::module::Check;
use super::{Issue, ModuleState, RunContext};

const CPPCHECK: &str = "cppcheck";

const CPPCHECK_ARGS: [&str; 7] = [
    "--enable=all",
    "--check-level=exhaustive",
    "--xml",
    "--xml-version=2",
    "--inconclusive",
    "--suppress=missingIncludeSystem",
    "--language=c",
];

/// Raw score recorded when cppcheck itself could not be run.
const EXECUTION_FAILED: i64 = -1;

#[derive(Debug, Deserialize)]
struct CppcheckResults {
    #[serde(default)]
    errors: CppcheckErrors,
}

#[derive(Debug, Default, Deserialize)]
struct CppcheckErrors {
    #[serde(rename = "error", default)]
    errors: Vec<CppcheckError>,
}

#[derive(Debug, Deserialize)]
struct CppcheckError {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@severity")]
    severity: String,
    #[serde(rename = "@msg")]
    msg: String,
    #[serde(rename = "location", default)]
    locations: Vec<CppcheckLocation>,
}

#[derive(Debug, Deserialize)]
struct CppcheckLocation {
    #[serde(rename = "@file")]
    file: String,
    #[serde(rename = "@line")]
    line: u32,
    #[serde(rename = "@column", default)]
    column: u32,
}

/// One cppcheck finding at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleFinding {
    pub id: String,
    pub severity: String,
    pub message: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl StyleFinding {
    /// `severity: msg [id]`, followed by the offending line and a caret when
    /// the source is readable.
    fn render(&self) -> String {
        let head = format!("{}: {} [{}]", self.severity, self.message, self.id);
        match source_excerpt(Path::new(&self.file), self.line, self.column) {
            Some(excerpt) => format!("{head}\n{excerpt}"),
            None => head,
        }
    }

    fn to_issue(&self) -> Issue {
        Issue::new(self.render()).at(&self.file, self.line, Some(self.column))
    }
}

/// Flattens a cppcheck `--xml-version=2` report into one finding per location.
/// Errors without a location (e.g. `checkersReport`) yield nothing.
///
/// # Errors
/// Returns the deserializer error for malformed documents.
pub fn parse_cppcheck_xml(xml: &str) -> Result<Vec<StyleFinding>, quick_xml::DeError> {
    let results: CppcheckResults = quick_xml::de::from_str(xml)?;
    let findings = results
        .errors
        .errors
        .into_iter()
        .flat_map(|error| {
            error
                .locations
                .into_iter()
                .map(move |loc| StyleFinding {
                    id: error.id.clone(),
                    severity: error.severity.clone(),
                    message: error.msg.clone(),
                    file: loc.file,
                    line: loc.line,
                    column: loc.column,
                })
        })
        .collect();
    Ok(findings)
}

/// Score of the first threshold, in ascending `under` order, that admits
/// `count` issues. Zero when every threshold is exceeded.
#[must_use]
pub fn threshold_score(count: usize, thresholds: &[StyleThreshold]) -> i64 {
    let mut sorted = thresholds.to_vec();
    sorted.sort_by_key(|t| t.under);
    sorted
        .iter()
        .find(|t| usize::try_from(t.under).is_ok_and(|under| under >= count))
        .map_or(0, |t| t.score)
}

/// Line `line` of `path` with tabs expanded and a caret under `column`.
fn source_excerpt(path: &Path, line: u32, column: u32) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let index = usize::try_from(line.checked_sub(1)?).ok()?;
    let text = content.lines().nth(index)?;
    let text = text.trim_end().replace('\t', " ");
    let pad = usize::try_from(column.max(1) - 1).unwrap_or(0);
    Some(format!("{text}\n{}^", " ".repeat(pad)))
}

/// Static analysis of the sources with cppcheck.
#[derive(Debug)]
pub struct StyleCheck {
    thresholds: Vec<StyleThreshold>,
    findings: Vec<StyleFinding>,
}

impl StyleCheck {
    #[must_use]
    pub const fn new(thresholds: Vec<StyleThreshold>) -> Self {
        Self {
            thresholds,
            findings: Vec::new(),
        }
    }

    #[must_use]
    pub fn findings(&self) -> &[StyleFinding] {
        &self.findings
    }

    /// Scores a cppcheck report (its stderr).
    fn record(&mut self, report: &str, state: &mut ModuleState) {
        match parse_cppcheck_xml(report) {
            Ok(findings) => {
                for finding in &findings {
                    state.push(finding.to_issue());
                }
                state.set_raw_score(threshold_score(findings.len(), &self.thresholds));
                self.findings = findings;
            }
            Err(e) => {
                state.push(Issue::critical(format!("Failed to parse cppcheck output: {e}")));
                state.set_raw_score(0);
            }
        }
    }
}

fn run_cppcheck(source: &Path) -> Result<String, String> {
    let output = Command::new(CPPCHECK)
        .args(CPPCHECK_ARGS)
        .arg(source)
        .output()
        .map_err(|e| e.to_string())?;
    if !output.status.success() {
        return Err(format!(
            "{}\n{}",
            output.status,
            String::from_utf8_lossy(&output.stdout)
        ));
    }
    Ok(String::from_utf8_lossy(&output.stderr).into_owned())
}

impl Check for StyleCheck {
    fn execute(&mut self, ctx: &RunContext<'_>, state: &mut ModuleState) {
        match run_cppcheck(&ctx.paths.source) {
            Ok(report) => self.record(&report, state),
            Err(reason) => {
                tracing::error!(source = %ctx.paths.source.display(), "cppcheck execution failed: {reason}");
                state.push(Issue::critical(format!("cppcheck execution failed: {reason}")));
                state.set_raw_score(EXECUTION_FAILED);
            }
        }
    }

    fn clear(&mut self) {
        self.findings.clear();
    }

    fn summary(&self, state: &ModuleState) -> String {
        format!("{} issues", state.issues().len())
    }

    fn details(&self, state: &ModuleState) -> String {
        if state.issues().is_empty() {
            return "Now this is some piece of art you've written!\n".to_string();
        }
        let mut issues: Vec<_> = state.issues().iter().collect();
        issues.sort_by(|a, b| (&a.file, a.line, a.column).cmp(&(&b.file, b.line, b.column)));
        issues.iter().fold(String::new(), |mut out, issue| {
            out.push_str(&issue.to_string());
            out.push('\n');
            out
        })
    }
}

#[cfg(test)]
#[path = "style_tests.rs"]
mod tests;
