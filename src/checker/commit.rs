use std::fmt::Write;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use regex::Regex;
use serde::Serialize;

use crate::config::{CommitCheckerConfig, DEFAULT_COMMIT_FORMAT};

use super::module::Check;
use super::{Issue, ModuleState, RunContext};

const GIT_NOT_FOUND: &str =
    "The checker couldn't find git on your system. Are you sure it's installed?";
const NO_REPOSITORY: &str = "Couldn't find any commits, are you sure you ran 'git init' first?";
const NO_COMMITS: &str = "The repository has no commits yet.";
const EMPTY_LOG: &str = "The checker couldn't find any commits!";
const NOT_ENOUGH_COMMITS: &str = "Not enough commits have been made.";

/// One line of `git log --oneline`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitEntry {
    pub hash: String,
    pub message: String,
}

/// Splits `git log --oneline` output into entries, skipping blank lines.
#[must_use]
pub fn parse_log(log: &str) -> Vec<CommitEntry> {
    log.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let (hash, message) = line.split_once(' ').unwrap_or((line, ""));
            CommitEntry {
                hash: hash.to_string(),
                message: message.to_string(),
            }
        })
        .collect()
}

/// Commit history quality check.
#[derive(Debug)]
pub struct CommitCheck {
    config: CommitCheckerConfig,
    pattern: Option<Regex>,
    commits: Vec<CommitEntry>,
}

impl CommitCheck {
    #[must_use]
    pub fn new(config: CommitCheckerConfig) -> Self {
        let pattern = Regex::new(&config.format).ok();
        Self {
            config,
            pattern,
            commits: Vec::new(),
        }
    }

    #[must_use]
    pub fn commits(&self) -> &[CommitEntry] {
        &self.commits
    }

    /// Checks one commit message against the configured format.
    fn check_message(&self, message: &str) -> Result<(), String> {
        let Some(pattern) = &self.pattern else {
            return Err(format!("unusable commit format `{}`", self.config.format));
        };
        let Some(caps) = pattern.captures(message) else {
            return Err(self.format_hint());
        };
        let body = caps.name("message").map_or("", |m| m.as_str().trim());
        if body.chars().count() < self.config.min_message_len {
            return Err("the message is too short".to_string());
        }
        Ok(())
    }

    fn format_hint(&self) -> String {
        if self.config.format == DEFAULT_COMMIT_FORMAT {
            "invalid format! Hint, the format is: <type of commit>: <message>".to_string()
        } else {
            format!(
                "invalid format! Hint, the message must match `{}`",
                self.config.format
            )
        }
    }

    /// Scores the output of `git log --oneline --all`.
    fn record(&mut self, log: &str, state: &mut ModuleState) {
        let commits = parse_log(log);
        if commits.is_empty() {
            state.push(Issue::new(EMPTY_LOG));
            state.set_raw_score(0);
            return;
        }

        if self.config.use_format {
            for commit in &commits {
                if let Err(reason) = self.check_message(&commit.message) {
                    state.push(Issue::new(format!(
                        "Bad commit detected: {reason} the commit was \"{}\"",
                        commit.message
                    )));
                }
            }
        }

        let min_commits = usize::try_from(self.config.min_commits.max(1)).unwrap_or(1);
        let mut score: i64 = 100;
        if commits.len() < min_commits {
            score -= 1;
            state.push(Issue::new(NOT_ENOUGH_COMMITS));
        }

        let issues = state.issues().len();
        let score = if issues == 0 {
            100
        } else if issues > self.config.max_issues {
            0
        } else {
            let deduction = 100 / i64::try_from(min_commits).unwrap_or(1);
            score - i64::try_from(issues).unwrap_or(i64::MAX / 100) * deduction
        };
        state.set_raw_score(score);
        self.commits = commits;
    }
}

/// Runs `git log --oneline --all` in `repository`, translating failures into
/// the critical issue the student should see.
fn git_log(repository: &Path) -> Result<String, Issue> {
    if !repository.is_dir() {
        return Err(Issue::critical(NO_REPOSITORY));
    }
    let output = Command::new("git")
        .args(["log", "--oneline", "--all"])
        .current_dir(repository)
        .output()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => Issue::critical(GIT_NOT_FOUND),
            _ => Issue::critical(format!("CRITICAL ERROR! {e}")),
        })?;

    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }

    match gix::discover(repository) {
        Err(_) => Err(Issue::critical(NO_REPOSITORY)),
        Ok(repo) if repo.head_id().is_err() => Err(Issue::critical(NO_COMMITS)),
        Ok(_) => Err(Issue::critical(format!(
            "CRITICAL ERROR! {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ))),
    }
}

impl Check for CommitCheck {
    fn execute(&mut self, ctx: &RunContext<'_>, state: &mut ModuleState) {
        match git_log(&ctx.paths.repository) {
            Ok(log) => self.record(&log, state),
            Err(issue) => {
                tracing::error!(repository = %ctx.paths.repository.display(), "{}", issue.message);
                state.push(issue);
                state.set_raw_score(0);
            }
        }
    }

    fn clear(&mut self) {
        self.commits.clear();
    }

    fn summary(&self, state: &ModuleState) -> String {
        state.raw_score().to_string()
    }

    fn details(&self, state: &ModuleState) -> String {
        let issues = state.issues();
        if issues.is_empty() {
            return format!(
                "No issues found!\n{} commits checked. Congrats :)\n",
                self.commits.len()
            );
        }
        if let [issue] = issues
            && issue.critical
        {
            return format!("Got an error!\n{}\n", issue.message);
        }

        let mut out = String::from("Detected some issues!\n");
        for issue in issues {
            let _ = writeln!(out, "{issue}");
        }
        let _ = writeln!(out, "The final score is {}/100.", state.raw_score().max(0));
        out
    }
}

#[cfg(test)]
#[path = "commit_tests.rs"]
mod tests;
