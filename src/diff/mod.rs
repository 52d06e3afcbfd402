//! Text comparison between a reference file and a candidate output.
//!
//! Comparison is byte-exact: two inputs produce a script made only of
//! [`SegmentKind::Equal`] runs exactly when their bytes are identical. Valid
//! UTF-8 is diffed per character so highlighted spans never split a code
//! point; anything else is diffed per byte and rendered lossily.

mod myers;

pub use myers::{Chunk, diff};

use std::fmt::Write;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Time spent refining one comparison before falling back to a coarse
/// delete/insert pair for what is left.
pub const DIFF_TIME_BUDGET: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Equal,
    /// Present only in the candidate.
    Insert,
    /// Present only in the reference.
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

/// Diffs `reference` against `candidate` within [`DIFF_TIME_BUDGET`].
#[must_use]
pub fn diff_text(reference: &[u8], candidate: &[u8]) -> Vec<Segment> {
    diff_text_within(reference, candidate, Some(DIFF_TIME_BUDGET))
}

/// Diffs with an explicit time budget (`None` = unbounded).
#[must_use]
pub fn diff_text_within(
    reference: &[u8],
    candidate: &[u8],
    budget: Option<Duration>,
) -> Vec<Segment> {
    if reference == candidate {
        if reference.is_empty() {
            return Vec::new();
        }
        return vec![Segment {
            kind: SegmentKind::Equal,
            text: String::from_utf8_lossy(reference).into_owned(),
        }];
    }

    let deadline = budget.and_then(|b| Instant::now().checked_add(b));
    match (std::str::from_utf8(reference), std::str::from_utf8(candidate)) {
        (Ok(reference), Ok(candidate)) => {
            let reference: Vec<char> = reference.chars().collect();
            let candidate: Vec<char> = candidate.chars().collect();
            diff(&reference, &candidate, deadline)
                .into_iter()
                .map(|chunk| Segment {
                    kind: chunk.kind,
                    text: chunk.items.into_iter().collect(),
                })
                .collect()
        }
        _ => diff(reference, candidate, deadline)
            .into_iter()
            .map(|chunk| Segment {
                kind: chunk.kind,
                text: String::from_utf8_lossy(&chunk.items).into_owned(),
            })
            .collect(),
    }
}

/// True when the script has no insertions or deletions.
#[must_use]
pub fn is_identical(segments: &[Segment]) -> bool {
    segments.iter().all(|s| s.kind == SegmentKind::Equal)
}

// ============================================================================
// Side-by-side rendering
// ============================================================================

/// Piece of a rendered line; `changed` marks text present on one side only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub changed: bool,
}

pub type Line = Vec<Span>;

/// Both sides of a comparison split into lines, for display.
///
/// Deletions show on the reference side, insertions on the candidate side and
/// equal runs on both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SideBySide {
    pub reference: Vec<Line>,
    pub candidate: Vec<Line>,
}

impl SideBySide {
    #[must_use]
    pub fn from_segments(segments: &[Segment]) -> Self {
        let mut reference = LineBuilder::default();
        let mut candidate = LineBuilder::default();
        for segment in segments {
            match segment.kind {
                SegmentKind::Equal => {
                    reference.push(&segment.text, false);
                    candidate.push(&segment.text, false);
                }
                SegmentKind::Delete => reference.push(&segment.text, true),
                SegmentKind::Insert => candidate.push(&segment.text, true),
            }
        }
        Self {
            reference: reference.finish(),
            candidate: candidate.finish(),
        }
    }

    /// Plain-text listing of both sides with numbered lines. Changed spans
    /// read `[-text-]` on the reference side and `{+text+}` on the candidate
    /// side.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from("reference:\n");
        render_side(&mut out, &self.reference, ("[-", "-]"));
        out.push_str("candidate:\n");
        render_side(&mut out, &self.candidate, ("{+", "+}"));
        out
    }
}

fn render_side(out: &mut String, lines: &[Line], (open, close): (&str, &str)) {
    // A trailing newline leaves an empty last line that carries nothing.
    let lines = match lines.split_last() {
        Some((last, rest)) if last.is_empty() && !rest.is_empty() => rest,
        _ => lines,
    };
    for (line, number) in lines.iter().zip(1..) {
        let _ = write!(out, "{number:>4} | ");
        for span in line {
            if span.changed {
                out.push_str(open);
                out.push_str(&span.text);
                out.push_str(close);
            } else {
                out.push_str(&span.text);
            }
        }
        out.push('\n');
    }
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<Line>,
    current: Line,
}

impl LineBuilder {
    fn push(&mut self, text: &str, changed: bool) {
        let mut parts = text.split('\n');
        if let Some(first) = parts.next() {
            self.append(first, changed);
        }
        for part in parts {
            self.lines.push(std::mem::take(&mut self.current));
            self.append(part, changed);
        }
    }

    fn append(&mut self, text: &str, changed: bool) {
        if text.is_empty() {
            return;
        }
        match self.current.last_mut() {
            Some(last) if last.changed == changed => last.text.push_str(text),
            _ => self.current.push(Span {
                text: text.to_string(),
                changed,
            }),
        }
    }

    fn finish(mut self) -> Vec<Line> {
        self.lines.push(self.current);
        self.lines
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
