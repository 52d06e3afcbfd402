use std::fmt::Write;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::module::Check;
use super::{Issue, ModuleState, RunContext};

const ISSUE_COUNT: usize = 25;
const FILLER: &str = "Lorem ipsum dolor sit amet";

/// Self-test module: reports random filler findings and a random score.
///
/// All randomness comes from one generator, so a seeded instance is
/// reproducible end to end.
#[derive(Debug)]
pub struct Diagnostic {
    name: String,
    rng: StdRng,
}

impl Diagnostic {
    /// Seeds from `seed`, or from the thread generator when absent.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        let tag: u8 = rng.random();
        Self {
            name: format!("diagnostic-{tag:x}"),
            rng,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Check for Diagnostic {
    fn execute(&mut self, _ctx: &RunContext<'_>, state: &mut ModuleState) {
        for _ in 0..ISSUE_COUNT {
            let line = self.rng.random_range(0..255);
            let column = self.rng.random_range(0..100);
            state.push(Issue::new(FILLER).at_position(line, column));
        }
        state.set_raw_score(self.rng.random_range(0..70));
    }

    fn clear(&mut self) {}

    fn summary(&self, state: &ModuleState) -> String {
        format!("{} issues", state.issues().len())
    }

    fn details(&self, state: &ModuleState) -> String {
        let mut out = format!("Total module score: {}\n", state.raw_score());
        for issue in state.issues() {
            let _ = writeln!(out, "{issue}");
        }
        out
    }
}
