//! Score aggregation.

use crate::checker::{CheckerModule, ModuleSlot, lock_module};

/// `round(max(raw, 0) * grade)`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn weighted_score(raw: i64, grade: f64) -> u32 {
    if raw <= 0 || grade <= 0.0 {
        return 0;
    }
    (raw as f64 * grade).round() as u32
}

/// Sum of every module's weighted score, disabled modules included.
pub fn total_score<'a, I>(modules: I) -> u32
where
    I: IntoIterator<Item = &'a dyn CheckerModule>,
{
    modules.into_iter().map(|module| module.score()).sum()
}

/// [`total_score`] over a locked registry.
#[must_use]
pub fn registry_score(slots: &[ModuleSlot]) -> u32 {
    slots.iter().map(|slot| lock_module(slot).score()).sum()
}
