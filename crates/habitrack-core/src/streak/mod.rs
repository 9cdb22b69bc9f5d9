//! Streak calculation.
//!
//! A streak is the number of consecutive periods, ending at the current
//! period or the one just before it, that contain at least one completion.
//!
//! - Completions are bucketed by [`PeriodKey`]; several completions in one
//!   period credit it once.
//! - If the current period has no completion yet, counting starts from the
//!   previous period (grace period), so an unfinished today does not break a
//!   streak that ended yesterday.
//! - The first missing period ends the streak. Only the current streak is
//!   computed, never the best historical one.
//! - Completions after `now` are bucketed like any other timestamp.

mod clock;
mod period;

pub use clock::{Clock, FixedClock, SystemClock};
pub use period::PeriodKey;

use chrono::NaiveDateTime;
use std::collections::HashSet;

use crate::periodicity::Periodicity;

/// Current streak length for `completions` under `periodicity`, anchored at `now`.
///
/// `completions` may be unsorted and may contain several entries per period.
pub fn calculate_streak(
    completions: &[NaiveDateTime],
    periodicity: Periodicity,
    now: NaiveDateTime,
) -> u32 {
    if completions.is_empty() {
        return 0;
    }

    let periods: HashSet<PeriodKey> = completions
        .iter()
        .map(|&at| PeriodKey::of(periodicity, at))
        .collect();

    let anchor = PeriodKey::of(periodicity, now);
    let start = if periods.contains(&anchor) {
        Some(anchor)
    } else {
        anchor.predecessor()
    };

    let mut streak = 0;
    let mut current = start;
    while let Some(key) = current {
        if !periods.contains(&key) {
            break;
        }
        streak += 1;
        current = key.predecessor();
    }

    tracing::debug!(
        %periodicity,
        completions = completions.len(),
        distinct_periods = periods.len(),
        %anchor,
        streak,
        "calculated streak"
    );
    streak
}

/// Like [`calculate_streak`], but takes the periodicity in its stored text form.
///
/// An unsupported frequency yields `0` rather than an error, so callers
/// rendering stored habits always get a number.
pub fn calculate_streak_for(
    completions: &[NaiveDateTime],
    frequency: &str,
    now: NaiveDateTime,
) -> u32 {
    match frequency.parse::<Periodicity>() {
        Ok(periodicity) => calculate_streak(completions, periodicity, now),
        Err(_) => {
            tracing::debug!(frequency, "unsupported frequency, streak is 0");
            0
        }
    }
}

/// Streak calculator bound to a clock.
#[derive(Debug, Clone, Default)]
pub struct StreakCalculator<C = SystemClock> {
    clock: C,
}

impl StreakCalculator<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> StreakCalculator<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn streak(&self, completions: &[NaiveDateTime], periodicity: Periodicity) -> u32 {
        calculate_streak(completions, periodicity, self.clock.now())
    }

    pub fn streak_for(&self, completions: &[NaiveDateTime], frequency: &str) -> u32 {
        calculate_streak_for(completions, frequency, self.clock.now())
    }
}
