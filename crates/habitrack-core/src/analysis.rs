//! Derived queries over stored habits.
//!
//! Every query here is a fold over [`calculate_streak_for`]; `now` is passed in
//! so results are reproducible. A habit whose stored frequency is unsupported
//! is listed with a streak of 0.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::periodicity::Periodicity;
use crate::storage::{Database, Habit};
use crate::streak::calculate_streak_for;

/// Per-habit line of the summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitSummary {
    pub id: i64,
    pub name: String,
    pub frequency: String,
    pub streak: u32,
    pub completions: u64,
}

/// Habit holding the longest current streak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongestStreak {
    pub habit_id: i64,
    pub name: String,
    pub frequency: String,
    pub streak: u32,
}

/// One bar pair of the completions-vs-streak chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRow {
    pub name: String,
    pub completions: u64,
    pub streak: u32,
}

/// Outcome of searching habits by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMatch {
    NotFound,
    Unique(Habit),
    Ambiguous(Vec<Habit>),
}

pub fn habits_by_frequency(db: &Database, periodicity: Periodicity) -> Result<Vec<Habit>> {
    Ok(db
        .list_habits()?
        .into_iter()
        .filter(|h| h.periodicity() == Some(periodicity))
        .collect())
}

/// Current streak of one habit.
pub fn habit_streak(db: &Database, habit: &Habit, now: NaiveDateTime) -> Result<u32> {
    let completions = db.list_completions(habit.id)?;
    if completions.is_empty() {
        tracing::debug!(habit_id = habit.id, "habit has no completions");
    }
    Ok(calculate_streak_for(&completions, &habit.frequency, now))
}

/// Habit with the greatest current streak.
///
/// Ties go to the habit listed first. Returns `None` when no habit has a
/// streak above zero.
pub fn longest_streak(db: &Database, now: NaiveDateTime) -> Result<Option<LongestStreak>> {
    let mut best: Option<LongestStreak> = None;
    for habit in db.list_habits()? {
        let streak = habit_streak(db, &habit, now)?;
        let current_best = best.as_ref().map_or(0, |b| b.streak);
        if streak > current_best {
            best = Some(LongestStreak {
                habit_id: habit.id,
                name: habit.name,
                frequency: habit.frequency,
                streak,
            });
        }
    }
    Ok(best)
}

/// Case-insensitive substring search over habit names.
pub fn find_habits_by_name(db: &Database, query: &str) -> Result<NameMatch> {
    let needle = query.trim().to_lowercase();
    let mut matches: Vec<Habit> = db
        .list_habits()?
        .into_iter()
        .filter(|h| h.name.to_lowercase().contains(&needle))
        .collect();

    Ok(match matches.len() {
        0 => NameMatch::NotFound,
        1 => NameMatch::Unique(matches.remove(0)),
        _ => NameMatch::Ambiguous(matches),
    })
}

pub fn summary(db: &Database, now: NaiveDateTime) -> Result<Vec<HabitSummary>> {
    db.list_habits()?
        .into_iter()
        .map(|habit| {
            let completions = db.list_completions(habit.id)?;
            Ok(HabitSummary {
                streak: calculate_streak_for(&completions, &habit.frequency, now),
                completions: completions.len() as u64,
                id: habit.id,
                name: habit.name,
                frequency: habit.frequency,
            })
        })
        .collect()
}

/// Completion totals and current streaks per habit.
///
/// Empty when no habit has been completed yet.
pub fn completion_chart(db: &Database, now: NaiveDateTime) -> Result<Vec<ChartRow>> {
    let rows: Vec<ChartRow> = summary(db, now)?
        .into_iter()
        .map(|s| ChartRow {
            name: s.name,
            completions: s.completions,
            streak: s.streak,
        })
        .collect();

    if rows.iter().all(|r| r.completions == 0) {
        return Ok(Vec::new());
    }
    Ok(rows)
}

pub fn completion_count(db: &Database, habit_id: i64) -> Result<u64> {
    db.completion_count(habit_id)
}
