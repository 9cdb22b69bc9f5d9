//! Demo habits with a pre-filled completion history.
//!
//! Histories are anchored at the day before `now`, so the daily demos show a
//! streak kept alive by the grace period.

use chrono::{Days, NaiveDateTime};

use crate::error::Result;
use crate::periodicity::Periodicity;
use crate::storage::Database;

#[derive(Debug, Clone)]
pub struct ExampleHabit {
    pub name: &'static str,
    pub periodicity: Periodicity,
    pub created_at: NaiveDateTime,
    pub completions: Vec<NaiveDateTime>,
}

/// The demo habit set, generated relative to `now`.
pub struct ExampleData {
    habits: Vec<ExampleHabit>,
}

fn days_before(anchor: NaiveDateTime, days: u64) -> NaiveDateTime {
    anchor.checked_sub_days(Days::new(days)).unwrap_or(anchor)
}

fn history(anchor: NaiveDateTime, offsets: impl IntoIterator<Item = u64>) -> Vec<NaiveDateTime> {
    offsets.into_iter().map(|d| days_before(anchor, d)).collect()
}

impl ExampleData {
    pub fn new(now: NaiveDateTime) -> Self {
        let anchor = days_before(now, 1);
        let created_at = days_before(anchor, 28);
        let habits = vec![
            ExampleHabit {
                name: "Morning walk",
                periodicity: Periodicity::Daily,
                created_at,
                completions: history(anchor, 0..28),
            },
            ExampleHabit {
                name: "Read a book",
                periodicity: Periodicity::Daily,
                created_at,
                completions: history(anchor, (0..28).step_by(2)),
            },
            ExampleHabit {
                name: "Weekly reflection",
                periodicity: Periodicity::Weekly,
                created_at,
                completions: history(anchor, [0, 7, 14, 21]),
            },
            ExampleHabit {
                name: "Budget review",
                periodicity: Periodicity::Monthly,
                created_at,
                completions: vec![anchor],
            },
            ExampleHabit {
                name: "Annual goal review",
                periodicity: Periodicity::Yearly,
                created_at,
                completions: Vec::new(),
            },
        ];
        Self { habits }
    }

    pub fn habits(&self) -> &[ExampleHabit] {
        &self.habits
    }

    fn is_example_name(&self, name: &str) -> bool {
        self.habits.iter().any(|h| h.name == name)
    }

    /// Insert every demo habit not already present by name.
    ///
    /// Returns how many habits were inserted.
    pub fn activate(&self, db: &Database) -> Result<usize> {
        let existing = db.list_habits()?;
        let mut inserted = 0;
        for habit in &self.habits {
            if existing.iter().any(|h| h.name == habit.name) {
                continue;
            }
            db.add_habit_with_completions(
                habit.name,
                habit.periodicity,
                habit.created_at,
                &habit.completions,
            )?;
            inserted += 1;
        }
        tracing::info!(inserted, "activated example data");
        Ok(inserted)
    }

    /// Delete every habit whose name is a demo name.
    ///
    /// Returns how many habits were deleted.
    pub fn deactivate(&self, db: &Database) -> Result<usize> {
        let mut deleted = 0;
        for habit in db.list_habits()? {
            if self.is_example_name(&habit.name) && db.delete_habit(habit.id)? {
                deleted += 1;
            }
        }
        tracing::info!(deleted, "deactivated example data");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn activate_is_idempotent() {
        let db = Database::open_memory().unwrap();
        let examples = ExampleData::new(now());

        assert_eq!(examples.activate(&db).unwrap(), 5);
        assert_eq!(examples.activate(&db).unwrap(), 0);
        assert_eq!(db.list_habits().unwrap().len(), 5);
    }

    #[test]
    fn example_streaks() {
        let db = Database::open_memory().unwrap();
        ExampleData::new(now()).activate(&db).unwrap();

        let rows = analysis::summary(&db, now()).unwrap();
        let streak_of = |name: &str| rows.iter().find(|r| r.name == name).unwrap().streak;

        assert_eq!(streak_of("Morning walk"), 28);
        assert_eq!(streak_of("Read a book"), 1);
        assert_eq!(streak_of("Weekly reflection"), 4);
        assert_eq!(streak_of("Budget review"), 1);
        assert_eq!(streak_of("Annual goal review"), 0);
    }

    #[test]
    fn deactivate_keeps_user_habits() {
        let db = Database::open_memory().unwrap();
        db.add_habit("Stretch", Periodicity::Daily, now()).unwrap();
        let examples = ExampleData::new(now());
        examples.activate(&db).unwrap();

        assert_eq!(examples.deactivate(&db).unwrap(), 5);
        let remaining = db.list_habits().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Stretch");
    }
}
