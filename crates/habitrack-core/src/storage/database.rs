//! SQLite-based habit storage.
//!
//! Provides persistent storage for:
//! - Habits and their periodicity
//! - Completion timestamps per habit
//!
//! Timestamps are stored as local wall-clock text in [`TIMESTAMP_FORMAT`].

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DatabaseError, Result, ValidationError};
use crate::periodicity::Periodicity;

use super::{data_dir, migrations};

/// Text format of every stored timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATABASE_FILE: &str = "habits.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    pub name: String,
    /// Stored frequency text. Rows written by older versions may hold a value
    /// that is not a known [`Periodicity`].
    pub frequency: String,
    pub created_at: NaiveDateTime,
    pub last_completed: Option<NaiveDateTime>,
}

impl Habit {
    /// The parsed frequency, `None` when the stored text is unsupported.
    pub fn periodicity(&self) -> Option<Periodicity> {
        self.frequency.parse().ok()
    }
}

/// Result of [`Database::mark_completed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// A new completion was stored.
    Recorded,
    /// The habit already has a completion on the same calendar day.
    AlreadyCompletedToday,
    /// No habit with that id exists.
    HabitNotFound,
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(column: &'static str, value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| {
        DatabaseError::MalformedTimestamp {
            column,
            value: value.to_string(),
        }
        .into()
    })
}

type HabitRow = (i64, String, String, String, Option<String>);

fn habit_from_row((id, name, frequency, created_at, last_completed): HabitRow) -> Result<Habit> {
    if frequency.parse::<Periodicity>().is_err() {
        tracing::warn!(id, %frequency, "habit has an unsupported frequency");
    }
    Ok(Habit {
        id,
        name,
        frequency,
        created_at: parse_timestamp("created_at", &created_at)?,
        last_completed: last_completed
            .as_deref()
            .map(|v| parse_timestamp("last_completed", v))
            .transpose()?,
    })
}

fn read_habit_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HabitRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

/// SQLite database for habits and completions.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/habits.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join(DATABASE_FILE);
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Create a habit and return its id.
    ///
    /// # Errors
    /// Returns a validation error for a blank name.
    pub fn add_habit(
        &self,
        name: &str,
        periodicity: Periodicity,
        created_at: NaiveDateTime,
    ) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        self.conn.execute(
            "INSERT INTO habits (name, frequency, created_at) VALUES (?1, ?2, ?3)",
            params![name, periodicity.as_str(), format_timestamp(created_at)],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, name, %periodicity, "added habit");
        Ok(id)
    }

    /// Create a habit together with its completion history.
    ///
    /// `last_completed` is set to the latest completion.
    pub fn add_habit_with_completions(
        &self,
        name: &str,
        periodicity: Periodicity,
        created_at: NaiveDateTime,
        completions: &[NaiveDateTime],
    ) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let last_completed = completions.iter().max().copied().map(format_timestamp);

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO habits (name, frequency, created_at, last_completed) VALUES (?1, ?2, ?3, ?4)",
            params![
                name,
                periodicity.as_str(),
                format_timestamp(created_at),
                last_completed
            ],
        )?;
        let id = tx.last_insert_rowid();
        insert_completions(&tx, id, completions)?;
        tx.commit()?;

        tracing::info!(id, name, completions = completions.len(), "added habit with history");
        Ok(id)
    }

    /// Insert completion records for a habit.
    pub fn add_completions(&self, habit_id: i64, completions: &[NaiveDateTime]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        insert_completions(&tx, habit_id, completions)?;
        tx.commit()?;
        Ok(())
    }

    /// All habits, ordered by id.
    pub fn list_habits(&self) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, frequency, created_at, last_completed FROM habits ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], read_habit_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(habit_from_row).collect()
    }

    pub fn get_habit(&self, habit_id: i64) -> Result<Option<Habit>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, frequency, created_at, last_completed FROM habits WHERE id = ?1",
                params![habit_id],
                read_habit_row,
            )
            .optional()?;
        row.map(habit_from_row).transpose()
    }

    /// Completion timestamps of a habit, oldest first.
    pub fn list_completions(&self, habit_id: i64) -> Result<Vec<NaiveDateTime>> {
        let mut stmt = self.conn.prepare(
            "SELECT completed_at FROM completions WHERE habit_id = ?1 ORDER BY completed_at ASC",
        )?;
        let rows = stmt
            .query_map(params![habit_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.iter()
            .map(|v| parse_timestamp("completed_at", v))
            .collect()
    }

    pub fn completion_count(&self, habit_id: i64) -> Result<u64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM completions WHERE habit_id = ?1",
            params![habit_id],
            |row| row.get::<_, u64>(0),
        )?;
        Ok(count)
    }

    /// Delete a habit and, through the foreign key, its completions.
    ///
    /// Returns `false` if no habit had that id.
    pub fn delete_habit(&self, habit_id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?1", params![habit_id])?;
        if deleted == 0 {
            tracing::warn!(habit_id, "no habit to delete");
            return Ok(false);
        }
        tracing::info!(habit_id, "deleted habit");
        Ok(true)
    }

    /// Record a completion at `now`, at most one per calendar day.
    pub fn mark_completed(&self, habit_id: i64, now: NaiveDateTime) -> Result<CompletionOutcome> {
        if self.get_habit(habit_id)?.is_none() {
            tracing::warn!(habit_id, "cannot complete unknown habit");
            return Ok(CompletionOutcome::HabitNotFound);
        }

        let day = now.date().format("%Y-%m-%d").to_string();
        let same_day: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM completions WHERE habit_id = ?1 AND substr(completed_at, 1, 10) = ?2",
            params![habit_id, day],
            |row| row.get(0),
        )?;
        if same_day > 0 {
            tracing::info!(habit_id, %day, "habit already completed today");
            return Ok(CompletionOutcome::AlreadyCompletedToday);
        }

        let completed_at = format_timestamp(now);
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO completions (habit_id, completed_at) VALUES (?1, ?2)",
            params![habit_id, completed_at],
        )?;
        tx.execute(
            "UPDATE habits SET last_completed = ?1 WHERE id = ?2",
            params![completed_at, habit_id],
        )?;
        tx.commit()?;

        tracing::info!(habit_id, %completed_at, "recorded completion");
        Ok(CompletionOutcome::Recorded)
    }
}

fn insert_completions(
    conn: &Connection,
    habit_id: i64,
    completions: &[NaiveDateTime],
) -> rusqlite::Result<()> {
    let mut stmt =
        conn.prepare("INSERT INTO completions (habit_id, completed_at) VALUES (?1, ?2)")?;
    for &at in completions {
        stmt.execute(params![habit_id, format_timestamp(at)])?;
    }
    Ok(())
}
