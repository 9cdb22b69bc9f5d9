//! # habitrack Core Library
//!
//! This library provides the core logic for the habitrack habit tracker.
//! Every operation is available through the standalone `habitrack` CLI, which
//! is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Streak engine**: a pure function from completion timestamps,
//!   periodicity, and an injected "now" to the current streak length
//! - **Storage**: SQLite-based habit storage and TOML-based settings
//! - **Analysis**: longest streak, per-habit summaries, name search
//! - **Reminder**: a polling notification loop and its background process
//!
//! ## Key Components
//!
//! - [`calculate_streak`]: the streak algorithm
//! - [`PeriodKey`]: period bucketing per [`Periodicity`]
//! - [`Database`]: habit and completion persistence
//! - [`Settings`]: reminder configuration

pub mod analysis;
pub mod error;
pub mod example_data;
pub mod periodicity;
pub mod reminder;
pub mod storage;
pub mod streak;

pub use error::{ConfigError, CoreError, DatabaseError, ReminderError, ValidationError};
pub use example_data::ExampleData;
pub use periodicity::Periodicity;
pub use reminder::Reminder;
pub use storage::{CompletionOutcome, Database, Habit, Settings};
pub use streak::{
    calculate_streak, calculate_streak_for, Clock, FixedClock, PeriodKey, StreakCalculator,
    SystemClock,
};
