//! Period keying.
//!
//! Collapses a timestamp into the identity of the period it falls in, so that
//! two completions compare equal exactly when they credit the same period.
//! Keys are timezone-naive: they operate on local calendar dates only.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use std::fmt;

use crate::periodicity::Periodicity;

/// Canonical identifier of one period.
///
/// One variant per [`Periodicity`]. Keys of different variants never compare
/// equal, so a set of keys built for one periodicity is never polluted by
/// another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PeriodKey {
    /// A calendar date.
    Day { date: NaiveDate },
    /// The Monday that starts an ISO week.
    Week { monday: NaiveDate },
    /// A calendar month.
    Month { year: i32, month: u32 },
    /// A calendar year.
    Year { year: i32 },
}

impl PeriodKey {
    /// Key of the period containing `at`.
    pub fn of(periodicity: Periodicity, at: NaiveDateTime) -> Self {
        Self::of_date(periodicity, at.date())
    }

    /// Key of the period containing `date`.
    fn of_date(periodicity: Periodicity, date: NaiveDate) -> Self {
        match periodicity {
            Periodicity::Daily => PeriodKey::Day { date },
            Periodicity::Weekly => {
                let offset = u64::from(date.weekday().num_days_from_monday());
                // Only the first days of chrono's range lack a preceding Monday.
                let monday = date.checked_sub_days(Days::new(offset)).unwrap_or(date);
                PeriodKey::Week { monday }
            }
            Periodicity::Monthly => PeriodKey::Month {
                year: date.year(),
                month: date.month(),
            },
            Periodicity::Yearly => PeriodKey::Year { year: date.year() },
        }
    }

    /// The period immediately before this one.
    ///
    /// Returns `None` only when the result would fall outside the calendar
    /// range chrono can represent.
    pub fn predecessor(&self) -> Option<Self> {
        match *self {
            PeriodKey::Day { date } => date.pred_opt().map(|date| PeriodKey::Day { date }),
            PeriodKey::Week { monday } => monday
                .checked_sub_days(Days::new(7))
                .map(|monday| PeriodKey::Week { monday }),
            PeriodKey::Month { year, month } => {
                if month == 1 {
                    year.checked_sub(1)
                        .map(|year| PeriodKey::Month { year, month: 12 })
                } else {
                    Some(PeriodKey::Month {
                        year,
                        month: month - 1,
                    })
                }
            }
            PeriodKey::Year { year } => year.checked_sub(1).map(|year| PeriodKey::Year { year }),
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Day { date } => write!(f, "{}", date.format("%Y-%m-%d")),
            PeriodKey::Week { monday } => {
                let iso = monday.iso_week();
                write!(f, "{}-W{:02}", iso.year(), iso.week())
            }
            PeriodKey::Month { year, month } => write!(f, "{year:04}-{month:02}"),
            PeriodKey::Year { year } => write!(f, "{year:04}"),
        }
    }
}
