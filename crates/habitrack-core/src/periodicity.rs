//! Habit cadence.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// How often a habit is expected to be completed.
///
/// Chosen when the habit is created and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Periodicity {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Periodicity {
    pub const ALL: [Periodicity; 4] = [
        Periodicity::Daily,
        Periodicity::Weekly,
        Periodicity::Monthly,
        Periodicity::Yearly,
    ];

    /// Stored text form (`daily`, `weekly`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Periodicity::Daily => "daily",
            Periodicity::Weekly => "weekly",
            Periodicity::Monthly => "monthly",
            Periodicity::Yearly => "yearly",
        }
    }

    /// Singular unit used when rendering a streak ("3 days in a row").
    pub fn unit(&self) -> &'static str {
        match self {
            Periodicity::Daily => "day",
            Periodicity::Weekly => "week",
            Periodicity::Monthly => "month",
            Periodicity::Yearly => "year",
        }
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Periodicity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Periodicity::Daily),
            "weekly" => Ok(Periodicity::Weekly),
            "monthly" => Ok(Periodicity::Monthly),
            "yearly" => Ok(Periodicity::Yearly),
            other => Err(ValidationError::InvalidValue {
                field: "frequency".to_string(),
                message: format!(
                    "unsupported frequency '{other}', expected one of daily, weekly, monthly, yearly"
                ),
            }),
        }
    }
}
