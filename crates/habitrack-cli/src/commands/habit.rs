//! Habit management commands for CLI.

use clap::Subcommand;
use habitrack_core::storage::format_timestamp;
use habitrack_core::{calculate_streak_for, Clock, CompletionOutcome, Database, Periodicity, SystemClock};

use super::{parse_frequency, streak_label};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Create {
        /// Habit name (quote names containing spaces)
        #[arg(long)]
        name: String,
        /// daily, weekly, monthly or yearly
        #[arg(long, value_parser = parse_frequency)]
        frequency: Periodicity,
    },
    /// Delete a habit and its completions
    Delete {
        /// Habit ID
        #[arg(long)]
        id: i64,
    },
    /// Mark a habit completed now
    Complete {
        /// Habit ID
        #[arg(long)]
        id: i64,
    },
    /// List all habits
    View {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let clock = SystemClock;

    match action {
        HabitAction::Create { name, frequency } => {
            let id = db.add_habit(&name, frequency, clock.now())?;
            println!("Habit '{}' added with frequency {frequency} (ID {id})", name.trim());
        }
        HabitAction::Delete { id } => {
            if !db.delete_habit(id)? {
                return Err(format!("no habit with ID {id}").into());
            }
            println!("Habit ID {id} deleted");
        }
        HabitAction::Complete { id } => {
            let now = clock.now();
            match db.mark_completed(id, now)? {
                CompletionOutcome::HabitNotFound => {
                    return Err(format!("no habit with ID {id}").into());
                }
                CompletionOutcome::AlreadyCompletedToday => {
                    println!("Habit has already been completed for today");
                }
                CompletionOutcome::Recorded => {
                    let habit = db
                        .get_habit(id)?
                        .ok_or_else(|| format!("no habit with ID {id}"))?;
                    let completions = db.list_completions(id)?;
                    let streak = calculate_streak_for(&completions, &habit.frequency, now);
                    println!("Habit {} with ID {id} has been marked completed.", habit.name);
                    println!(
                        "Great work, you've kept your {} streak for '{}': {} in a row",
                        habit.frequency,
                        habit.name,
                        streak_label(streak, &habit.frequency)
                    );
                }
            }
        }
        HabitAction::View { json } => {
            let habits = db.list_habits()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&habits)?);
                return Ok(());
            }
            if habits.is_empty() {
                println!("No habits found.");
                return Ok(());
            }
            println!("Your habits:");
            for habit in habits {
                let status = match habit.last_completed {
                    Some(at) => format!("Last completed on {}", format_timestamp(at)),
                    None => "Not completed yet".to_string(),
                };
                println!(
                    "[{}] {} - {} - Created on {} - {status}",
                    habit.id,
                    habit.name,
                    habit.frequency,
                    format_timestamp(habit.created_at)
                );
            }
        }
    }
    Ok(())
}
