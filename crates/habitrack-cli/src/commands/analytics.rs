//! Streak analytics commands for CLI.

use clap::Subcommand;
use habitrack_core::analysis::{self, ChartRow, NameMatch};
use habitrack_core::{Clock, Database, Periodicity, SystemClock};

use super::{parse_frequency, streak_label};

const CHART_WIDTH: u64 = 40;

#[derive(Subcommand)]
pub enum AnalyticsAction {
    /// Habit with the longest current streak
    LongestStreak {
        #[arg(long)]
        json: bool,
    },
    /// Current streak of a habit found by (partial) name
    Streak {
        /// Name or part of it, case-insensitive
        #[arg(long)]
        name: String,
    },
    /// Chart completions against current streaks
    Plot,
    /// Table of every habit with streak and completion count
    Summary {
        #[arg(long)]
        json: bool,
    },
    /// Habits with the given frequency
    Filter {
        #[arg(long, value_parser = parse_frequency)]
        frequency: Periodicity,
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: AnalyticsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let now = SystemClock.now();

    match action {
        AnalyticsAction::LongestStreak { json } => {
            let best = analysis::longest_streak(&db, now)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&best)?);
                return Ok(());
            }
            match best {
                Some(best) => println!(
                    "Longest streak: {} with {}",
                    best.name,
                    streak_label(best.streak, &best.frequency)
                ),
                None => println!("No habits with streak data found!"),
            }
        }
        AnalyticsAction::Streak { name } => match analysis::find_habits_by_name(&db, &name)? {
            NameMatch::NotFound => return Err(format!("habit '{name}' not found").into()),
            NameMatch::Unique(habit) => {
                let streak = analysis::habit_streak(&db, &habit, now)?;
                println!(
                    "{} has a {} streak.",
                    habit.name,
                    streak_label(streak, &habit.frequency)
                );
            }
            NameMatch::Ambiguous(habits) => {
                println!("Multiple habits found matching '{name}':");
                for habit in habits {
                    println!("  {} (ID: {}, Frequency: {})", habit.name, habit.id, habit.frequency);
                }
                println!("Please be more specific or use the habit ID.");
            }
        },
        AnalyticsAction::Plot => {
            let rows = analysis::completion_chart(&db, now)?;
            if rows.is_empty() {
                println!("No habits data is available.");
            } else {
                print!("{}", render_chart(&rows));
            }
        }
        AnalyticsAction::Summary { json } => {
            let rows = analysis::summary(&db, now)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }
            if rows.is_empty() {
                println!("No habits found!");
                return Ok(());
            }
            let name_width = rows.iter().map(|r| display_width(&r.name)).max().unwrap_or(0).max(10);
            println!(
                "{:>4}  {:<name_width$}  {:<9}  {:>6}  {:>11}",
                "ID", "Habit Name", "Frequency", "Streak", "Completions"
            );
            for row in rows {
                println!(
                    "{:>4}  {:<name_width$}  {:<9}  {:>6}  {:>11}",
                    row.id,
                    row.name,
                    row.frequency,
                    row.streak,
                    row.completions
                );
            }
        }
        AnalyticsAction::Filter { frequency, json } => {
            let habits = analysis::habits_by_frequency(&db, frequency)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&habits)?);
                return Ok(());
            }
            if habits.is_empty() {
                println!("No habits found with frequency {frequency}");
                return Ok(());
            }
            println!("Habits with frequency {frequency}:");
            for habit in habits {
                println!("{:>4}  {}", habit.id, habit.name);
            }
        }
    }
    Ok(())
}

/// Column width of `text` as counted by `format!` padding.
fn display_width(text: &str) -> usize {
    text.chars().count()
}

/// Horizontal bars for completions (`#`) and current streak (`=`), scaled to
/// the largest value.
fn render_chart(rows: &[ChartRow]) -> String {
    let max = rows
        .iter()
        .map(|r| r.completions.max(u64::from(r.streak)))
        .max()
        .unwrap_or(0)
        .max(1);
    let name_width = rows.iter().map(|r| display_width(&r.name)).max().unwrap_or(0);
    let bar = |value: u64, fill: char| -> String {
        let len = (value * CHART_WIDTH).div_ceil(max) as usize;
        fill.to_string().repeat(len)
    };

    let mut out = String::from("Habits completion vs current streak\n");
    for row in rows {
        out.push_str(&format!(
            "{:<name_width$}  completions |{} {}\n",
            row.name,
            bar(row.completions, '#'),
            row.completions
        ));
        out.push_str(&format!(
            "{:<name_width$}  streak      |{} {}\n",
            "",
            bar(u64::from(row.streak), '='),
            row.streak
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_scales_to_largest_value() {
        let rows = vec![
            ChartRow {
                name: "Walk".into(),
                completions: 20,
                streak: 10,
            },
            ChartRow {
                name: "Read".into(),
                completions: 0,
                streak: 0,
            },
        ];
        let chart = render_chart(&rows);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].ends_with(&format!("|{} 20", "#".repeat(40))));
        assert!(lines[2].ends_with(&format!("|{} 10", "=".repeat(20))));
        assert!(lines[3].ends_with("| 0"));
    }

    #[test]
    fn chart_aligns_non_ascii_names() {
        let rows = vec![
            ChartRow {
                name: "Café visit".into(),
                completions: 3,
                streak: 1,
            },
            ChartRow {
                name: "Jog".into(),
                completions: 1,
                streak: 1,
            },
        ];
        let chart = render_chart(&rows);
        let bar_columns: Vec<usize> = chart
            .lines()
            .skip(1)
            .map(|line| line.chars().position(|c| c == '|').unwrap())
            .collect();
        assert_eq!(bar_columns.len(), 4);
        assert!(bar_columns.iter().all(|&col| col == bar_columns[0]));
        assert_eq!(bar_columns[0], "Café visit  completions ".chars().count());
    }
}
