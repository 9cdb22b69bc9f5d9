use clap::Subcommand;
use habitrack_core::reminder::{default_notifier, process};
use habitrack_core::{Reminder, Settings, SystemClock};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Set the daily notification time
    SetTime {
        /// 24-hour time, HH:MM
        #[arg(long)]
        time: String,
    },
    /// Set how often the reminder fires
    SetFrequency {
        /// daily, weekly, monthly or yearly
        #[arg(long)]
        frequency: String,
    },
    /// Print current settings as JSON
    Show,
    /// Start the reminder in the background
    StartReminder,
    /// Stop the background reminder
    StopReminder,
    /// Run the reminder loop in the foreground (used by start-reminder)
    #[command(hide = true)]
    RunReminder,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SettingsAction::SetTime { time } => {
            let mut settings = Settings::load()?;
            settings.set_notification_time(&time)?;
            settings.save()?;
            println!("Notification time is set to {}.", settings.notification_time);
        }
        SettingsAction::SetFrequency { frequency } => {
            let mut settings = Settings::load()?;
            settings.set_reminder_frequency(&frequency)?;
            settings.save()?;
            println!("Reminder frequency is set to {}.", settings.reminder_frequency);
        }
        SettingsAction::Show => {
            let settings = Settings::load()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::StartReminder => {
            let pid_path = process::pid_file()?;
            let exe = std::env::current_exe()?;
            tracing::debug!(exe = %exe.display(), pid_file = %pid_path.display(), "spawning reminder");
            let pid = process::start_background(&exe, &pid_path)?;
            println!("Reminder started in background with PID {pid}.");
        }
        SettingsAction::StopReminder => {
            let stopped = process::stop_background(&process::pid_file()?)?;
            if stopped.was_running {
                println!("Reminder process {} stopped.", stopped.pid);
            } else {
                println!("No process with PID {} found, removed stale PID file.", stopped.pid);
            }
        }
        SettingsAction::RunReminder => {
            let settings = Settings::load_or_default();
            let reminder = Reminder::from_settings(&settings)?;
            tracing::debug!(?settings, "running reminder in foreground");
            // stop-reminder sends SIGTERM; either signal ends the loop.
            let shutdown = Arc::new(AtomicBool::new(false));
            flag::register(SIGTERM, Arc::clone(&shutdown))?;
            flag::register(SIGINT, Arc::clone(&shutdown))?;
            reminder.run(&SystemClock, &default_notifier(), &shutdown);

            let pid_path = process::pid_file()?;
            if process::release_pid_file(&pid_path, std::process::id())? {
                tracing::debug!(pid_file = %pid_path.display(), "removed reminder PID file");
            }
        }
    }
    Ok(())
}
