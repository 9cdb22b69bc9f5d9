//! Reminder service.
//!
//! Fires one notification per reminder period at the configured time of day.
//! The loop is blocking and meant to run in its own process, started and
//! stopped through [`process`].

mod notifier;
pub mod process;

pub use notifier::{default_notifier, DesktopNotifier, FallbackNotifier, LogNotifier, Notifier};

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::ConfigError;
use crate::periodicity::Periodicity;
use crate::storage::Settings;
use crate::streak::{Clock, PeriodKey};

pub const REMINDER_TITLE: &str = "Habit Reminder";
pub const REMINDER_MESSAGE: &str = "Don't forget to log habits today!";

/// Decides when a reminder is due and drives the polling loop.
#[derive(Debug, Clone)]
pub struct Reminder {
    notification_time: NaiveTime,
    frequency: Periodicity,
    /// Sleep between checks while nothing is due.
    pub poll_interval: Duration,
    /// Sleep after a notification, long enough to leave the matching minute.
    pub cooldown: Duration,
}

impl Reminder {
    pub fn new(notification_time: NaiveTime, frequency: Periodicity) -> Self {
        Self {
            notification_time,
            frequency,
            poll_interval: Duration::from_secs(10),
            cooldown: Duration::from_secs(61),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self::new(
            settings.notification_time()?,
            settings.reminder_frequency,
        ))
    }

    /// True when `now` is in the notification minute and no reminder has been
    /// sent yet in `now`'s reminder period.
    pub fn is_due(&self, now: NaiveDateTime, last_notified: Option<NaiveDateTime>) -> bool {
        let time = now.time();
        if time.hour() != self.notification_time.hour()
            || time.minute() != self.notification_time.minute()
        {
            return false;
        }
        match last_notified {
            None => true,
            Some(last) => {
                PeriodKey::of(self.frequency, last) != PeriodKey::of(self.frequency, now)
            }
        }
    }

    /// Poll `clock` until `shutdown` is set, notifying whenever a reminder is due.
    ///
    /// Delivery errors are logged and do not stop the loop.
    pub fn run<C: Clock, N: Notifier>(&self, clock: &C, notifier: &N, shutdown: &AtomicBool) {
        tracing::info!(
            time = %self.notification_time.format("%H:%M"),
            frequency = %self.frequency,
            "reminder service started"
        );
        let mut last_notified = None;
        while !shutdown.load(Ordering::Relaxed) {
            let now = clock.now();
            if self.is_due(now, last_notified) {
                match notifier.send(REMINDER_TITLE, REMINDER_MESSAGE) {
                    Ok(()) => tracing::info!(backend = notifier.name(), "notification sent"),
                    Err(e) => tracing::error!(error = %e, "failed to send notification"),
                }
                last_notified = Some(now);
                sleep_unless_shutdown(self.cooldown, shutdown);
            } else {
                sleep_unless_shutdown(self.poll_interval, shutdown);
            }
        }
        tracing::info!("reminder service stopped");
    }
}

/// Sleep for `total`, waking early once `shutdown` is set.
fn sleep_unless_shutdown(total: Duration, shutdown: &AtomicBool) {
    let step = Duration::from_millis(200);
    let deadline = Instant::now() + total;
    while !shutdown.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::sleep(step.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReminderError;
    use crate::streak::FixedClock;
    use chrono::NaiveDate;
    use std::sync::atomic::AtomicU32;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 5)
            .unwrap()
    }

    fn eight() -> NaiveTime {
        NaiveTime::from_hms_opt(8, 0, 0).unwrap()
    }

    #[test]
    fn due_only_in_the_notification_minute() {
        let reminder = Reminder::new(eight(), Periodicity::Daily);
        assert!(reminder.is_due(at(2024, 6, 15, 8, 0), None));
        assert!(!reminder.is_due(at(2024, 6, 15, 8, 1), None));
        assert!(!reminder.is_due(at(2024, 6, 15, 20, 0), None));
    }

    #[test]
    fn daily_reminder_fires_once_per_day() {
        let reminder = Reminder::new(eight(), Periodicity::Daily);
        let first = at(2024, 6, 15, 8, 0);
        assert!(!reminder.is_due(at(2024, 6, 15, 8, 0), Some(first)));
        assert!(reminder.is_due(at(2024, 6, 16, 8, 0), Some(first)));
    }

    #[test]
    fn weekly_reminder_waits_for_next_week() {
        let reminder = Reminder::new(eight(), Periodicity::Weekly);
        // 2024-06-10 is a Monday.
        let first = at(2024, 6, 10, 8, 0);
        assert!(!reminder.is_due(at(2024, 6, 12, 8, 0), Some(first)));
        assert!(reminder.is_due(at(2024, 6, 17, 8, 0), Some(first)));
    }

    #[test]
    fn from_settings_reads_time_and_frequency() {
        let mut settings = Settings::default();
        settings.set_notification_time("21:30").unwrap();
        settings.set_reminder_frequency("monthly").unwrap();
        let reminder = Reminder::from_settings(&settings).unwrap();
        assert!(reminder.is_due(at(2024, 6, 15, 21, 30), None));
        assert!(!reminder.is_due(at(2024, 6, 20, 21, 30), Some(at(2024, 6, 15, 21, 30))));
    }

    /// Counts sends and asks the loop to stop after the first one.
    struct StopAfterFirst<'a> {
        sent: AtomicU32,
        shutdown: &'a AtomicBool,
    }

    impl Notifier for StopAfterFirst<'_> {
        fn name(&self) -> &'static str {
            "test"
        }

        fn send(&self, _title: &str, _message: &str) -> Result<(), ReminderError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            self.shutdown.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn run_notifies_and_stops_on_shutdown() {
        let shutdown = AtomicBool::new(false);
        let notifier = StopAfterFirst {
            sent: AtomicU32::new(0),
            shutdown: &shutdown,
        };
        let mut reminder = Reminder::new(eight(), Periodicity::Daily);
        reminder.poll_interval = Duration::from_millis(1);
        reminder.cooldown = Duration::from_secs(3600);

        reminder.run(&FixedClock(at(2024, 6, 15, 8, 0)), &notifier, &shutdown);

        assert_eq!(notifier.sent.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn run_returns_immediately_when_already_shut_down() {
        let shutdown = AtomicBool::new(true);
        let notifier = StopAfterFirst {
            sent: AtomicU32::new(0),
            shutdown: &shutdown,
        };
        let reminder = Reminder::new(eight(), Periodicity::Daily);
        reminder.run(&FixedClock(at(2024, 6, 15, 8, 0)), &notifier, &shutdown);
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 0);
    }
}
