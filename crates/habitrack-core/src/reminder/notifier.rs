//! Notification delivery backends.

use std::process::Command;

use crate::error::ReminderError;

/// Something that can show a reminder to the user.
pub trait Notifier {
    /// Short backend name for logs and errors.
    fn name(&self) -> &'static str;

    /// Deliver one notification.
    fn send(&self, title: &str, message: &str) -> Result<(), ReminderError>;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn send(&self, title: &str, message: &str) -> Result<(), ReminderError> {
        (**self).send(title, message)
    }
}

/// Desktop notification through the platform's command-line tool.
///
/// `notify-send` on Linux and other Unixes, `osascript` on macOS, `msg` on
/// Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    fn command(title: &str, message: &str) -> Command {
        if cfg!(target_os = "macos") {
            let script = format!(
                "display notification \"{}\" with title \"{}\"",
                escape_applescript(message),
                escape_applescript(title)
            );
            let mut cmd = Command::new("osascript");
            cmd.arg("-e").arg(script);
            cmd
        } else if cfg!(windows) {
            let mut cmd = Command::new("msg");
            cmd.arg("*").arg(format!("{title}: {message}"));
            cmd
        } else {
            let mut cmd = Command::new("notify-send");
            cmd.arg(title).arg(message);
            cmd
        }
    }
}

fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Notifier for DesktopNotifier {
    fn name(&self) -> &'static str {
        "desktop"
    }

    fn send(&self, title: &str, message: &str) -> Result<(), ReminderError> {
        let failed = |message: String| ReminderError::DeliveryFailed {
            backend: self.name().to_string(),
            message,
        };
        let status = Self::command(title, message)
            .status()
            .map_err(|e| failed(e.to_string()))?;
        if !status.success() {
            return Err(failed(format!("notifier exited with {status}")));
        }
        Ok(())
    }
}

/// Writes the notification to the log. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    fn send(&self, title: &str, message: &str) -> Result<(), ReminderError> {
        tracing::info!(title, message, "reminder");
        Ok(())
    }
}

/// Tries `primary` and falls back to `fallback` when it fails.
#[derive(Debug, Clone, Default)]
pub struct FallbackNotifier<P, F> {
    primary: P,
    fallback: F,
}

impl<P: Notifier, F: Notifier> FallbackNotifier<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: Notifier, F: Notifier> Notifier for FallbackNotifier<P, F> {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    fn send(&self, title: &str, message: &str) -> Result<(), ReminderError> {
        match self.primary.send(title, message) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback = self.fallback.name(),
                    "notification failed, using fallback"
                );
                self.fallback.send(title, message)
            }
        }
    }
}

/// The notifier the reminder service uses by default.
pub fn default_notifier() -> FallbackNotifier<DesktopNotifier, LogNotifier> {
    FallbackNotifier::new(DesktopNotifier, LogNotifier)
}
