//! Background reminder process control.
//!
//! The background reminder is the CLI itself running `settings run-reminder`,
//! detached, with its PID recorded in `<data dir>/reminder.pid`. The reminder
//! removes the file itself when it exits cleanly.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{ConfigError, ReminderError, Result};
use crate::storage::data_dir;

const PID_FILE: &str = "reminder.pid";

/// Arguments that make the CLI run the reminder loop in the foreground.
pub const RUN_REMINDER_ARGS: [&str; 2] = ["settings", "run-reminder"];

pub fn pid_file() -> std::result::Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join(PID_FILE))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoppedReminder {
    pub pid: u32,
    /// False when the recorded process had already exited.
    pub was_running: bool,
}

/// PIDs outside `1..=i32::MAX` would address process groups when signalled.
fn parse_pid(contents: &str) -> std::result::Result<u32, ReminderError> {
    let trimmed = contents.trim();
    match trimmed.parse::<u32>() {
        Ok(pid) if pid > 0 && i32::try_from(pid).is_ok() => Ok(pid),
        _ => Err(ReminderError::InvalidPid(trimmed.to_string())),
    }
}

fn read_pid_file(pid_path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(pid_path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn remove_pid_file(pid_path: &Path) -> Result<()> {
    match std::fs::remove_file(pid_path) {
        Ok(()) => Ok(()),
        // The reminder may have removed it on its way out.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Fail with [`ReminderError::AlreadyRunning`] if `pid_path` names a live
/// process. A stale or unreadable PID file is removed.
pub fn ensure_not_running(pid_path: &Path) -> Result<()> {
    let Some(contents) = read_pid_file(pid_path)? else {
        return Ok(());
    };
    match parse_pid(&contents) {
        Ok(pid) => {
            if platform::is_alive(pid)? {
                return Err(ReminderError::AlreadyRunning(pid).into());
            }
            tracing::warn!(pid, "removing stale reminder PID file");
        }
        Err(e) => tracing::warn!(error = %e, "removing unreadable reminder PID file"),
    }
    remove_pid_file(pid_path)
}

/// Spawn `exe settings run-reminder` detached and record its PID.
pub fn start_background(exe: &Path, pid_path: &Path) -> Result<u32> {
    ensure_not_running(pid_path)?;
    let child = Command::new(exe)
        .args(RUN_REMINDER_ARGS)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ReminderError::Process(format!("failed to spawn {}: {e}", exe.display())))?;
    let pid = child.id();
    std::fs::write(pid_path, pid.to_string())?;
    tracing::info!(pid, pid_file = %pid_path.display(), "reminder started in background");
    Ok(pid)
}

/// Terminate the process recorded in `pid_path` and remove the file.
///
/// A recorded process that no longer exists is reported through
/// [`StoppedReminder::was_running`]. Any other signalling failure is an error
/// and leaves the PID file in place.
pub fn stop_background(pid_path: &Path) -> Result<StoppedReminder> {
    let contents = read_pid_file(pid_path)?
        .ok_or_else(|| ReminderError::NotRunning(pid_path.to_path_buf()))?;
    let pid = parse_pid(&contents)?;

    let was_running = platform::terminate(pid)?;
    if !was_running {
        tracing::warn!(pid, "no reminder process with that PID");
    }

    remove_pid_file(pid_path)?;
    Ok(StoppedReminder { pid, was_running })
}

/// Remove `pid_path` if it still records `pid`. Returns whether it was removed.
pub fn release_pid_file(pid_path: &Path, pid: u32) -> Result<bool> {
    match read_pid_file(pid_path)? {
        Some(contents) if parse_pid(&contents).ok() == Some(pid) => {
            remove_pid_file(pid_path)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

#[cfg(unix)]
mod platform {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    use crate::error::ReminderError;

    fn to_pid(pid: u32) -> Result<Pid, ReminderError> {
        i32::try_from(pid)
            .map(Pid::from_raw)
            .map_err(|_| ReminderError::InvalidPid(pid.to_string()))
    }

    /// `ESRCH` means the process is gone; every other errno is a failure.
    pub(super) fn signalled(pid: u32, result: nix::Result<()>) -> Result<bool, ReminderError> {
        match result {
            Ok(()) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            Err(errno) => Err(ReminderError::Process(format!(
                "failed to signal PID {pid}: {errno}"
            ))),
        }
    }

    pub(super) fn terminate(pid: u32) -> Result<bool, ReminderError> {
        signalled(pid, kill(to_pid(pid)?, Signal::SIGTERM))
    }

    pub(super) fn is_alive(pid: u32) -> Result<bool, ReminderError> {
        match kill(to_pid(pid)?, None::<Signal>) {
            // Exists, owned by someone else.
            Err(Errno::EPERM) => Ok(true),
            other => signalled(pid, other),
        }
    }
}

#[cfg(windows)]
mod platform {
    use std::process::{Command, Stdio};

    use crate::error::ReminderError;

    pub(super) fn terminate(pid: u32) -> Result<bool, ReminderError> {
        if !is_alive(pid)? {
            return Ok(false);
        }
        let status = Command::new("taskkill")
            .args(["/PID", &pid.to_string(), "/F"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| ReminderError::Process(format!("failed to run taskkill: {e}")))?;
        if !status.success() {
            return Err(ReminderError::Process(format!(
                "taskkill for PID {pid} exited with {status}"
            )));
        }
        Ok(true)
    }

    pub(super) fn is_alive(pid: u32) -> Result<bool, ReminderError> {
        let output = Command::new("tasklist")
            .args(["/FI", &format!("PID eq {pid}"), "/NH"])
            .output()
            .map_err(|e| ReminderError::Process(format!("failed to run tasklist: {e}")))?;
        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(listing
            .split_whitespace()
            .any(|field| field == pid.to_string()))
    }
}
