//! The concrete [`Log`]: emits tracing events and keeps the task ledger the
//! run summary is printed from.
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::subscriber::STAGE_TARGET;
use super::types::{Log, TaskEntry, TaskStatus};
use super::utils::log_file_path;

/// Tracing-backed logger that also collects one [`TaskEntry`] per task.
///
/// Messages become tracing events; where they end up (terminal, run log) is
/// decided by the subscriber installed with
/// [`init_subscriber`](super::init_subscriber).
#[derive(Debug)]
pub struct Logger {
    ledger: Mutex<Vec<TaskEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Logger whose summary points at the run log of `command`.
    ///
    /// Does not create the file; the subscriber's file layer does.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_file(log_file_path(command))
    }

    /// Logger with no run log to point at.
    #[must_use]
    pub fn detached() -> Self {
        Self::with_log_file(None)
    }

    pub(super) const fn with_log_file(log_file: Option<PathBuf>) -> Self {
        Self {
            ledger: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Path of the run log, if one was resolved.
    #[must_use]
    pub fn log_path(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Snapshot of the recorded tasks, in recording order.
    #[must_use]
    pub fn task_entries(&self) -> Vec<TaskEntry> {
        self.ledger.lock().map_or_else(|_| Vec::new(), |g| g.clone())
    }

    /// Tasks recorded as [`TaskStatus::Failed`]. Aborted tasks are not
    /// counted; the error that aborted them is reported on its own.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.count(TaskStatus::Failed)
    }

    fn count(&self, status: TaskStatus) -> usize {
        self.ledger
            .lock()
            .map_or(0, |g| g.iter().filter(|t| t.status == status).count())
    }

    /// Error line.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Warning line.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Section header.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Progress line.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Detail line; reaches the console only with `--verbose`, the run log
    /// always.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Append a task outcome to the ledger.
    pub fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut ledger) = self.ledger.lock() {
            ledger.push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Print one line per recorded task, a totals line, and the log path.
    #[allow(clippy::print_stdout)]
    pub fn print_summary(&self) {
        let entries = self.task_entries();
        if entries.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");
        for entry in &entries {
            self.info(&format!("{}{}\x1b[0m", entry.status.color(), entry.line()));
        }

        let totals: Vec<String> = TaskStatus::ALL
            .iter()
            .map(|&status| {
                format!(
                    "{}{} {}\x1b[0m",
                    status.color(),
                    self.count(status),
                    status.label()
                )
            })
            .collect();
        println!();
        self.info(&format!("{} tasks: {}", entries.len(), totals.join(", ")));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        self.stage(msg);
    }

    fn info(&self, msg: &str) {
        self.info(msg);
    }

    fn debug(&self, msg: &str) {
        self.debug(msg);
    }

    fn warn(&self, msg: &str) {
        self.warn(msg);
    }

    fn error(&self, msg: &str) {
        self.error(msg);
    }

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.record_task(name, status, message);
    }
}
