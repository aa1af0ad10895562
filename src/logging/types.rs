//! Task outcome records and the [`Log`] trait tasks report through.

/// One line of the run summary.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Task name as shown in the pipeline.
    pub name: String,
    /// How the task ended.
    pub status: TaskStatus,
    /// Skip reason, error chain or other detail.
    pub message: Option<String>,
}

impl TaskEntry {
    /// Render the entry as `<icon> <name> (<message>)`, without colour.
    #[must_use]
    pub fn line(&self) -> String {
        self.message.as_deref().map_or_else(
            || format!("{} {}", self.status.icon(), self.name),
            |detail| format!("{} {} ({detail})", self.status.icon(), self.name),
        )
    }
}

/// Final state of a pipeline task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Ran and converged.
    Ok,
    /// Nothing configured for this host.
    NotApplicable,
    /// Filtered out, or declined to run (e.g. under CI).
    Skipped,
    /// Ran and reported an error.
    Failed,
    /// Never started: an earlier task hit an unmet precondition.
    Aborted,
}

impl TaskStatus {
    /// Every status, in summary order.
    pub const ALL: [Self; 5] = [
        Self::Ok,
        Self::NotApplicable,
        Self::Skipped,
        Self::Failed,
        Self::Aborted,
    ];

    /// Single-glyph marker used in the summary.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Ok => "✓",
            Self::NotApplicable => "·",
            Self::Skipped => "○",
            Self::Failed => "✗",
            Self::Aborted => "!",
        }
    }

    /// Word used in the summary totals line.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotApplicable => "n/a",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        }
    }

    /// SGR escape the console paints this status with.
    pub(super) const fn color(self) -> &'static str {
        match self {
            Self::Ok => "\x1b[32m",
            Self::NotApplicable => "\x1b[2m",
            Self::Skipped => "\x1b[33m",
            Self::Failed => "\x1b[31m",
            Self::Aborted => "\x1b[35m",
        }
    }
}

/// Sink for progress messages and task results.
///
/// Tasks and the materializer log through this trait rather than a concrete
/// logger.
pub trait Log: Send + Sync {
    /// Section header.
    fn stage(&self, msg: &str);
    /// Normal progress line.
    fn info(&self, msg: &str);
    /// Detail line; console shows it only with `--verbose`.
    fn debug(&self, msg: &str);
    /// Recoverable problem.
    fn warn(&self, msg: &str);
    /// Failure.
    fn error(&self, msg: &str);
    /// Record how a task ended.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}
