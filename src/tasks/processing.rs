use anyhow::Result;

use super::context::Context;
use crate::resources::{Resource, ResourceChange, ResourceState};

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use homestead::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let skipped = TaskResult::Skipped("zsh not found".into());
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// ```
#[derive(Debug, Clone)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task was skipped at run time.
    Skipped(String),
}

/// Counters for batch tasks that process many items.
///
/// # Examples
///
/// ```
/// use homestead::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 1, already_ok: 2, skipped: 0, failed: 3 };
/// assert_eq!(stats.summary(), "1 changed, 2 already ok, 3 failed");
/// ```
#[derive(Debug, Default)]
pub struct TaskStats {
    /// Number of items changed or applied.
    pub changed: u32,
    /// Number of items already in the correct state.
    pub already_ok: u32,
    /// Number of items skipped as not applicable.
    pub skipped: u32,
    /// Number of items whose apply failed.
    pub failed: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok, 1 skipped").
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = format!("{} changed, {} already ok", self.changed, self.already_ok);
        if self.skipped > 0 {
            out.push_str(&format!(", {} skipped", self.skipped));
        }
        if self.failed > 0 {
            out.push_str(&format!(", {} failed", self.failed));
        }
        out
    }

    /// Log the summary and turn the counters into a task outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if any item failed.
    pub fn finish(self, ctx: &Context) -> Result<TaskResult> {
        ctx.log.info(&self.summary());
        if self.failed > 0 {
            anyhow::bail!("{} item(s) failed", self.failed);
        }
        Ok(TaskResult::Ok)
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Configuration for the generic resource processing loop.
///
/// # Examples
///
/// ```
/// use homestead::tasks::ProcessOpts;
///
/// assert!(ProcessOpts::apply_all("patch").fix_incorrect);
/// assert!(!ProcessOpts::install_missing("clone").fix_incorrect);
/// ```
#[derive(Debug)]
pub struct ProcessOpts<'a> {
    /// Verb for log messages (e.g., "install", "clone", "patch").
    pub verb: &'a str,
    /// Treat `Incorrect` as fixable (apply the change). If `false`, skip it.
    pub fix_incorrect: bool,
}

impl<'a> ProcessOpts<'a> {
    /// Fix both missing and incorrect resources.
    #[must_use]
    pub const fn apply_all(verb: &'a str) -> Self {
        Self {
            verb,
            fix_incorrect: true,
        }
    }

    /// Only create missing resources; leave incorrect ones alone.
    #[must_use]
    pub const fn install_missing(verb: &'a str) -> Self {
        Self {
            verb,
            fix_incorrect: false,
        }
    }
}

/// Process resources by checking each one's current state and applying as needed.
///
/// # Errors
///
/// Returns an error if a state check fails, or once every resource has been
/// tried when any of them failed to apply.
pub fn process_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    opts: &ProcessOpts,
) -> Result<TaskResult> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let current = resource.current_state()?;
        stats += process_single(ctx, &resource, current, opts);
    }
    stats.finish(ctx)
}

/// Process a single resource given its current state, returning a stats delta.
fn process_single<R: Resource>(
    ctx: &Context,
    resource: &R,
    resource_state: ResourceState,
    opts: &ProcessOpts,
) -> TaskStats {
    let desc = resource.description();
    let mut delta = TaskStats::new();
    match resource_state {
        ResourceState::Correct => {
            ctx.log.debug(&format!("ok: {desc}"));
            delta.already_ok += 1;
        }
        ResourceState::Invalid { reason } => {
            ctx.log.warn(&format!("skipping {desc}: {reason}"));
            delta.skipped += 1;
        }
        ResourceState::Incorrect { current } if !opts.fix_incorrect => {
            ctx.log
                .debug(&format!("leaving {desc} as is (currently {current})"));
            delta.skipped += 1;
        }
        ResourceState::Missing | ResourceState::Incorrect { .. } => {
            delta += apply_resource(ctx, resource, opts);
        }
    }
    delta
}

/// Apply a single resource change, returning a stats delta.
fn apply_resource<R: Resource>(ctx: &Context, resource: &R, opts: &ProcessOpts) -> TaskStats {
    let desc = resource.description();
    let mut delta = TaskStats::new();
    match resource.apply() {
        Ok(ResourceChange::Applied) => {
            ctx.log.info(&format!("{}: {desc}", opts.verb));
            delta.changed += 1;
        }
        Ok(ResourceChange::AlreadyCorrect) => delta.already_ok += 1,
        Ok(ResourceChange::Skipped { reason }) => {
            ctx.log.warn(&format!("skipped {desc}: {reason}"));
            delta.skipped += 1;
        }
        Err(e) => {
            ctx.log
                .error(&format!("failed to {} {desc}: {e:#}", opts.verb));
            delta.failed += 1;
        }
    }
    delta
}
