//! Named, ordered tasks that orchestrate resource changes.
pub mod context;
pub mod fonts;
pub mod materialize;
pub mod packages;
mod processing;
pub mod shell;
pub mod shell_extensions;
pub mod shell_rc;

pub use context::Context;
pub use processing::{ProcessOpts, TaskResult, TaskStats, process_resources};

use anyhow::Result;

use crate::error;
use crate::logging::TaskStatus;

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task applies to the loaded configuration and system.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Check the task's hard preconditions without side effects.
    ///
    /// Called for every selected, applicable task before any task runs.
    ///
    /// # Errors
    ///
    /// Returns the unmet precondition.
    fn preflight(&self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task fails to execute, such as when system commands
    /// fail, file operations are not permitted, or a hard precondition is unmet.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The complete pipeline, in execution order.
#[must_use]
pub fn all_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(fonts::InstallFonts),
        Box::new(packages::InstallPackages),
        Box::new(materialize::MaterializeConfigs),
        Box::new(shell_extensions::InstallShellExtensions),
        Box::new(shell_rc::PatchShellConfig),
        Box::new(shell::ConfigureShell),
    ]
}

/// Execute a task, recording the result in the logger.
///
/// Ordinary failures are recorded and swallowed so the pipeline continues.
///
/// # Errors
///
/// Returns the task's error when it is a hard precondition failure
/// (see [`error::is_hard`]); the caller must stop the pipeline.
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<()> {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return Ok(());
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            if error::is_hard(&e) {
                return Err(e);
            }
        }
    }
    Ok(())
}
