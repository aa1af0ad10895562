//! Task that configures the default login shell.

use anyhow::Result;

use super::{Context, ProcessOpts, Task, TaskResult, process_resources};
use crate::resources::shell::DefaultShellResource;

/// Make the configured shell the login shell of the target user.
#[derive(Debug)]
pub struct ConfigureShell;

impl Task for ConfigureShell {
    fn name(&self) -> &'static str {
        "Configure default shell"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        // chsh prompts for a password in CI
        let is_ci = std::env::var("CI").is_ok();
        ctx.config
            .settings
            .shell
            .as_ref()
            .is_some_and(|shell| ctx.executor.which(&shell.program))
            && !is_ci
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(shell) = &ctx.config.settings.shell else {
            return Ok(TaskResult::Skipped("no [shell] settings".to_string()));
        };
        let resource =
            DefaultShellResource::new(shell.program.clone(), ctx.owner(), &*ctx.executor);
        process_resources(
            ctx,
            std::iter::once(resource),
            &ProcessOpts::apply_all("configure"),
        )
    }
}
