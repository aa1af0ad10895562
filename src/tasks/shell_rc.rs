//! Task that patches shell rc files.

use anyhow::Result;

use super::{Context, ProcessOpts, Task, TaskResult, process_resources};
use crate::config::settings::ShellSettings;
use crate::resources::shell_rc::{Directive, ShellRcResource};

/// Rewrite the theme and plugin lines of the shell rc file.
#[derive(Debug)]
pub struct PatchShellConfig;

fn directives(shell: &ShellSettings) -> Vec<Directive> {
    let mut out = Vec::new();
    if let Some(theme) = &shell.theme {
        out.push(Directive::theme(theme));
    }
    if !shell.plugins.is_empty() {
        out.push(Directive::plugins(&shell.plugins));
    }
    out
}

impl Task for PatchShellConfig {
    fn name(&self) -> &'static str {
        "Patch shell config"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config
            .settings
            .shell
            .as_ref()
            .is_some_and(|shell| !directives(shell).is_empty())
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(shell) = &ctx.config.settings.shell else {
            return Ok(TaskResult::Skipped("no [shell] settings".to_string()));
        };

        let resource = ShellRcResource::new(
            ctx.home().join(&shell.rc_file),
            directives(shell),
            &*ctx.executor,
        )
        .with_owner(ctx.owner());
        process_resources(
            ctx,
            std::iter::once(resource),
            &ProcessOpts::apply_all("patch"),
        )
    }
}
