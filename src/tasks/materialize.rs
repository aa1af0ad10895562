//! Task that materializes config files.

use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats};
use crate::materialize::Materializer;

/// Place every config entry into the home directory.
#[derive(Debug)]
pub struct MaterializeConfigs;

impl Task for MaterializeConfigs {
    fn name(&self) -> &'static str {
        "Materialize configs"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.entries.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        ctx.log.debug(&format!(
            "{} entries into {} ({} by default)",
            ctx.config.entries.len(),
            ctx.home().display(),
            ctx.mode
        ));

        let report = Materializer::new(&ctx.paths, ctx.mode, &*ctx.executor, &*ctx.log)
            .with_owner(ctx.owner())
            .run(&ctx.config.entries);

        let stats = TaskStats {
            changed: count(report.placed()),
            already_ok: 0,
            skipped: count(report.skipped()),
            failed: count(report.failed()),
        };
        stats.finish(ctx)
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
