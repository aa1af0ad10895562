//! Task that installs fonts.

use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::error::BootstrapError;
use crate::resources::font::{check_preconditions, install_fonts};

/// Install the repository's fonts into the system font directory.
#[derive(Debug)]
pub struct InstallFonts;

impl Task for InstallFonts {
    fn name(&self) -> &'static str {
        "Install fonts"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.settings.fonts.is_some()
    }

    fn preflight(&self, ctx: &Context) -> Result<()> {
        if let Some(fonts) = &ctx.config.settings.fonts {
            check_preconditions(&ctx.root().join(&fonts.source), &ctx.identity)
                .map_err(BootstrapError::from)?;
        }
        Ok(())
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(fonts) = &ctx.config.settings.fonts else {
            return Ok(TaskResult::Skipped("no [fonts] settings".to_string()));
        };
        let source = ctx.root().join(&fonts.source);

        let report = install_fonts(&source, &fonts.target, &ctx.identity, &*ctx.executor)
            .map_err(BootstrapError::from)?;

        for path in &report.installed {
            ctx.log.debug(&format!("installed {}", path.display()));
        }
        ctx.log.info(&format!(
            "{} font(s) installed into {}",
            report.installed.len(),
            report.fonts_dir.display()
        ));
        Ok(TaskResult::Ok)
    }
}
