//! Task that installs shell extension checkouts.

use anyhow::Result;

use super::{Context, ProcessOpts, Task, TaskResult, process_resources};
use crate::resources::git_checkout::GitCheckoutResource;

/// Clone the shell framework, theme and plugin repositories into the home.
#[derive(Debug)]
pub struct InstallShellExtensions;

impl Task for InstallShellExtensions {
    fn name(&self) -> &'static str {
        "Install shell extensions"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config
            .settings
            .shell
            .as_ref()
            .is_some_and(|shell| !shell.checkouts.is_empty())
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(shell) = &ctx.config.settings.shell else {
            return Ok(TaskResult::Skipped("no [shell] settings".to_string()));
        };

        let resources = shell.checkouts.iter().map(|checkout| {
            GitCheckoutResource::new(
                checkout.url.clone(),
                ctx.home().join(&checkout.destination),
                &*ctx.executor,
            )
            .with_owner(ctx.owner())
        });
        process_resources(ctx, resources, &ProcessOpts::install_missing("clone"))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::settings::{Checkout, ShellSettings};
    use crate::exec::test_helpers::MockExecutor;
    use crate::tasks::test_helpers::{empty_config, make_context, user_identity};
    use std::path::Path;
    use std::sync::Arc;

    fn upstream(dir: &Path) -> String {
        let repo = git2::Repository::init(dir).unwrap();
        std::fs::write(dir.join("theme.zsh"), "# theme\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("theme.zsh")).unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = git2::Signature::now("test", "test@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
            .unwrap();
        dir.display().to_string()
    }

    fn config_with(checkouts: Vec<Checkout>) -> crate::config::Config {
        let mut config = empty_config("/tmp".into());
        config.settings.shell = Some(ShellSettings {
            checkouts,
            ..ShellSettings::default()
        });
        config
    }

    #[test]
    fn should_run_needs_checkouts() {
        let ctx = make_context(
            config_with(vec![]),
            user_identity("/home/test".into()),
            Arc::new(MockExecutor::new()),
        );
        assert!(!InstallShellExtensions.should_run(&ctx));
    }

    #[test]
    fn clones_missing_and_keeps_existing() {
        let dir = tempfile::tempdir().unwrap();
        let url = upstream(&dir.path().join("upstream"));
        let home = dir.path().join("home");
        let config = config_with(vec![Checkout {
            url,
            destination: ".oh-my-zsh/custom/themes/demo".into(),
        }]);
        let ctx = make_context(config, user_identity(home.clone()), Arc::new(MockExecutor::new()));

        InstallShellExtensions.run(&ctx).unwrap();
        let cloned = home.join(".oh-my-zsh/custom/themes/demo/theme.zsh");
        assert!(cloned.exists());

        std::fs::write(&cloned, "# local edit\n").unwrap();
        InstallShellExtensions.run(&ctx).unwrap();
        assert_eq!(std::fs::read_to_string(&cloned).unwrap(), "# local edit\n");
    }

    #[test]
    fn bad_url_fails_softly() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with(vec![Checkout {
            url: dir.path().join("nope").display().to_string(),
            destination: ".oh-my-zsh".into(),
        }]);
        let ctx = make_context(
            config,
            user_identity(dir.path().join("home")),
            Arc::new(MockExecutor::new()),
        );

        let err = InstallShellExtensions.run(&ctx).unwrap_err();
        assert!(!crate::error::is_hard(&err));
    }
}
