//! Task that installs packages.

use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult, TaskStats};
use crate::error::BootstrapError;
use crate::resources::ResourceState;
use crate::resources::package::{
    PackageManager, PackageResource, batch_install_packages, get_installed_packages,
};

/// Install the configured system packages with the distro's package manager.
#[derive(Debug)]
pub struct InstallPackages;

impl Task for InstallPackages {
    fn name(&self) -> &'static str {
        "Install packages"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.packages.is_empty()
    }

    fn preflight(&self, ctx: &Context) -> Result<()> {
        manager_for(ctx).map(|_| ())
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let manager = manager_for(ctx)?;
        ctx.log.debug(&format!("using {manager} package manager"));

        process_packages(ctx, manager)
    }
}

fn manager_for(ctx: &Context) -> Result<PackageManager> {
    Ok(PackageManager::for_distro(&ctx.platform.distro).map_err(BootstrapError::from)?)
}

/// Query the installed set **once**, then install every missing package in a
/// single manager invocation.
fn process_packages(ctx: &Context, manager: PackageManager) -> Result<TaskResult> {
    let packages = &ctx.config.packages;
    ctx.log.debug(&format!(
        "batch-checking {} packages with a single query",
        packages.len()
    ));
    let installed = get_installed_packages(manager, &*ctx.executor)?;

    let mut stats = TaskStats::new();
    let mut missing = Vec::new();
    for pkg in packages {
        let resource = PackageResource::new(
            pkg.name.clone(),
            manager,
            ctx.identity.is_privileged(),
            &*ctx.executor,
        );
        if resource.state_from_installed(&installed) == ResourceState::Correct {
            ctx.log.debug(&format!("ok: {}", pkg.name));
            stats.already_ok += 1;
        } else {
            missing.push(resource);
        }
    }

    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|r| r.name.as_str()).collect();
        ctx.log.info(&format!("installing: {}", names.join(" ")));
        let refs: Vec<&PackageResource<'_>> = missing.iter().collect();
        batch_install_packages(&refs)
            .with_context(|| format!("{manager} failed to install {}", names.join(" ")))?;
        stats.changed += u32::try_from(missing.len()).unwrap_or(u32::MAX);
    }

    stats.finish(ctx)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::packages::Package;
    use crate::error::is_hard;
    use crate::exec::Executor;
    use crate::exec::test_helpers::MockExecutor;
    use crate::platform::{Desktop, Distro, Platform};
    use crate::tasks::test_helpers::{empty_config, make_context, sudo_identity};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn config(names: &[&str]) -> crate::config::Config {
        let mut config = empty_config(PathBuf::from("/tmp"));
        config.packages = names
            .iter()
            .map(|n| Package {
                name: (*n).to_string(),
            })
            .collect();
        config
    }

    #[test]
    fn should_run_only_with_packages() {
        let mock: Arc<dyn Executor> = Arc::new(MockExecutor::new());
        let ctx = make_context(config(&[]), sudo_identity("/home/alice".into()), Arc::clone(&mock));
        assert!(!InstallPackages.should_run(&ctx));
        let ctx = make_context(config(&["zsh"]), sudo_identity("/home/alice".into()), mock);
        assert!(InstallPackages.should_run(&ctx));
    }

    #[test]
    fn installs_only_missing_in_one_command() {
        let mock = Arc::new(MockExecutor::with_responses(vec![
            (true, "git 2.45-1\nzsh 5.9-5\n"),
            (true, ""),
        ]));
        let ctx = make_context(
            config(&["git", "zsh", "kitty", "fzf"]),
            sudo_identity("/home/alice".into()),
            Arc::clone(&mock) as Arc<dyn Executor>,
        );

        assert!(matches!(InstallPackages.run(&ctx).unwrap(), TaskResult::Ok));
        assert_eq!(
            mock.calls(),
            vec![
                "pacman -Q",
                "pacman -S --needed --noconfirm kitty fzf",
            ]
        );
    }

    #[test]
    fn everything_installed_runs_no_install() {
        let mock = Arc::new(MockExecutor::with_responses(vec![(true, "zsh 5.9-5\n")]));
        let ctx = make_context(
            config(&["zsh"]),
            sudo_identity("/home/alice".into()),
            Arc::clone(&mock) as Arc<dyn Executor>,
        );

        InstallPackages.run(&ctx).unwrap();
        assert_eq!(mock.calls(), vec!["pacman -Q"]);
    }

    #[test]
    fn install_failure_is_soft() {
        let mock = Arc::new(MockExecutor::with_responses(vec![(true, ""), (false, "")]));
        let ctx = make_context(
            config(&["zsh"]),
            sudo_identity("/home/alice".into()),
            Arc::clone(&mock) as Arc<dyn Executor>,
        );

        let err = InstallPackages.run(&ctx).unwrap_err();
        assert!(!is_hard(&err));
        assert!(format!("{err:#}").contains("zsh"));
    }

    #[test]
    fn unsupported_distro_is_hard() {
        let mut ctx = make_context(
            config(&["zsh"]),
            sudo_identity("/home/alice".into()),
            Arc::new(MockExecutor::new()),
        );
        ctx.platform = Arc::new(Platform::new(
            Distro::Other("void".to_string()),
            Desktop::Headless,
        ));

        let err = InstallPackages.preflight(&ctx).unwrap_err();
        assert!(is_hard(&err));
        assert!(err.to_string().contains("void"));
        assert!(is_hard(&InstallPackages.run(&ctx).unwrap_err()));
    }
}
