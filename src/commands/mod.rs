//! Top-level command orchestration.
pub mod bootstrap;

use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, TaskOpts};
use crate::config::Config;
use crate::config::entries::PlacementMode;
use crate::exec::Executor;
use crate::identity::Identity;
use crate::logging::{Log, Logger, TaskStatus};
use crate::platform::Platform;
use crate::tasks::{self, Context, Task};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates platform detection, identity resolution, and configuration
/// loading so the command body only deals with tasks.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected platform.
    pub platform: Platform,
    /// Who the run is for.
    pub identity: Identity,
    /// Loaded configuration.
    pub config: Config,
    /// Effective default placement mode.
    pub mode: PlacementMode,
}

impl CommandSetup {
    /// Detect the platform and identity, then load all configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be determined, the
    /// invoking user's home cannot be resolved, or any configuration file
    /// fails to parse or validate.
    pub fn init(global: &GlobalOpts, log: &dyn Log, executor: &dyn Executor) -> Result<Self> {
        let platform = Platform::detect();
        let root = bootstrap::resolve_root(global)?;
        log.debug(&format!("dotfiles root: {}", root.display()));
        log.info(&format!(
            "platform: {} ({})",
            platform.distro,
            platform.categories().join(", ")
        ));

        log.stage("Resolving identity");
        let identity = Identity::detect(executor)?;
        let home = identity.home.display();
        log.info(&identity.owner().map_or_else(
            || format!("home: {home}"),
            |user| format!("acting for {user}, home {home}"),
        ));

        log.stage("Loading configuration");
        let config = Config::load(&root, &platform)?;
        let mode = global.mode.unwrap_or(config.settings.mode);

        log.debug(&format!("{} config entries", config.entries.len()));
        log.debug(&format!("{} packages", config.packages.len()));
        log.info(&format!(
            "loaded {} entries, {} packages (mode: {mode})",
            config.entries.len(),
            config.packages.len()
        ));

        let warnings = config.validate();
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!(
                    "  {} [{}]: {}",
                    warning.source, warning.item, warning.message
                ));
            }
        }

        Ok(Self {
            platform,
            identity,
            config,
            mode,
        })
    }

    /// Turn the setup into a task [`Context`].
    #[must_use]
    pub fn into_context(self, log: Arc<dyn Log>, executor: Arc<dyn Executor>) -> Context {
        Context::new(
            Arc::new(self.config),
            Arc::new(self.platform),
            Arc::new(self.identity),
            self.mode,
            log,
            executor,
        )
    }
}

/// Whether `name` passes the `--only`/`--skip` filters.
///
/// Matching is a case-insensitive substring test; `--only` wins over
/// `--skip` when both are given.
#[must_use]
pub fn is_selected(name: &str, opts: &TaskOpts) -> bool {
    let name = name.to_lowercase();
    if !opts.only.is_empty() {
        return opts.only.iter().any(|o| name.contains(&o.to_lowercase()));
    }
    !opts.skip.iter().any(|s| name.contains(&s.to_lowercase()))
}

/// Execute every selected task in order, print the summary, and bail if any
/// task failed.
///
/// Hard preconditions of every selected, applicable task are checked first;
/// when one is unmet nothing runs, that task is recorded as failed and the
/// others as aborted. A hard failure during a run still stops the pipeline
/// and aborts the tasks after it.
///
/// # Errors
///
/// Returns the hard precondition error, or an error if one or more tasks
/// recorded a failure.
pub fn run_tasks_to_completion(
    all: &[Box<dyn Task>],
    opts: &TaskOpts,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    let selected: Vec<bool> = all.iter().map(|t| is_selected(t.name(), opts)).collect();

    if let Some((failing, err)) = preflight(all, &selected, ctx) {
        ctx.log.error(&format!("{failing}: {err:#}"));
        for (task, &chosen) in all.iter().zip(&selected) {
            if !chosen {
                ctx.log
                    .record_task(task.name(), TaskStatus::Skipped, Some("filtered"));
            } else if task.name() == failing {
                ctx.log
                    .record_task(task.name(), TaskStatus::Failed, Some(&format!("{err:#}")));
            } else {
                ctx.log
                    .record_task(task.name(), TaskStatus::Aborted, Some("not run"));
            }
        }
        log.print_summary();
        return Err(err);
    }

    for (i, (task, &chosen)) in all.iter().zip(&selected).enumerate() {
        if !chosen {
            ctx.log.debug(&format!("skipping task: {} (filtered)", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some("filtered"));
            continue;
        }
        if let Err(e) = tasks::execute(task.as_ref(), ctx) {
            for (rest, &chosen) in all.iter().zip(&selected).skip(i + 1) {
                let (status, detail) = if chosen {
                    (TaskStatus::Aborted, "not run")
                } else {
                    (TaskStatus::Skipped, "filtered")
                };
                ctx.log.record_task(rest.name(), status, Some(detail));
            }
            log.print_summary();
            return Err(e);
        }
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} task(s) failed");
    }
    Ok(())
}

/// First unmet precondition among the selected, applicable tasks, with the
/// name of the task that reported it.
fn preflight(
    all: &[Box<dyn Task>],
    selected: &[bool],
    ctx: &Context,
) -> Option<(String, anyhow::Error)> {
    ctx.log.stage("Checking preconditions");
    all.iter()
        .zip(selected)
        .filter(|&(task, &chosen)| chosen && task.should_run(ctx))
        .find_map(|(task, _)| {
            task.preflight(ctx)
                .err()
                .map(|e| (task.name().to_string(), e))
        })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::PrerequisiteError;
    use crate::tasks::TaskResult;
    use crate::config::packages::Package;
    use crate::config::settings::FontSettings;
    use crate::exec::test_helpers::MockExecutor;
    use crate::platform::{Desktop, Distro};
    use crate::tasks::test_helpers::{
        empty_config, make_context, make_static_context, sudo_identity,
    };
    use std::path::PathBuf;

    struct FixedTask {
        name: &'static str,
        outcome: fn() -> Result<TaskResult>,
    }

    impl Task for FixedTask {
        fn name(&self) -> &str {
            self.name
        }
        fn should_run(&self, _: &Context) -> bool {
            true
        }
        fn run(&self, _: &Context) -> Result<TaskResult> {
            (self.outcome)()
        }
    }

    fn ok() -> Result<TaskResult> {
        Ok(TaskResult::Ok)
    }

    fn soft() -> Result<TaskResult> {
        Err(anyhow::anyhow!("chsh failed"))
    }

    fn hard() -> Result<TaskResult> {
        Err(PrerequisiteError::NotPrivileged {
            action: "install fonts".to_string(),
        }
        .into())
    }

    fn pipeline(outcomes: [fn() -> Result<TaskResult>; 3]) -> Vec<Box<dyn Task>> {
        let names = ["Install fonts", "Materialize configs", "Configure default shell"];
        names
            .into_iter()
            .zip(outcomes)
            .map(|(name, outcome)| Box::new(FixedTask { name, outcome }) as Box<dyn Task>)
            .collect()
    }

    fn statuses(log: &Logger) -> Vec<TaskStatus> {
        log.task_entries().into_iter().map(|e| e.status).collect()
    }

    fn opts(skip: &[&str], only: &[&str]) -> TaskOpts {
        TaskOpts {
            skip: skip.iter().map(ToString::to_string).collect(),
            only: only.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn selection_by_substring() {
        assert!(is_selected("Install fonts", &opts(&[], &[])));
        assert!(!is_selected("Install fonts", &opts(&["FONTS"], &[])));
        assert!(is_selected("Install fonts", &opts(&[], &["font"])));
        assert!(!is_selected("Install packages", &opts(&[], &["font"])));
        assert!(is_selected("Install fonts", &opts(&["fonts"], &["fonts"])));
    }

    #[test]
    fn all_ok_succeeds() {
        let (ctx, log) = make_static_context(empty_config(PathBuf::from("/tmp")));
        run_tasks_to_completion(&pipeline([ok, ok, ok]), &TaskOpts::default(), &ctx, &log)
            .unwrap();
        assert_eq!(statuses(&log), vec![TaskStatus::Ok; 3]);
    }

    #[test]
    fn soft_failure_continues_then_fails_run() {
        let (ctx, log) = make_static_context(empty_config(PathBuf::from("/tmp")));
        let err = run_tasks_to_completion(&pipeline([ok, soft, ok]), &TaskOpts::default(), &ctx, &log)
            .unwrap_err();
        assert_eq!(err.to_string(), "1 task(s) failed");
        assert_eq!(
            statuses(&log),
            vec![TaskStatus::Ok, TaskStatus::Failed, TaskStatus::Ok]
        );
    }

    #[test]
    fn hard_failure_aborts_remaining_tasks() {
        let (ctx, log) = make_static_context(empty_config(PathBuf::from("/tmp")));
        let err = run_tasks_to_completion(&pipeline([hard, ok, ok]), &TaskOpts::default(), &ctx, &log)
            .unwrap_err();
        assert!(err.to_string().contains("install fonts"));
        assert_eq!(
            statuses(&log),
            vec![TaskStatus::Failed, TaskStatus::Aborted, TaskStatus::Aborted]
        );
    }

    #[test]
    fn unmet_precondition_stops_before_any_side_effect() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("fonts")).unwrap();
        std::fs::write(dir.path().join("fonts/a.ttf"), "x").unwrap();
        let target = dir.path().join("sys");
        let mut config = empty_config(dir.path().to_path_buf());
        config.settings.fonts = Some(FontSettings {
            source: "fonts".into(),
            target: target.clone(),
        });
        config.packages = vec![Package {
            name: "zsh".to_string(),
        }];
        let mock = Arc::new(MockExecutor::with_responses(vec![(true, "")]));
        let log = Arc::new(Logger::detached());
        let mut ctx = make_context(
            config,
            sudo_identity(dir.path().join("home")),
            Arc::clone(&mock) as Arc<dyn Executor>,
        )
        .with_log(Arc::clone(&log) as Arc<dyn Log>);
        ctx.platform = Arc::new(Platform::new(
            Distro::Other("void".to_string()),
            Desktop::Headless,
        ));

        let err =
            run_tasks_to_completion(&tasks::all_tasks(), &TaskOpts::default(), &ctx, &log)
                .unwrap_err();

        assert!(err.to_string().contains("void"));
        assert!(!target.exists(), "fonts were copied before the check");
        assert!(mock.calls().is_empty());
        let entries = log.task_entries();
        assert_eq!(entries[0].status, TaskStatus::Aborted);
        assert_eq!(entries[1].name, "Install packages");
        assert_eq!(entries[1].status, TaskStatus::Failed);
        assert!(entries[2..].iter().all(|e| e.status == TaskStatus::Aborted));
    }

    #[test]
    fn filtered_task_preconditions_are_not_checked() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = empty_config(dir.path().to_path_buf());
        config.packages = vec![Package {
            name: "zsh".to_string(),
        }];
        let log = Arc::new(Logger::detached());
        let mut ctx = make_context(
            config,
            sudo_identity(dir.path().join("home")),
            Arc::new(MockExecutor::new()),
        )
        .with_log(Arc::clone(&log) as Arc<dyn Log>);
        ctx.platform = Arc::new(Platform::new(
            Distro::Other("void".to_string()),
            Desktop::Headless,
        ));

        run_tasks_to_completion(&tasks::all_tasks(), &opts(&["packages"], &[]), &ctx, &log)
            .unwrap();
        let packages = log
            .task_entries()
            .into_iter()
            .find(|e| e.name == "Install packages")
            .unwrap();
        assert_eq!(packages.status, TaskStatus::Skipped);
    }

    #[test]
    fn filtered_tasks_are_recorded_as_skipped() {
        let (ctx, log) = make_static_context(empty_config(PathBuf::from("/tmp")));
        run_tasks_to_completion(&pipeline([hard, ok, soft]), &opts(&[], &["materialize"]), &ctx, &log)
            .unwrap();
        assert_eq!(
            statuses(&log),
            vec![TaskStatus::Skipped, TaskStatus::Ok, TaskStatus::Skipped]
        );
    }
}
