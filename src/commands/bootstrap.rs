//! The bootstrap command: runs the full task pipeline.

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{CommandSetup, run_tasks_to_completion};
use crate::cli::{GlobalOpts, TaskOpts};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::tasks;

/// Environment variable naming the dotfiles root.
pub const ROOT_ENV: &str = "HOMESTEAD_ROOT";

/// Run the bootstrap pipeline.
///
/// # Errors
///
/// Returns an error if setup fails, a task hits a hard precondition, or any
/// task fails.
pub fn run(global: &GlobalOpts, opts: &TaskOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("homestead {}", crate::VERSION));

    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
    let setup = CommandSetup::init(global, log.as_ref(), executor.as_ref())?;
    let ctx = setup.into_context(Arc::clone(log) as Arc<dyn Log>, executor);

    let all = tasks::all_tasks();
    run_tasks_to_completion(&all, opts, &ctx, log)
}

/// Resolve the dotfiles root directory from CLI arguments or auto-detection.
///
/// Lookup order: `--root`, `$HOMESTEAD_ROOT`, the nearest ancestor of the
/// binary holding `conf/`, then the nearest ancestor of the current
/// directory holding `conf/`.
///
/// # Errors
///
/// Returns an error if the root directory cannot be determined or doesn't exist.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(ref root) = global.root {
        return canonical_root(root);
    }

    if let Some(root) = std::env::var_os(ROOT_ENV) {
        return canonical_root(Path::new(&root));
    }

    // e.g. <repo>/target/release/homestead or <repo>/bin/homestead
    if let Ok(exe) = std::env::current_exe()
        && let Some(root) = exe.parent().and_then(find_root_from)
    {
        return canonical_root(&root);
    }

    let cwd = std::env::current_dir()?;
    if let Some(root) = find_root_from(&cwd) {
        return canonical_root(&root);
    }

    anyhow::bail!("cannot determine dotfiles root. Use --root or set {ROOT_ENV}");
}

/// Nearest ancestor of `start` (inclusive) that contains a `conf/` directory.
#[must_use]
pub fn find_root_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("conf").is_dir())
        .map(Path::to_path_buf)
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    dunce::canonicalize(root)
        .with_context(|| format!("dotfiles root {} does not exist", root.display()))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn resolve_root_uses_explicit_root() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalOpts {
            root: Some(dir.path().to_path_buf()),
            mode: None,
        };

        let root = resolve_root(&global).unwrap();
        assert_eq!(root, dunce::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn resolve_root_rejects_missing_explicit_root() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalOpts {
            root: Some(dir.path().join("absent")),
            mode: None,
        };

        let err = resolve_root(&global).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn find_root_walks_up_to_conf() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("conf")).unwrap();
        let nested = dir.path().join("target/release");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_root_from(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn find_root_ignores_conf_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("conf"), "").unwrap();
        let found = find_root_from(dir.path());
        assert_ne!(found, Some(dir.path().to_path_buf()));
    }
}
