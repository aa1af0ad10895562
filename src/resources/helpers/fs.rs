//! File-system resource helpers.
use anyhow::{Context as _, Result};
use std::fs::{File, FileTimes};
use std::path::{Path, PathBuf};

use crate::exec::Executor;

/// Create the parent chain of `path`.
///
/// Returns the outermost directory this call created, or `None` when the
/// parent already existed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<Option<PathBuf>> {
    let Some(parent) = path.parent() else {
        return Ok(None);
    };
    let created = parent
        .ancestors()
        .take_while(|dir| !dir.as_os_str().is_empty() && dir.symlink_metadata().is_err())
        .last()
        .map(Path::to_path_buf);
    std::fs::create_dir_all(parent)
        .with_context(|| format!("create parent: {}", parent.display()))?;
    Ok(created)
}

/// Remove whatever exists at `path`: a file, a symlink (including a broken
/// one), or an empty directory. Does nothing if `path` does not exist.
///
/// Symlinks are removed without following them.
///
/// # Errors
///
/// Returns an error if the path cannot be removed, in particular when it is
/// a non-empty directory.
pub fn remove_existing(path: &Path) -> Result<()> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(());
    };
    if meta.is_dir() {
        std::fs::remove_dir(path)
            .with_context(|| format!("remove existing directory: {}", path.display()))
    } else {
        std::fs::remove_file(path)
            .with_context(|| format!("remove existing: {}", path.display()))
    }
}

/// Copy `from` to `to` with content, permission bits and modification time.
///
/// # Errors
///
/// Returns an error if the copy fails or the timestamps cannot be set.
pub fn copy_with_metadata(from: &Path, to: &Path) -> Result<()> {
    std::fs::copy(from, to)
        .with_context(|| format!("copy {} to {}", from.display(), to.display()))?;

    let meta = std::fs::metadata(from)
        .with_context(|| format!("read metadata: {}", from.display()))?;
    let mut times = FileTimes::new().set_modified(
        meta.modified()
            .with_context(|| format!("read mtime: {}", from.display()))?,
    );
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    File::open(to)
        .and_then(|file| file.set_times(times))
        .with_context(|| format!("set times: {}", to.display()))?;
    Ok(())
}

/// Hand `path` to `owner` (and the owner's primary group).
///
/// Symlinks are re-owned themselves, not their targets. With `recursive`
/// the whole tree below `path` is handed over.
///
/// # Errors
///
/// Returns an error if `chown` fails.
pub fn hand_over(executor: &dyn Executor, owner: &str, path: &Path, recursive: bool) -> Result<()> {
    let spec = format!("{owner}:");
    let path_arg = path.to_string_lossy();
    let mut args = vec!["-h"];
    if recursive {
        args.push("-R");
    }
    args.push(&spec);
    args.push(&path_arg);
    executor
        .run("chown", &args)
        .with_context(|| format!("hand {} over to {owner}", path.display()))?;
    Ok(())
}

/// Hand a freshly placed `path` to `owner`, along with the directories
/// created for it.
///
/// `created` is what [`ensure_parent_dir`] returned. When set, that directory
/// is handed over recursively, which covers `path` as well.
///
/// # Errors
///
/// Returns an error if `chown` fails.
pub fn hand_over_placed(
    executor: &dyn Executor,
    owner: &str,
    created: Option<&Path>,
    path: &Path,
    recursive: bool,
) -> Result<()> {
    created.map_or_else(
        || hand_over(executor, owner, path, recursive),
        |dir| hand_over(executor, owner, dir, true),
    )
}
