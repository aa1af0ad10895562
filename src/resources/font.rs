//! System-wide font installation.
use std::path::{Path, PathBuf};

use crate::error::{FontError, PrerequisiteError};
use crate::exec::Executor;
use crate::identity::Identity;

/// Extensions recognised as installable fonts. Matched case-sensitively.
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// A font file found directly under the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontAsset {
    /// Absolute path of the font file.
    pub path: PathBuf,
}

impl FontAsset {
    fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.path.file_name()
    }
}

/// Outcome of a successful installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontReport {
    /// Directory the fonts were copied into.
    pub fonts_dir: PathBuf,
    /// Paths written under `fonts_dir`, in copy order.
    pub installed: Vec<PathBuf>,
}

/// Copy every font in `source_dir` into `fonts_dir` and refresh the font
/// cache.
///
/// Privilege and the source directory are checked before anything is
/// written, and the source is scanned before `fonts_dir` is created, so a
/// failed precondition or an empty source leaves the system untouched.
/// Fonts already copied stay in place when the cache refresh fails.
///
/// # Errors
///
/// - [`FontError::Prerequisite`] if unprivileged or `source_dir` is absent
/// - [`FontError::NoAssets`] if `source_dir` holds no `ttf`/`otf` files
/// - [`FontError::Copy`] if a file cannot be copied
/// - [`FontError::CacheRefresh`] if `fc-cache` fails
pub fn install_fonts(
    source_dir: &Path,
    fonts_dir: &Path,
    identity: &Identity,
    executor: &dyn Executor,
) -> Result<FontReport, FontError> {
    let assets = check_preconditions(source_dir, identity)?;

    std::fs::create_dir_all(fonts_dir).map_err(|source| FontError::Copy {
        from: source_dir.to_path_buf(),
        to: fonts_dir.to_path_buf(),
        source,
    })?;

    let mut installed = Vec::with_capacity(assets.len());
    for asset in &assets {
        let Some(name) = asset.file_name() else {
            continue;
        };
        let to = fonts_dir.join(name);
        std::fs::copy(&asset.path, &to).map_err(|source| FontError::Copy {
            from: asset.path.clone(),
            to: to.clone(),
            source,
        })?;
        installed.push(to);
    }

    refresh_cache(fonts_dir, executor)?;

    Ok(FontReport {
        fonts_dir: fonts_dir.to_path_buf(),
        installed,
    })
}

/// Check privilege and the font source without writing anything.
///
/// Returns the fonts found in `source_dir`.
///
/// # Errors
///
/// - [`FontError::Prerequisite`] if unprivileged or `source_dir` is absent
/// - [`FontError::NoAssets`] if `source_dir` holds no `ttf`/`otf` files
/// - [`FontError::Scan`] if `source_dir` cannot be listed
pub fn check_preconditions(
    source_dir: &Path,
    identity: &Identity,
) -> Result<Vec<FontAsset>, FontError> {
    if !identity.is_privileged() {
        return Err(PrerequisiteError::NotPrivileged {
            action: "install fonts".to_string(),
        }
        .into());
    }
    if !source_dir.is_dir() {
        return Err(PrerequisiteError::MissingDirectory {
            path: source_dir.to_path_buf(),
        }
        .into());
    }

    let assets = discover(source_dir)?;
    if assets.is_empty() {
        return Err(FontError::NoAssets {
            dir: source_dir.to_path_buf(),
        });
    }
    Ok(assets)
}

/// Regular files directly under `dir` with a font extension, sorted by path.
///
/// # Errors
///
/// Returns [`FontError::Scan`] if the directory cannot be listed.
pub fn discover(dir: &Path) -> Result<Vec<FontAsset>, FontError> {
    let scan_err = |source| FontError::Scan {
        dir: dir.to_path_buf(),
        source,
    };
    let mut assets = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(scan_err)? {
        let entry = entry.map_err(scan_err)?;
        let path = entry.path();
        let is_font = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| FONT_EXTENSIONS.contains(&ext));
        if is_font && path.is_file() {
            assets.push(FontAsset { path });
        }
    }
    assets.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(assets)
}

fn refresh_cache(fonts_dir: &Path, executor: &dyn Executor) -> Result<(), FontError> {
    let dir = fonts_dir.to_string_lossy();
    let result = executor
        .run_unchecked("fc-cache", &["-f", &dir])
        .map_err(|e| FontError::CacheRefresh {
            reason: format!("{e:#}"),
        })?;
    if !result.success {
        let stderr = result.stderr.trim();
        return Err(FontError::CacheRefresh {
            reason: if stderr.is_empty() {
                format!("fc-cache exited with {}", result.code.unwrap_or(-1))
            } else {
                stderr.to_string()
            },
        });
    }
    Ok(())
}
