//! Config entry table: which repository file lands where in the home.
use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use super::toml_loader;
use crate::error::ConfigError;

/// How a config file is placed at its destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlacementMode {
    /// Copy content, permission bits and modification time.
    #[default]
    Copy,
    /// Symlink to the absolute source path.
    Symlink,
}

impl fmt::Display for PlacementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy => f.write_str("copy"),
            Self::Symlink => f.write_str("symlink"),
        }
    }
}

/// A single source → destination mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfigEntry {
    /// Path relative to the dotfiles root.
    pub source: PathBuf,
    /// Path relative to the home directory.
    pub destination: PathBuf,
    /// Per-entry override of the run's placement mode.
    #[serde(default)]
    pub mode: Option<PlacementMode>,
}

impl ConfigEntry {
    /// Entry that follows the run's default mode.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            mode: None,
        }
    }

    /// Set the per-entry mode override.
    #[must_use]
    pub const fn with_mode(mut self, mode: PlacementMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Effective mode given the run default.
    #[must_use]
    pub fn mode_or(&self, default: PlacementMode) -> PlacementMode {
        self.mode.unwrap_or(default)
    }
}

#[derive(Debug, Deserialize)]
struct ConfigSection {
    configs: Vec<ConfigEntry>,
}

/// Table used when the repository carries no `configs.toml`.
#[must_use]
pub fn builtin_entries() -> Vec<ConfigEntry> {
    vec![
        ConfigEntry::new("linux/kitty/kitty.conf", ".config/kitty/kitty.conf"),
        ConfigEntry::new(
            "linux/plasma-org.kde.plasma.desktop-appletsrc",
            ".config/plasma-org.kde.plasma.desktop-appletsrc",
        ),
        ConfigEntry::new("vscode/settings.json", ".config/Code/User/settings.json"),
        ConfigEntry::new(
            "vscode/keybindings.json",
            ".config/Code/User/keybindings.json",
        ),
    ]
}

/// Load config entries from configs.toml, filtered by active categories.
///
/// A missing file yields [`builtin_entries`]. The loaded table is validated
/// before it is returned.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed, or a [`ConfigError`] if an
/// entry path escapes its root or two entries share a destination.
pub fn load(path: &Path, active_categories: &[String]) -> Result<Vec<ConfigEntry>> {
    let entries = if path.exists() {
        let items = toml_loader::load_section_items(path, |s: ConfigSection| s.configs)?;
        toml_loader::filter_by_categories(items, active_categories)
    } else {
        builtin_entries()
    };
    validate(&entries)?;
    Ok(entries)
}

/// Check that every path is relative without `..` and every destination is
/// claimed once.
///
/// # Errors
///
/// Returns the first [`ConfigError`] found, in table order.
pub fn validate(entries: &[ConfigEntry]) -> Result<(), ConfigError> {
    let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
    for entry in entries {
        check_relative(&entry.source)?;
        check_relative(&entry.destination)?;

        let key: PathBuf = entry
            .destination
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        if let Some(first) = seen.get(&key) {
            return Err(ConfigError::DuplicateDestination {
                destination: entry.destination.display().to_string(),
                first: first.display().to_string(),
                second: entry.source.display().to_string(),
            });
        }
        seen.insert(key, &entry.source);
    }
    Ok(())
}

/// Reject a path that is empty, absolute, or contains `..`.
pub(super) fn check_relative(path: &Path) -> Result<(), ConfigError> {
    let escapes = path.as_os_str().is_empty()
        || path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ConfigError::InvalidPath {
            path: path.display().to_string(),
        });
    }
    Ok(())
}
