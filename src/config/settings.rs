//! Run settings from settings.toml.
use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::entries::{PlacementMode, check_relative};
use super::toml_loader;

/// System-wide font directory used when settings name none.
pub const DEFAULT_FONTS_TARGET: &str = "/usr/local/share/fonts";

/// Top-level settings. Every field is optional in the file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Default placement mode for config entries.
    pub mode: PlacementMode,
    /// Font installation; absent disables the task.
    pub fonts: Option<FontSettings>,
    /// Shell provisioning; absent disables the shell tasks.
    pub shell: Option<ShellSettings>,
}

/// `[fonts]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontSettings {
    /// Font directory relative to the dotfiles root.
    pub source: PathBuf,
    /// Absolute system font directory.
    #[serde(default = "default_fonts_target")]
    pub target: PathBuf,
}

fn default_fonts_target() -> PathBuf {
    PathBuf::from(DEFAULT_FONTS_TARGET)
}

/// `[shell]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellSettings {
    /// Login shell program name, resolved on `PATH`.
    pub program: String,
    /// Shell rc file relative to the home directory.
    pub rc_file: PathBuf,
    /// Value written to the `ZSH_THEME=` line.
    pub theme: Option<String>,
    /// Plugins written to the `plugins=(` line.
    pub plugins: Vec<String>,
    /// Repositories to clone into the home.
    pub checkouts: Vec<Checkout>,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            program: "zsh".to_string(),
            rc_file: PathBuf::from(".zshrc"),
            theme: None,
            plugins: Vec::new(),
            checkouts: Vec::new(),
        }
    }
}

/// A git repository cloned into the home.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Checkout {
    /// Clone URL.
    pub url: String,
    /// Destination relative to the home directory.
    pub destination: PathBuf,
}

/// Load settings.toml; a missing file yields defaults.
///
/// The rc file and every checkout destination must stay inside the home
/// directory.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed, or a
/// [`ConfigError::InvalidPath`](crate::error::ConfigError::InvalidPath) for
/// a home path that is absolute or contains `..`.
pub fn load(path: &Path) -> Result<Settings> {
    let settings: Settings = toml_loader::load_config(path)?;
    if let Some(shell) = &settings.shell {
        check_relative(&shell.rc_file)?;
        for checkout in &shell.checkouts {
            check_relative(&checkout.destination)?;
        }
    }
    Ok(settings)
}
