//! Configuration loaded from the repository's `conf/` directory.
pub mod entries;
pub mod packages;
pub mod settings;
pub mod toml_loader;
pub mod validation;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::platform::Platform;
use validation::{
    ConfigValidator, EntryValidator, PackageValidator, SettingsValidator, ValidationWarning,
};

/// All loaded configuration for the active categories.
#[derive(Debug)]
pub struct Config {
    /// Dotfiles repository root.
    pub root: PathBuf,
    /// Config files to materialize, in table order.
    pub entries: Vec<entries::ConfigEntry>,
    /// Packages to install.
    pub packages: Vec<packages::Package>,
    /// Run settings.
    pub settings: settings::Settings,
}

impl Config {
    /// Load all configuration from `<root>/conf/` for the platform's
    /// active categories.
    ///
    /// # Errors
    ///
    /// Returns an error if any file fails to parse or the entry table is
    /// invalid.
    pub fn load(root: &Path, platform: &Platform) -> Result<Self> {
        let conf = root.join("conf");
        let active_categories = platform.categories();

        let entries = entries::load(&conf.join("configs.toml"), &active_categories)
            .context("loading configs.toml")?;

        let packages = packages::load(&conf.join("packages.toml"), &active_categories)
            .context("loading packages.toml")?;

        let settings =
            settings::load(&conf.join("settings.toml")).context("loading settings.toml")?;

        Ok(Self {
            root: root.to_path_buf(),
            entries,
            packages,
            settings,
        })
    }

    /// Run every validator and collect the warnings.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationWarning> {
        let validators: [&dyn ConfigValidator; 3] = [
            &EntryValidator::new(&self.entries),
            &PackageValidator::new(&self.packages),
            &SettingsValidator::new(&self.settings),
        ];
        validators
            .iter()
            .flat_map(|v| v.validate(&self.root))
            .collect()
    }
}
