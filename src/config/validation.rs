//! Validation of loaded configuration.

use std::path::Path;

use super::entries::ConfigEntry;
use super::packages::Package;
use super::settings::Settings;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The configuration source (e.g., "configs.toml", "packages.toml").
    pub source: String,
    /// The specific item that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Trait for configuration validators.
///
/// Validators report problems that do not stop a run; hard errors are
/// raised by the loaders themselves.
pub trait ConfigValidator {
    /// Validate the configuration and return any warnings found.
    fn validate(&self, root: &Path) -> Vec<ValidationWarning>;
}

/// Validator for the config entry table.
#[derive(Debug)]
pub struct EntryValidator<'a> {
    entries: &'a [ConfigEntry],
}

impl<'a> EntryValidator<'a> {
    /// Validate `entries`.
    #[must_use]
    pub const fn new(entries: &'a [ConfigEntry]) -> Self {
        Self { entries }
    }
}

impl ConfigValidator for EntryValidator<'_> {
    fn validate(&self, root: &Path) -> Vec<ValidationWarning> {
        self.entries
            .iter()
            .filter(|entry| !root.join(&entry.source).exists())
            .map(|entry| {
                ValidationWarning::new(
                    "configs.toml",
                    entry.source.display().to_string(),
                    "source file does not exist and will be skipped",
                )
            })
            .collect()
    }
}

/// Validator for package configurations.
#[derive(Debug)]
pub struct PackageValidator<'a> {
    packages: &'a [Package],
}

impl<'a> PackageValidator<'a> {
    /// Validate `packages`.
    #[must_use]
    pub const fn new(packages: &'a [Package]) -> Self {
        Self { packages }
    }
}

impl ConfigValidator for PackageValidator<'_> {
    fn validate(&self, _root: &Path) -> Vec<ValidationWarning> {
        self.packages
            .iter()
            .filter(|package| package.name.is_empty())
            .map(|package| {
                ValidationWarning::new("packages.toml", &package.name, "package name is empty")
            })
            .collect()
    }
}

/// Validator for settings.toml.
#[derive(Debug)]
pub struct SettingsValidator<'a> {
    settings: &'a Settings,
}

impl<'a> SettingsValidator<'a> {
    /// Validate `settings`.
    #[must_use]
    pub const fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }
}

impl ConfigValidator for SettingsValidator<'_> {
    fn validate(&self, root: &Path) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if let Some(fonts) = &self.settings.fonts {
            if !fonts.target.is_absolute() {
                warnings.push(ValidationWarning::new(
                    "settings.toml",
                    fonts.target.display().to_string(),
                    "font target should be an absolute path",
                ));
            }
            if !root.join(&fonts.source).is_dir() {
                warnings.push(ValidationWarning::new(
                    "settings.toml",
                    fonts.source.display().to_string(),
                    "font source directory does not exist",
                ));
            }
        }

        if let Some(shell) = &self.settings.shell {
            if shell.program.trim().is_empty() {
                warnings.push(ValidationWarning::new(
                    "settings.toml",
                    "shell.program",
                    "shell program is empty",
                ));
            }
            for checkout in &shell.checkouts {
                if checkout.url.trim().is_empty() {
                    warnings.push(ValidationWarning::new(
                        "settings.toml",
                        checkout.destination.display().to_string(),
                        "checkout URL is empty",
                    ));
                }
            }
        }

        warnings
    }
}
