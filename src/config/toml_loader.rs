//! TOML configuration file parsing with category filtering.
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Deserialize a TOML file, treating a missing file as empty TOML.
///
/// `T` must therefore accept an empty document (all fields defaulted).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return toml::from_str("").context("Failed to create empty config");
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse(&content, path)
}

fn parse<T: DeserializeOwned>(content: &str, path: &Path) -> Result<T> {
    toml::from_str(content).map_err(|e| {
        ConfigError::InvalidSyntax {
            file: path.display().to_string(),
            message: e.message().to_string(),
        }
        .into()
    })
}

/// Load a TOML file whose top-level tables are category sections, each
/// holding one repeated field, and return `(section_name, items)` pairs in
/// file order.
///
/// `extract` receives the deserialized section and returns the items stored
/// in it (e.g. `|s: PackageSection| s.packages`).
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or a
/// section does not match the shape of `S`.
pub fn load_section_items<S, T>(
    path: &Path,
    extract: impl Fn(S) -> Vec<T>,
) -> Result<Vec<(String, Vec<T>)>>
where
    S: DeserializeOwned,
{
    let table: toml::Table = load_config(path)?;
    table
        .into_iter()
        .map(|(name, value)| {
            let section: S = value
                .try_into()
                .with_context(|| format!("section [{name}] in {}", path.display()))?;
            Ok((name, extract(section)))
        })
        .collect()
}

/// Whether a section applies to the active categories.
///
/// Section names are `-`-joined tags (e.g. `arch-kde`); every tag must be
/// active.
#[must_use]
pub fn section_matches(section_name: &str, active_categories: &[String]) -> bool {
    section_name
        .split('-')
        .all(|tag| active_categories.iter().any(|a| a == tag))
}

/// Keep the items of every section matching the active categories,
/// preserving file order.
#[must_use]
pub fn filter_by_categories<T>(
    items: Vec<(String, Vec<T>)>,
    active_categories: &[String],
) -> Vec<T> {
    items
        .into_iter()
        .filter(|(section_name, _)| section_matches(section_name, active_categories))
        .flat_map(|(_, items)| items)
        .collect()
}
