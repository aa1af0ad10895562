//! Package list loading.
use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

use super::toml_loader;

/// A distro package to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Name as understood by the distro's package manager.
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct PackageSection {
    packages: Vec<String>,
}

/// Load packages from packages.toml, filtered by active categories.
///
/// Names are trimmed; repeated names are kept once, in first-seen order.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed.
pub fn load(path: &Path, active_categories: &[String]) -> Result<Vec<Package>> {
    let items = toml_loader::load_section_items(path, |s: PackageSection| s.packages)?;
    let names = toml_loader::filter_by_categories(items, active_categories);

    let mut packages: Vec<Package> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim().to_string();
        if packages.iter().any(|p| p.name == name) {
            continue;
        }
        packages.push(Package { name });
    }
    Ok(packages)
}
