//! Config placement resource: one repository file placed into the home.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::helpers::fs::{
    copy_with_metadata, ensure_parent_dir, hand_over_placed, remove_existing,
};
use super::{Applicable, ResourceChange};
use crate::config::entries::PlacementMode;
use crate::exec::Executor;

/// Places `source` at `destination` by copy or symlink.
///
/// There is no "already correct" check: every apply removes whatever sits at
/// the destination and places the source again.
#[derive(Debug)]
pub struct PlacementResource<'a> {
    /// Absolute path of the repository file.
    pub source: PathBuf,
    /// Absolute destination path in the home.
    pub destination: PathBuf,
    /// How the file is placed.
    pub mode: PlacementMode,
    owner: Option<&'a str>,
    executor: &'a dyn Executor,
}

impl<'a> PlacementResource<'a> {
    /// Create a placement for the process's own user.
    #[must_use]
    pub const fn new(
        source: PathBuf,
        destination: PathBuf,
        mode: PlacementMode,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            source,
            destination,
            mode,
            owner: None,
            executor,
        }
    }

    /// Hand the placed destination to `owner` after placing it.
    #[must_use]
    pub const fn with_owner(mut self, owner: Option<&'a str>) -> Self {
        self.owner = owner;
        self
    }
}

impl Applicable for PlacementResource<'_> {
    fn description(&self) -> String {
        format!(
            "{} {} -> {}",
            self.mode,
            self.source.display(),
            self.destination.display()
        )
    }

    fn apply(&self) -> Result<ResourceChange> {
        if !self.source.exists() {
            return Ok(ResourceChange::Skipped {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }

        let created = ensure_parent_dir(&self.destination)?;
        remove_existing(&self.destination)?;

        match self.mode {
            PlacementMode::Copy => copy_with_metadata(&self.source, &self.destination)?,
            PlacementMode::Symlink => create_symlink(&self.source, &self.destination)?,
        }

        if let Some(owner) = self.owner {
            hand_over_placed(
                self.executor,
                owner,
                created.as_deref(),
                &self.destination,
                false,
            )?;
        }

        Ok(ResourceChange::Applied)
    }
}

/// Create a symlink at `link` pointing to the absolute form of `target`.
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    let target = std::path::absolute(target)
        .with_context(|| format!("resolve absolute path: {}", target.display()))?;
    std::os::unix::fs::symlink(&target, link).with_context(|| {
        format!(
            "creating symlink {} -> {}",
            link.display(),
            target.display()
        )
    })
}
