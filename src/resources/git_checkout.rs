//! Git repository checkout resource.
use anyhow::{Context as _, Result};
use git2::build::RepoBuilder;
use std::path::PathBuf;

use super::helpers::fs::{ensure_parent_dir, hand_over_placed};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// A repository cloned into a fixed destination.
///
/// An existing repository at the destination counts as correct; it is never
/// pulled or reset.
#[derive(Debug)]
pub struct GitCheckoutResource<'a> {
    /// Clone URL (or local path).
    pub url: String,
    /// Absolute destination directory.
    pub destination: PathBuf,
    owner: Option<&'a str>,
    executor: &'a dyn Executor,
}

impl<'a> GitCheckoutResource<'a> {
    /// Create a new checkout resource.
    #[must_use]
    pub const fn new(url: String, destination: PathBuf, executor: &'a dyn Executor) -> Self {
        Self {
            url,
            destination,
            owner: None,
            executor,
        }
    }

    /// Hand the cloned tree to `owner` after cloning.
    #[must_use]
    pub const fn with_owner(mut self, owner: Option<&'a str>) -> Self {
        self.owner = owner;
        self
    }
}

impl Applicable for GitCheckoutResource<'_> {
    fn description(&self) -> String {
        format!("{} -> {}", self.url, self.destination.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let created = ensure_parent_dir(&self.destination)?;
        RepoBuilder::new()
            .clone(&self.url, &self.destination)
            .with_context(|| format!("clone {}", self.url))?;

        if let Some(owner) = self.owner {
            hand_over_placed(
                self.executor,
                owner,
                created.as_deref(),
                &self.destination,
                true,
            )?;
        }
        Ok(ResourceChange::Applied)
    }
}

impl Resource for GitCheckoutResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        if self.destination.symlink_metadata().is_err() {
            return Ok(ResourceState::Missing);
        }
        if git2::Repository::open(&self.destination).is_ok() {
            return Ok(ResourceState::Correct);
        }
        let empty_dir = self.destination.is_dir()
            && std::fs::read_dir(&self.destination)
                .with_context(|| format!("reading {}", self.destination.display()))?
                .next()
                .is_none();
        if empty_dir {
            // git clones into an empty directory
            Ok(ResourceState::Missing)
        } else {
            Ok(ResourceState::Invalid {
                reason: format!(
                    "{} exists and is not a git repository",
                    self.destination.display()
                ),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::MockExecutor;
    use std::path::Path;

    /// Create a repository with a single commit containing `file`.
    fn upstream(dir: &Path) -> PathBuf {
        let path = dir.join("upstream");
        let repo = git2::Repository::init(&path).unwrap();
        std::fs::write(path.join("theme.zsh-theme"), "PROMPT='%~ '").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("theme.zsh-theme")).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = git2::Signature::now("test", "test@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
            .unwrap();
        path
    }

    #[test]
    fn missing_destination_is_cloned() {
        let dir = tempfile::tempdir().unwrap();
        let url = upstream(dir.path()).to_string_lossy().into_owned();
        let destination = dir.path().join("home/.oh-my-zsh/custom/themes/t");
        let mock = MockExecutor::new();
        let resource = GitCheckoutResource::new(url, destination.clone(), &mock);

        assert_eq!(resource.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);
        assert!(destination.join("theme.zsh-theme").exists());
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn clone_hands_tree_to_owner() {
        let dir = tempfile::tempdir().unwrap();
        let url = upstream(dir.path()).to_string_lossy().into_owned();
        let destination = dir.path().join("checkout");
        let mock = MockExecutor::with_responses(vec![(true, "")]);
        GitCheckoutResource::new(url, destination.clone(), &mock)
            .with_owner(Some("alice"))
            .apply()
            .unwrap();
        assert_eq!(
            mock.calls(),
            vec![format!("chown -h -R alice: {}", destination.display())]
        );
    }

    #[test]
    fn new_parent_of_checkout_is_handed_over() {
        let dir = tempfile::tempdir().unwrap();
        let url = upstream(dir.path()).to_string_lossy().into_owned();
        let destination = dir.path().join(".oh-my-zsh/custom/themes/p10k");
        let mock = MockExecutor::with_responses(vec![(true, "")]);
        GitCheckoutResource::new(url, destination.clone(), &mock)
            .with_owner(Some("alice"))
            .apply()
            .unwrap();
        assert!(destination.join("theme.zsh-theme").exists());
        assert_eq!(
            mock.calls(),
            vec![format!(
                "chown -h -R alice: {}",
                dir.path().join(".oh-my-zsh").display()
            )]
        );
    }

    #[test]
    fn occupied_destination_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("occupied");
        std::fs::create_dir(&destination).unwrap();
        std::fs::write(destination.join("file"), "x").unwrap();
        let mock = MockExecutor::new();
        let resource = GitCheckoutResource::new("unused".to_string(), destination, &mock);
        assert!(matches!(
            resource.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));
    }

    #[test]
    fn bad_url_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockExecutor::new();
        let resource = GitCheckoutResource::new(
            dir.path().join("no-such-repo").to_string_lossy().into_owned(),
            dir.path().join("dest"),
            &mock,
        );
        assert!(resource.apply().is_err());
    }
}
