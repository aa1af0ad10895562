//! Default login shell resource.
use anyhow::{Context as _, Result};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// A resource for configuring the default login shell.
#[derive(Debug)]
pub struct DefaultShellResource<'a> {
    /// Target shell name (e.g., "zsh").
    target_shell: String,
    /// Account to change; `None` means the current user.
    user: Option<&'a str>,
    /// Executor for running system commands.
    executor: &'a dyn Executor,
}

impl<'a> DefaultShellResource<'a> {
    /// Create a new default shell resource.
    #[must_use]
    pub const fn new(
        target_shell: String,
        user: Option<&'a str>,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            target_shell,
            user,
            executor,
        }
    }

    /// Current login shell: the account database entry for an explicit
    /// user, `$SHELL` otherwise.
    fn login_shell(&self) -> String {
        self.user.map_or_else(
            || std::env::var("SHELL").unwrap_or_default(),
            |user| {
                self.executor
                    .run_unchecked("getent", &["passwd", user])
                    .ok()
                    .filter(|r| r.success)
                    .and_then(|r| {
                        r.stdout
                            .lines()
                            .next()
                            .and_then(|line| line.split(':').nth(6))
                            .map(str::to_string)
                    })
                    .unwrap_or_default()
            },
        )
    }
}

impl Applicable for DefaultShellResource<'_> {
    fn description(&self) -> String {
        format!("default shell → {}", self.target_shell)
    }

    fn apply(&self) -> Result<ResourceChange> {
        let result = self
            .executor
            .run("which", &[&self.target_shell])
            .with_context(|| format!("locating {}", self.target_shell))?;
        let shell_path = result.stdout.trim();
        let mut args = vec!["-s", shell_path];
        if let Some(user) = self.user {
            args.push(user);
        }
        self.executor.run("chsh", &args)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for DefaultShellResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let current_shell = self.login_shell();
        let suffix = format!("/{}", self.target_shell);

        if current_shell.ends_with(&suffix) {
            Ok(ResourceState::Correct)
        } else if current_shell.is_empty() {
            Ok(ResourceState::Missing)
        } else {
            Ok(ResourceState::Incorrect {
                current: current_shell,
            })
        }
    }
}
