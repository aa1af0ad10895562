//! Invoking-user identity and home directory resolution.
//!
//! Under `sudo` the process runs as root but acts on behalf of the user who
//! typed the command. Configs belong in *that* user's home, so the home is
//! taken from the account database for the invoking user rather than from
//! `$HOME`, which may point at `/root`.
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::error::PrerequisiteError;
use crate::exec::Executor;

/// Environment variables naming the user behind a privilege escalation,
/// in lookup order.
const INVOKING_USER_VARS: &[&str] = &["SUDO_USER", "DOAS_USER"];

/// Who the run is for, and whether it holds root privileges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Effective user id of the process.
    pub euid: u32,
    /// Non-root user on whose behalf a privileged process acts.
    pub invoking_user: Option<String>,
    /// Home directory configs are materialized into.
    pub home: PathBuf,
}

impl Identity {
    /// Whether the process runs with root privileges.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        self.euid == 0
    }

    /// User that files written into the home should be handed to.
    ///
    /// `Some` only when running privileged for another account; an
    /// unprivileged run already creates files as the right owner.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        if self.is_privileged() {
            self.invoking_user.as_deref()
        } else {
            None
        }
    }

    /// Detect the identity of the current process.
    ///
    /// # Errors
    ///
    /// Returns an error if the effective uid cannot be determined, `$HOME`
    /// is unset for a non-delegated run, or the invoking user's home cannot
    /// be resolved.
    pub fn detect(executor: &dyn Executor) -> Result<Self> {
        let euid = executor
            .run("id", &["-u"])?
            .stdout
            .trim()
            .parse::<u32>()
            .context("parsing output of `id -u`")?;
        let invoking_user = INVOKING_USER_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok());
        let env_home = std::env::var_os("HOME").map(PathBuf::from);

        Self::resolve(euid, invoking_user, env_home, |user| {
            lookup_home(executor, user)
        })
    }

    /// Resolve an identity from explicit inputs.
    ///
    /// `lookup` maps a user name to its home directory from the account
    /// database.
    ///
    /// # Errors
    ///
    /// Returns [`PrerequisiteError::UnresolvedHome`] if a privileged run has
    /// an invoking user whose home cannot be found, or an error if `$HOME`
    /// is required but unset.
    pub fn resolve(
        euid: u32,
        invoking_user: Option<String>,
        env_home: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<PathBuf>,
    ) -> Result<Self> {
        let invoking_user = invoking_user.filter(|u| !u.is_empty() && u != "root");

        if euid == 0
            && let Some(user) = invoking_user
        {
            let home = lookup(&user).ok_or_else(|| PrerequisiteError::UnresolvedHome {
                user: user.clone(),
            })?;
            return Ok(Self {
                euid,
                invoking_user: Some(user),
                home,
            });
        }

        let home = env_home.ok_or_else(|| anyhow::anyhow!("HOME environment variable is not set"))?;
        Ok(Self {
            euid,
            invoking_user: None,
            home,
        })
    }
}

/// Look up `user`'s home directory via `getent passwd`.
fn lookup_home(executor: &dyn Executor, user: &str) -> Option<PathBuf> {
    let result = executor.run_unchecked("getent", &["passwd", user]).ok()?;
    if !result.success {
        return None;
    }
    parse_passwd_home(&result.stdout)
}

/// Extract the home field (sixth) from a passwd line.
fn parse_passwd_home(line: &str) -> Option<PathBuf> {
    line.lines()
        .next()?
        .split(':')
        .nth(5)
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}
