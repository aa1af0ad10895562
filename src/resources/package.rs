//! Package installation resource.
use std::collections::HashSet;
use std::fmt;

use anyhow::Result;

use super::ResourceState;
use crate::error::PrerequisiteError;
use crate::exec::Executor;
use crate::platform::Distro;

/// Supported package manager families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Arch Linux (pacman).
    Pacman,
    /// Debian and Ubuntu (apt).
    Apt,
    /// Fedora and RHEL (dnf).
    Dnf,
    /// openSUSE (zypper).
    Zypper,
}

impl PackageManager {
    /// Package manager for a distro family.
    ///
    /// # Errors
    ///
    /// Returns [`PrerequisiteError::UnsupportedDistro`] naming the distro
    /// when it has no known package manager.
    pub fn for_distro(distro: &Distro) -> Result<Self, PrerequisiteError> {
        match distro {
            Distro::Arch => Ok(Self::Pacman),
            Distro::Debian => Ok(Self::Apt),
            Distro::Fedora => Ok(Self::Dnf),
            Distro::Suse => Ok(Self::Zypper),
            Distro::Other(id) => Err(PrerequisiteError::UnsupportedDistro {
                distro: id.clone(),
            }),
        }
    }

    /// Program and leading arguments of a non-interactive install.
    const fn install_command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Pacman => ("pacman", &["-S", "--needed", "--noconfirm"]),
            Self::Apt => ("apt-get", &["install", "-y"]),
            Self::Dnf => ("dnf", &["install", "-y"]),
            Self::Zypper => ("zypper", &["--non-interactive", "install"]),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pacman => write!(f, "pacman"),
            Self::Apt => write!(f, "apt"),
            Self::Dnf => write!(f, "dnf"),
            Self::Zypper => write!(f, "zypper"),
        }
    }
}

/// A system package resource that can be checked and installed.
#[derive(Debug)]
pub struct PackageResource<'a> {
    /// Package name.
    pub name: String,
    /// Package manager to use.
    pub manager: PackageManager,
    privileged: bool,
    executor: &'a dyn Executor,
}

impl<'a> PackageResource<'a> {
    /// Create a new package resource.
    ///
    /// Unprivileged runs prefix install commands with `sudo`.
    #[must_use]
    pub const fn new(
        name: String,
        manager: PackageManager,
        privileged: bool,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            name,
            manager,
            privileged,
            executor,
        }
    }

    /// Determine the resource state from a pre-fetched set of installed package names.
    #[must_use]
    pub fn state_from_installed(&self, installed: &HashSet<String>) -> ResourceState {
        if installed.contains(&self.name) {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        }
    }
}

/// Run `program args` directly, or through `sudo` when unprivileged.
fn run_elevated(
    executor: &dyn Executor,
    privileged: bool,
    program: &str,
    args: &[&str],
) -> Result<()> {
    if privileged {
        executor.run(program, args)?;
    } else {
        let mut sudo_args = Vec::with_capacity(args.len() + 1);
        sudo_args.push(program);
        sudo_args.extend_from_slice(args);
        executor.run("sudo", &sudo_args)?;
    }
    Ok(())
}

/// Query the full set of installed package names for a given manager.
///
/// Runs a **single** command regardless of how many packages need to be
/// checked. A failing query yields an empty set, so every package is
/// treated as missing and the manager's own `--needed`/no-op semantics
/// apply.
///
/// # Errors
///
/// Returns an error if the query command cannot be spawned.
pub fn get_installed_packages(
    manager: PackageManager,
    executor: &dyn Executor,
) -> Result<HashSet<String>> {
    let result = match manager {
        // "name version" per line
        PackageManager::Pacman => executor.run_unchecked("pacman", &["-Q"])?,
        PackageManager::Apt => executor.run_unchecked(
            "dpkg-query",
            &["-W", "-f", "${db:Status-Status} ${Package}\n"],
        )?,
        PackageManager::Dnf | PackageManager::Zypper => {
            executor.run_unchecked("rpm", &["-qa", "--qf", "%{NAME}\n"])?
        }
    };

    let mut set = HashSet::new();
    if !result.success {
        return Ok(set);
    }
    for line in result.stdout.lines() {
        let name = match manager {
            PackageManager::Pacman => line.split_whitespace().next(),
            // Removed-but-configured packages still appear in the dpkg database.
            PackageManager::Apt => line
                .split_once(' ')
                .filter(|(status, _)| *status == "installed")
                .map(|(_, name)| name.trim()),
            PackageManager::Dnf | PackageManager::Zypper => Some(line.trim()),
        };
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            set.insert(name.to_string());
        }
    }
    Ok(set)
}

/// Install a batch of packages in a single command.
///
/// All resources must share a manager; the first one's executor and
/// privilege are used.
///
/// # Errors
///
/// Returns an error if the package manager command fails.
pub fn batch_install_packages(resources: &[&PackageResource<'_>]) -> Result<()> {
    let Some(first) = resources.first() else {
        return Ok(());
    };
    let (program, base_args) = first.manager.install_command();
    let mut args = base_args.to_vec();
    args.extend(resources.iter().map(|r| r.name.as_str()));
    run_elevated(first.executor, first.privileged, program, &args)
}
