//! Domain-specific error types for the bootstrapper.
//!
//! Internal modules return typed errors (e.g. [`ConfigError`],
//! [`PrerequisiteError`], [`FontError`]) while command handlers at the CLI
//! boundary receive them as [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! BootstrapError
//! ├── Config(ConfigError)             — TOML parsing, entry validation
//! ├── Prerequisite(PrerequisiteError) — hard preconditions, abort the run
//! └── Font(FontError)                 — font installation
//! ```
//!
//! Hard preconditions stop the pipeline before any later task runs; every
//! other error is recorded against its task and the pipeline continues.
//! [`is_hard`] makes that classification for an arbitrary [`anyhow::Error`].

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the bootstrapper.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Configuration-related error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A hard precondition was not met.
    #[error(transparent)]
    Prerequisite(#[from] PrerequisiteError),

    /// Font installation error.
    #[error(transparent)]
    Font(#[from] FontError),
}

/// Errors that arise from loading and validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Two entries place into the same destination path.
    #[error("duplicate destination '{destination}' (sources '{first}' and '{second}')")]
    DuplicateDestination {
        /// Destination path relative to the home directory.
        destination: String,
        /// Source of the first entry claiming the destination.
        first: String,
        /// Source of the conflicting entry.
        second: String,
    },

    /// A configured path escapes its root (absolute or containing `..`).
    #[error("path '{path}' must be relative and stay inside its root")]
    InvalidPath {
        /// Offending path as written in the config.
        path: String,
    },

    /// A TOML file could not be parsed.
    #[error("Invalid TOML in {file}: {message}")]
    InvalidSyntax {
        /// File that failed to parse.
        file: String,
        /// Parser message.
        message: String,
    },
}

/// Hard preconditions checked before any side effect.
#[derive(Error, Debug)]
pub enum PrerequisiteError {
    /// The operation needs root but the process is unprivileged.
    #[error("elevated privileges are required to {action} (re-run with sudo)")]
    NotPrivileged {
        /// What was about to be done.
        action: String,
    },

    /// A mandatory source directory is absent.
    #[error("required directory not found: {}", path.display())]
    MissingDirectory {
        /// Directory that was expected to exist.
        path: PathBuf,
    },

    /// The distribution has no supported package manager family.
    #[error("unsupported distribution '{distro}': no known package manager")]
    UnsupportedDistro {
        /// Distribution identifier as reported by the system.
        distro: String,
    },

    /// The invoking user's home could not be determined.
    #[error("cannot resolve home directory for invoking user '{user}'")]
    UnresolvedHome {
        /// Name of the invoking (non-elevated) user.
        user: String,
    },
}

/// Errors from [`install_fonts`](crate::resources::font::install_fonts).
#[derive(Error, Debug)]
pub enum FontError {
    /// A hard precondition (privilege, source directory) was not met.
    #[error(transparent)]
    Prerequisite(#[from] PrerequisiteError),

    /// The source directory holds no installable font files.
    #[error("no .ttf or .otf files found in {}", dir.display())]
    NoAssets {
        /// Directory that was scanned.
        dir: PathBuf,
    },

    /// The font source directory could not be listed.
    #[error("scan {}: {source}", dir.display())]
    Scan {
        /// Directory being scanned.
        dir: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A font file could not be copied into the system directory.
    #[error("copy {} -> {}: {source}", from.display(), to.display())]
    Copy {
        /// Font file being copied.
        from: PathBuf,
        /// Destination inside the fonts directory.
        to: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The font cache refresh command failed.
    #[error("font cache refresh failed: {reason}")]
    CacheRefresh {
        /// Command output or launch error.
        reason: String,
    },
}

impl FontError {
    /// Whether this error must abort the whole run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Prerequisite(_) | Self::NoAssets { .. })
    }
}

/// Return `true` if `err` represents an unmet hard precondition.
///
/// Looks through the whole context chain, so errors wrapped with
/// [`anyhow::Context`] are still classified correctly.
#[must_use]
pub fn is_hard(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.is::<PrerequisiteError>()
            || cause.downcast_ref::<FontError>().is_some_and(FontError::is_fatal)
            || cause
                .downcast_ref::<BootstrapError>()
                .is_some_and(|e| match e {
                    BootstrapError::Prerequisite(_) => true,
                    BootstrapError::Font(f) => f.is_fatal(),
                    BootstrapError::Config(_) => false,
                })
    })
}
