//! Personal environment bootstrapper.
//!
//! Places a declarative table of config files into the invoking user's home
//! (copied with metadata, or symlinked), installs fonts system-wide and
//! provisions the shell: packages, framework and plugin checkouts, rc file
//! patching and the login shell. Everything is driven by TOML files in
//! `conf/` and filtered by distro and desktop session.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]** — parse and validate TOML config files
//! - **[`resources`]** — idempotent `check + apply` primitives (placements, packages, …)
//! - **[`tasks`]** — named, ordered units of work wired to resources
//! - **[`commands`]** — top-level orchestration of the pipeline
//!
//! [`materialize`] is the config placement engine the pipeline is built
//! around.
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod identity;
pub mod logging;
pub mod materialize;
pub mod platform;
pub mod resources;
pub mod tasks;

/// Build version: `HOMESTEAD_VERSION` captured by the build script, or the
/// package version.
pub const VERSION: &str = match option_env!("HOMESTEAD_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
