// Shared helpers for integration tests.
//
// Provides a temporary dotfiles repository next to a temporary home directory
// and a fluent builder so each integration test can set up an isolated
// environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use homestead::config::Config;
use homestead::config::entries::PlacementMode;
use homestead::exec::SystemExecutor;
use homestead::identity::Identity;
use homestead::logging::{Log, Logger};
use homestead::materialize::ResolvedPaths;
use homestead::platform::{Desktop, Distro, Platform};
use homestead::tasks::Context;

/// An isolated repository and home backed by a [`tempfile::TempDir`].
///
/// Both directories are deleted when the context is dropped.
pub struct IntegrationTestContext {
    /// Temporary directory holding `repo/` and `home/`.
    pub dir: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create an empty repository (with `conf/`) and an empty home.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(dir.path().join("repo/conf")).expect("create conf dir");
        std::fs::create_dir_all(dir.path().join("home")).expect("create home dir");
        Self { dir }
    }

    /// Path to the repository root.
    pub fn root_path(&self) -> PathBuf {
        self.dir.path().join("repo")
    }

    /// Path to the home directory.
    pub fn home_path(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    /// Both roots, as the materializer expects them.
    pub fn paths(&self) -> ResolvedPaths {
        ResolvedPaths::new(self.root_path(), self.home_path())
    }

    /// Load configuration for an Arch/KDE desktop.
    pub fn load_config(&self) -> Config {
        Config::load(&self.root_path(), &platform()).expect("load config")
    }

    /// Build a task context for an unprivileged user owning the home.
    pub fn context(&self, mode: PlacementMode) -> (Context, Arc<Logger>) {
        let log = Arc::new(Logger::detached());
        let identity = Identity {
            euid: 1000,
            invoking_user: None,
            home: self.home_path(),
        };
        let ctx = Context::new(
            Arc::new(self.load_config()),
            Arc::new(platform()),
            Arc::new(identity),
            mode,
            Arc::clone(&log) as Arc<dyn Log>,
            Arc::new(SystemExecutor),
        );
        (ctx, log)
    }
}

/// The platform integration tests pretend to run on.
pub fn platform() -> Platform {
    Platform::new(Distro::Arch, Desktop::Kde)
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context backed by an empty repository.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write `content` to `conf/<filename>` in the test repository.
    pub fn with_config_file(self, filename: &str, content: &str) -> Self {
        write_file(&self.ctx.root_path().join("conf").join(filename), content);
        self
    }

    /// Create a source file at `relative` inside the repository.
    pub fn with_source(self, relative: &str, content: &str) -> Self {
        write_file(&self.ctx.root_path().join(relative), content);
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}
