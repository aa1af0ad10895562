//! Shared execution context passed to tasks.

use std::sync::Arc;

use crate::config::Config;
use crate::config::entries::PlacementMode;
use crate::exec::Executor;
use crate::identity::Identity;
use crate::logging::Log;
use crate::materialize::ResolvedPaths;
use crate::platform::Platform;

/// Shared context for task execution.
pub struct Context {
    /// Configuration loaded from `conf/`.
    pub config: Arc<Config>,
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Who the run is for.
    pub identity: Arc<Identity>,
    /// Dotfiles and home roots.
    pub paths: ResolvedPaths,
    /// Default placement mode after command-line overrides.
    pub mode: PlacementMode,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &"<Config>")
            .field("platform", &self.platform)
            .field("identity", &self.identity)
            .field("paths", &self.paths)
            .field("mode", &self.mode)
            .field("log", &"<dyn Log>")
            .field("executor", &"<dyn Executor>")
            .finish()
    }
}

impl Context {
    /// Creates a new context for task execution.
    ///
    /// The home root comes from `identity`, so a privileged run on behalf of
    /// another user targets that user's home.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        platform: Arc<Platform>,
        identity: Arc<Identity>,
        mode: PlacementMode,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        let paths = ResolvedPaths::new(config.root.clone(), identity.home.clone());
        Self {
            config,
            platform,
            identity,
            paths,
            mode,
            log,
            executor,
        }
    }

    /// Root directory of the dotfiles repository.
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.paths.dotfiles_root
    }

    /// Home directory configs are placed into.
    #[must_use]
    pub fn home(&self) -> &std::path::Path {
        &self.paths.home_root
    }

    /// User that created files are handed to, if any.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.identity.owner()
    }

    /// Return a new context with a different logger.
    #[must_use]
    pub fn with_log(&self, log: Arc<dyn Log>) -> Self {
        Self {
            config: Arc::clone(&self.config),
            platform: Arc::clone(&self.platform),
            identity: Arc::clone(&self.identity),
            paths: self.paths.clone(),
            mode: self.mode,
            log,
            executor: Arc::clone(&self.executor),
        }
    }
}
