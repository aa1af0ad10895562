//! Config materialization: reconcile the home directory with the entry table.
//!
//! Every entry is processed in table order with the same remove-then-place
//! sequence on every run, so repeated runs converge on identical destination
//! state. A failing entry never stops the ones after it.
use std::fmt;
use std::path::PathBuf;

use crate::config::entries::{ConfigEntry, PlacementMode};
use crate::exec::Executor;
use crate::logging::Log;
use crate::resources::placement::PlacementResource;
use crate::resources::{Applicable, ResourceChange};

/// Absolute roots entries are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Repository holding the source files.
    pub dotfiles_root: PathBuf,
    /// Home directory of the user the configs are for.
    pub home_root: PathBuf,
}

impl ResolvedPaths {
    /// Bundle the two roots.
    #[must_use]
    pub fn new(dotfiles_root: impl Into<PathBuf>, home_root: impl Into<PathBuf>) -> Self {
        Self {
            dotfiles_root: dotfiles_root.into(),
            home_root: home_root.into(),
        }
    }
}

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The destination now holds the source.
    Placed,
    /// The source does not exist; the destination was left alone.
    SkippedMissingSource,
    /// Placement failed with the given reason.
    Failed(String),
}

impl fmt::Display for EntryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placed => f.write_str("placed"),
            Self::SkippedMissingSource => f.write_str("skipped (missing source)"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Per-entry outcomes of one materialization, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    /// `(entry, outcome)` pairs.
    pub outcomes: Vec<(ConfigEntry, EntryOutcome)>,
}

impl MaterializeReport {
    /// True iff no entry failed. Skipped entries do not count as failures.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self
            .outcomes
            .iter()
            .any(|(_, outcome)| matches!(outcome, EntryOutcome::Failed(_)))
    }

    fn count(&self, wanted: fn(&EntryOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| wanted(o)).count()
    }

    /// Number of placed entries.
    #[must_use]
    pub fn placed(&self) -> usize {
        self.count(|o| *o == EntryOutcome::Placed)
    }

    /// Number of entries skipped for a missing source.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| *o == EntryOutcome::SkippedMissingSource)
    }

    /// Number of failed entries.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Failed(_)))
    }
}

/// Places config entries under a pair of resolved roots.
pub struct Materializer<'a> {
    paths: &'a ResolvedPaths,
    mode: PlacementMode,
    owner: Option<&'a str>,
    executor: &'a dyn Executor,
    log: &'a dyn Log,
}

impl fmt::Debug for Materializer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Materializer")
            .field("paths", &self.paths)
            .field("mode", &self.mode)
            .field("owner", &self.owner)
            .field("executor", &self.executor)
            .field("log", &"<dyn Log>")
            .finish()
    }
}

impl<'a> Materializer<'a> {
    /// Create a materializer using `mode` for entries without an override.
    #[must_use]
    pub const fn new(
        paths: &'a ResolvedPaths,
        mode: PlacementMode,
        executor: &'a dyn Executor,
        log: &'a dyn Log,
    ) -> Self {
        Self {
            paths,
            mode,
            owner: None,
            executor,
            log,
        }
    }

    /// Hand every placed destination to `owner`.
    #[must_use]
    pub const fn with_owner(mut self, owner: Option<&'a str>) -> Self {
        self.owner = owner;
        self
    }

    /// Materialize every entry and report the outcome of each.
    #[must_use]
    pub fn run(&self, entries: &[ConfigEntry]) -> MaterializeReport {
        let outcomes = entries
            .iter()
            .map(|entry| (entry.clone(), self.place(entry)))
            .collect();
        MaterializeReport { outcomes }
    }

    fn place(&self, entry: &ConfigEntry) -> EntryOutcome {
        let resource = PlacementResource::new(
            self.paths.dotfiles_root.join(&entry.source),
            self.paths.home_root.join(&entry.destination),
            entry.mode_or(self.mode),
            self.executor,
        )
        .with_owner(self.owner);
        let desc = resource.description();

        match resource.apply() {
            Ok(ResourceChange::Skipped { reason }) => {
                self.log.warn(&format!("skipping {}: {reason}", entry.source.display()));
                EntryOutcome::SkippedMissingSource
            }
            Ok(ResourceChange::Applied | ResourceChange::AlreadyCorrect) => {
                self.log.debug(&desc);
                EntryOutcome::Placed
            }
            Err(e) => {
                self.log.error(&format!("{desc}: {e:#}"));
                EntryOutcome::Failed(format!("{e:#}"))
            }
        }
    }
}

/// Materialize `entries` with no ownership hand-over.
///
/// Convenience over [`Materializer`] for callers running as the target user.
#[must_use]
pub fn materialize(
    entries: &[ConfigEntry],
    paths: &ResolvedPaths,
    mode: PlacementMode,
    executor: &dyn Executor,
    log: &dyn Log,
) -> MaterializeReport {
    Materializer::new(paths, mode, executor, log).run(entries)
}
