//! Line-oriented patching of the shell rc file.
//!
//! Only lines that begin exactly with a known prefix are rewritten; indented
//! or commented variants are left as the user wrote them.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::helpers::fs::{ensure_parent_dir, hand_over_placed};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Prefix of the theme assignment line.
pub const THEME_PREFIX: &str = "ZSH_THEME=";
/// Prefix of the plugin list line.
pub const PLUGINS_PREFIX: &str = "plugins=(";

/// One managed line, identified by its prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Lines starting with this prefix are replaced.
    pub prefix: &'static str,
    /// Full replacement line.
    pub line: String,
}

impl Directive {
    /// `ZSH_THEME="<theme>"`.
    #[must_use]
    pub fn theme(theme: &str) -> Self {
        Self {
            prefix: THEME_PREFIX,
            line: format!("{THEME_PREFIX}\"{theme}\""),
        }
    }

    /// `plugins=(a b c)`.
    #[must_use]
    pub fn plugins(plugins: &[String]) -> Self {
        Self {
            prefix: PLUGINS_PREFIX,
            line: format!("{PLUGINS_PREFIX}{})", plugins.join(" ")),
        }
    }
}

/// Rewrite `content` so every directive is present exactly as given.
///
/// Matching lines are replaced in place, all other lines are kept verbatim
/// (line endings included) and in order, and directives with no matching
/// line are appended. Appended and unterminated lines use `\r\n` when the
/// file already does.
#[must_use]
pub fn patch(content: &str, directives: &[Directive]) -> String {
    let eol = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let mut seen = vec![false; directives.len()];
    let mut out = String::with_capacity(content.len());

    for raw in content.split_inclusive('\n') {
        let (line, ending) = split_ending(raw);
        let replacement = directives
            .iter()
            .zip(seen.iter_mut())
            .find(|(d, _)| line.starts_with(d.prefix));
        match replacement {
            Some((directive, seen)) => {
                *seen = true;
                out.push_str(&directive.line);
            }
            None => out.push_str(line),
        }
        out.push_str(if ending.is_empty() { eol } else { ending });
    }

    for (directive, _) in directives.iter().zip(&seen).filter(|(_, seen)| !**seen) {
        out.push_str(&directive.line);
        out.push_str(eol);
    }
    out
}

/// Split a raw line into its text and its terminator (`\r\n`, `\n` or none).
fn split_ending(raw: &str) -> (&str, &str) {
    raw.strip_suffix("\r\n")
        .map(|line| (line, "\r\n"))
        .or_else(|| raw.strip_suffix('\n').map(|line| (line, "\n")))
        .unwrap_or((raw, ""))
}

/// The rc file with its managed directives.
#[derive(Debug)]
pub struct ShellRcResource<'a> {
    /// Absolute path of the rc file.
    pub path: PathBuf,
    /// Lines to enforce.
    pub directives: Vec<Directive>,
    owner: Option<&'a str>,
    executor: &'a dyn Executor,
}

impl<'a> ShellRcResource<'a> {
    /// Create a new rc file resource.
    #[must_use]
    pub const fn new(path: PathBuf, directives: Vec<Directive>, executor: &'a dyn Executor) -> Self {
        Self {
            path,
            directives,
            owner: None,
            executor,
        }
    }

    /// Hand the written file to `owner`.
    #[must_use]
    pub const fn with_owner(mut self, owner: Option<&'a str>) -> Self {
        self.owner = owner;
        self
    }

    fn read(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", self.path.display())),
        }
    }
}

impl Applicable for ShellRcResource<'_> {
    fn description(&self) -> String {
        format!("{} ({} directives)", self.path.display(), self.directives.len())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let content = self.read()?.unwrap_or_default();
        let patched = patch(&content, &self.directives);
        let created = ensure_parent_dir(&self.path)?;
        std::fs::write(&self.path, patched)
            .with_context(|| format!("writing {}", self.path.display()))?;
        if let Some(owner) = self.owner {
            hand_over_placed(self.executor, owner, created.as_deref(), &self.path, false)?;
        }
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ShellRcResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let Some(content) = self.read()? else {
            return Ok(ResourceState::Missing);
        };
        let stale: Vec<&str> = self
            .directives
            .iter()
            .filter(|d| !content.lines().any(|line| line == d.line))
            .map(|d| d.prefix)
            .collect();
        if stale.is_empty() && patch(&content, &self.directives) == content {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: format!("outdated: {}", stale.join(", ")),
            })
        }
    }
}
