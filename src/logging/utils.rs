//! Log file location, timestamps and escape stripping.
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

/// `strftime` pattern of the run header.
pub(super) const HEADER_STAMP: &str = "%Y-%m-%d %H:%M:%S";
/// `strftime` pattern prefixed to every log line.
pub(super) const LINE_STAMP: &str = "%H:%M:%S";

/// Current UTC time rendered with `pattern`.
pub(super) fn utc_now(pattern: &str) -> String {
    chrono::Utc::now().format(pattern).to_string()
}

/// Drop terminal control sequences so the log file holds plain text.
///
/// A CSI sequence (`ESC [` ... final byte in `@`..=`~`) is removed whole;
/// any other escape swallows only the byte after `ESC`.
pub(super) fn strip_ansi(s: &str) -> String {
    enum State {
        Text,
        Escape,
        Csi,
    }

    let mut state = State::Text;
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        state = match (state, c) {
            (State::Text, '\x1b') => State::Escape,
            (State::Text, c) => {
                out.push(c);
                State::Text
            }
            (State::Escape, '[') => State::Csi,
            (State::Escape, _) | (State::Csi, '@'..='~') => State::Text,
            (State::Csi, _) => State::Csi,
        };
    }
    out
}

/// Cache directory following the XDG rule: `$XDG_CACHE_HOME` when set and
/// non-empty, else `$HOME/.cache`.
fn cache_root(xdg_cache_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    xdg_cache_home
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|h| PathBuf::from(h).join(".cache")))
}

/// Where `<command>.log` is written: `<cache>/homestead/`.
///
/// Under `sudo` the process `HOME` may still point at the invoking user's
/// home, in which case the log lands in their cache like any other run.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let dir = cache_root(
        std::env::var_os("XDG_CACHE_HOME"),
        std::env::var_os("HOME"),
    )?
    .join("homestead");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_removes_sgr_colours() {
        assert_eq!(strip_ansi("\x1b[31m✗ Install fonts\x1b[0m"), "✗ Install fonts");
        assert_eq!(
            strip_ansi("\x1b[1;34m==>\x1b[0m \x1b[1mSummary\x1b[0m"),
            "==> Summary"
        );
        assert_eq!(strip_ansi("plain"), "plain");
        assert_eq!(strip_ansi(""), "");
    }

    #[test]
    fn strip_ansi_removes_cursor_sequences() {
        assert_eq!(strip_ansi("\x1b[2;5Hmoved"), "moved");
        assert_eq!(strip_ansi("\x1b[Kcleared"), "cleared");
        assert_eq!(strip_ansi("\x1b7saved"), "saved");
    }

    #[test]
    fn cache_root_prefers_xdg() {
        assert_eq!(
            cache_root(Some("/xdg".into()), Some("/home/alice".into())),
            Some(PathBuf::from("/xdg"))
        );
    }

    #[test]
    fn cache_root_ignores_empty_xdg() {
        assert_eq!(
            cache_root(Some(OsString::new()), Some("/home/alice".into())),
            Some(PathBuf::from("/home/alice/.cache"))
        );
        assert_eq!(cache_root(None, None), None);
    }

    #[test]
    fn stamps_have_fixed_width() {
        let line = utc_now(LINE_STAMP);
        assert_eq!(line.len(), 8);
        assert_eq!(&line[2..3], ":");
        let header = utc_now(HEADER_STAMP);
        assert_eq!(header.len(), 19);
        assert_eq!(&header[10..11], " ");
    }
}
