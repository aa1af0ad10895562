//! Distribution and desktop-session detection.
use std::fmt;
use std::path::Path;

/// Linux distribution family, as far as package management is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Distro {
    /// Arch Linux and derivatives (pacman).
    Arch,
    /// Debian, Ubuntu and derivatives (apt).
    Debian,
    /// Fedora, RHEL and derivatives (dnf).
    Fedora,
    /// openSUSE (zypper).
    Suse,
    /// Anything else, carrying the `ID` from os-release as a category tag.
    Other(String),
}

impl Distro {
    /// Category tag used to select config sections for this distro.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Arch => "arch",
            Self::Debian => "debian",
            Self::Fedora => "fedora",
            Self::Suse => "suse",
            Self::Other(id) => id,
        }
    }

    fn from_id(id: &str) -> Option<Self> {
        match id {
            "arch" | "manjaro" | "endeavouros" | "garuda" => Some(Self::Arch),
            "debian" | "ubuntu" | "linuxmint" | "pop" | "raspbian" => Some(Self::Debian),
            "fedora" | "rhel" | "centos" | "rocky" | "almalinux" => Some(Self::Fedora),
            "opensuse" | "opensuse-leap" | "opensuse-tumbleweed" | "suse" | "sles" => {
                Some(Self::Suse)
            }
            _ => None,
        }
    }

    /// Parse the contents of `/etc/os-release`.
    ///
    /// `ID` is tried first, then each word of `ID_LIKE`. An unrecognised
    /// distro is returned as [`Distro::Other`] with its `ID`, or `"unknown"`
    /// when no `ID` line is present.
    #[must_use]
    pub fn from_os_release(content: &str) -> Self {
        let mut id = None;
        let mut id_like = None;
        for line in content.lines() {
            if let Some((key, value)) = line.trim().split_once('=') {
                let value = value.trim().trim_matches('"').trim_matches('\'');
                match key {
                    "ID" => id = Some(value.to_lowercase()),
                    "ID_LIKE" => id_like = Some(value.to_lowercase()),
                    _ => {}
                }
            }
        }

        let id = id.unwrap_or_else(|| "unknown".to_string());
        Self::from_id(&id)
            .or_else(|| {
                id_like
                    .as_deref()
                    .and_then(|like| like.split_whitespace().find_map(Self::from_id))
            })
            .unwrap_or_else(|| Self::Other(category_tag(&id)))
    }

    /// Detect the distro from `/etc/os-release`.
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_from(Path::new("/etc/os-release"))
    }

    fn detect_from(path: &Path) -> Self {
        std::fs::read_to_string(path).map_or_else(
            |_| Self::Other("unknown".to_string()),
            |content| Self::from_os_release(&content),
        )
    }
}

impl fmt::Display for Distro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Graphical desktop session the user is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Desktop {
    /// KDE Plasma.
    Kde,
    /// GNOME.
    Gnome,
    /// Some other desktop, named by the category tag of the first
    /// `XDG_CURRENT_DESKTOP` entry.
    Other(String),
    /// No graphical session (console, SSH).
    Headless,
}

impl Desktop {
    /// Parse an `XDG_CURRENT_DESKTOP` value (colon-separated list).
    #[must_use]
    pub fn from_session(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self::Headless;
        };
        let names: Vec<String> = value.split(':').map(str::to_lowercase).collect();
        if names.iter().any(|n| n == "kde" || n == "plasma") {
            Self::Kde
        } else if names.iter().any(|n| n == "gnome") {
            Self::Gnome
        } else {
            names
                .into_iter()
                .next()
                .map_or(Self::Headless, |name| Self::Other(category_tag(&name)))
        }
    }

    /// Detect the desktop from the environment.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_session(std::env::var("XDG_CURRENT_DESKTOP").ok().as_deref())
    }

    /// Category tag, or `None` for a headless session.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Kde => Some("kde"),
            Self::Gnome => Some("gnome"),
            Self::Other(name) => Some(name),
            Self::Headless => None,
        }
    }
}

/// Turn a raw identifier into a category tag.
///
/// Section names join tags with `-`, so a tag must not contain one.
fn category_tag(raw: &str) -> String {
    raw.replace('-', "_")
}

/// Platform information for the current system.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Distribution family.
    pub distro: Distro,
    /// Desktop session.
    pub desktop: Desktop,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            distro: Distro::detect(),
            desktop: Desktop::detect(),
        }
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub const fn new(distro: Distro, desktop: Desktop) -> Self {
        Self { distro, desktop }
    }

    /// Active category tags: `base`, the distro tag, and the desktop tag.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut active = vec!["base".to_string(), self.distro.tag().to_string()];
        if let Some(tag) = self.desktop.tag() {
            active.push(tag.to_string());
        }
        active
    }
}
