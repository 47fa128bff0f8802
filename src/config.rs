use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ── Wire types ────────────────────────────────────────────────────────────────

/// Normalized description of the installation the user asked for.
/// Built fresh on every submit and sent as the JSON body of `/generate-config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationRequest {
    pub username: String,
    pub hostname: String,
    pub timezone: String,
    pub keymap: String,
    pub desktop_environment: String,
    pub aur_helper: String,
    pub install_type: String,
    pub optional_packages: BTreeSet<String>,
}

/// The service's answer. `config` is opaque text and is never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerationResult {
    pub config: String,
}

// ── Form state ────────────────────────────────────────────────────────────────

/// One optional-package checkbox as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageToggle {
    pub value: String,
    pub checked: bool,
}

/// Values of every form control at the moment the user submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    pub username: String,
    pub hostname: String,
    pub timezone: String,
    pub keymap: String,
    pub desktop_environment: String,
    pub aur_helper: String,
    pub install_type: String,
    pub optional_packages: Vec<PackageToggle>,
}

impl Default for FormSnapshot {
    fn default() -> Self {
        Self {
            username: String::new(),
            hostname: String::new(),
            timezone: "UTC".to_string(),
            keymap: "us".to_string(),
            desktop_environment: DesktopEnvironment::ALL[0].value().to_string(),
            aur_helper: AurHelper::ALL[0].value().to_string(),
            install_type: InstallType::ALL[0].value().to_string(),
            optional_packages: OPTIONAL_PACKAGES
                .iter()
                .map(|(value, _)| PackageToggle {
                    value: (*value).to_string(),
                    checked: false,
                })
                .collect(),
        }
    }
}

// ── Enumerated choices ────────────────────────────────────────────────────────

/// A single-valued selection offered by the form.
pub trait Choice: Copy + 'static {
    const ALL: &'static [Self];

    /// Value forwarded to the generation service.
    fn value(self) -> &'static str;

    /// Human-readable label shown to the user.
    fn display_name(self) -> &'static str;

    fn position(value: &str) -> Option<usize> {
        Self::ALL.iter().position(|c| c.value() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopEnvironment {
    None,
    Xfce,
    Plasma,
    Gnome,
    Cinnamon,
    Mate,
    Lxqt,
}

impl Choice for DesktopEnvironment {
    const ALL: &'static [Self] = &[
        Self::None,
        Self::Xfce,
        Self::Plasma,
        Self::Gnome,
        Self::Cinnamon,
        Self::Mate,
        Self::Lxqt,
    ];

    fn value(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Xfce => "xfce4",
            Self::Plasma => "plasma",
            Self::Gnome => "gnome",
            Self::Cinnamon => "cinnamon",
            Self::Mate => "mate",
            Self::Lxqt => "lxqt",
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            Self::None => "None (console only)",
            Self::Xfce => "Xfce",
            Self::Plasma => "KDE Plasma",
            Self::Gnome => "GNOME",
            Self::Cinnamon => "Cinnamon",
            Self::Mate => "MATE",
            Self::Lxqt => "LXQt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AurHelper {
    Yay,
    Paru,
    None,
}

impl Choice for AurHelper {
    const ALL: &'static [Self] = &[Self::Yay, Self::Paru, Self::None];

    fn value(self) -> &'static str {
        match self {
            Self::Yay => "yay",
            Self::Paru => "paru",
            Self::None => "none",
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            Self::Yay => "yay (Go)",
            Self::Paru => "paru (Rust)",
            Self::None => "No AUR helper",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallType {
    Minimal,
    Standard,
    Full,
}

impl Choice for InstallType {
    const ALL: &'static [Self] = &[Self::Minimal, Self::Standard, Self::Full];

    fn value(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Standard => "standard",
            Self::Full => "full",
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            Self::Minimal => "Minimal (base system only)",
            Self::Standard => "Standard (desktop + common tools)",
            Self::Full => "Full (everything in the catalogue)",
        }
    }
}

/// Optional packages offered as checkboxes: `(package, description)`.
pub const OPTIONAL_PACKAGES: &[(&str, &str)] = &[
    ("firefox", "web browser"),
    ("chromium", "web browser"),
    ("thunderbird", "mail client"),
    ("libreoffice-fresh", "office suite"),
    ("gimp", "image editor"),
    ("vlc", "media player"),
    ("neovim", "text editor"),
    ("git", "version control"),
    ("htop", "process viewer"),
    ("flatpak", "sandboxed applications"),
    ("docker", "container runtime"),
    ("steam", "game platform"),
];
