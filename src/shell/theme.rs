use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PrefsError;

const PREFS_DIR_NAME: &str = "folio";
const PREFS_FILE_NAME: &str = "preferences.json";

pub const LIGHT_MODE_ICON: &str = "weather-clear-symbolic";
pub const DARK_MODE_ICON: &str = "weather-clear-night-symbolic";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    /// Icon for the toggle button: it shows the theme a click switches to.
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Theme::Dark => LIGHT_MODE_ICON,
            Theme::Light => DARK_MODE_ICON,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: Option<Theme>,
}

pub fn default_path() -> PathBuf {
    glib::user_config_dir()
        .join(PREFS_DIR_NAME)
        .join(PREFS_FILE_NAME)
}

impl Preferences {
    /// Missing file means defaults; anything else unreadable is an error.
    pub fn load(path: &Path) -> Result<Self, PrefsError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(PrefsError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&raw).map_err(|source| PrefsError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`Preferences::load`] but logs and falls back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|err| {
            warn!(error = %err, "ignoring unreadable preferences");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), PrefsError> {
        let data = serde_json::to_string_pretty(self).map_err(|source| PrefsError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        write_atomic(path, &data)
    }
}

fn write_atomic(path: &Path, data: &str) -> Result<(), PrefsError> {
    let io_err = |source: std::io::Error| PrefsError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data).map_err(io_err)?;
    fs::rename(&tmp_path, path).map_err(io_err)
}

/// A saved choice wins; otherwise follow the system.
pub fn resolve_theme(saved: Option<Theme>, system_prefers_dark: bool) -> Theme {
    match saved {
        Some(theme) => theme,
        None if system_prefers_dark => Theme::Dark,
        None => Theme::Light,
    }
}

/// Current theme plus write-through persistence of every change.
pub struct ThemeController {
    path: PathBuf,
    prefs: Preferences,
    current: Theme,
}

impl ThemeController {
    /// Reads the preference file once.
    pub fn load(path: PathBuf, system_prefers_dark: bool) -> Self {
        let prefs = Preferences::load_or_default(&path);
        let current = resolve_theme(prefs.theme, system_prefers_dark);
        debug!(?current, "theme resolved");
        ThemeController {
            path,
            prefs,
            current,
        }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn toggle(&mut self) -> Theme {
        self.set(self.current.toggled());
        self.current
    }

    pub fn set(&mut self, theme: Theme) {
        self.current = theme;
        self.prefs.theme = Some(theme);
        if let Err(err) = self.prefs.save(&self.path) {
            warn!(error = %err, "failed to persist theme");
        }
    }
}
