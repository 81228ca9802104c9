//! Persisted user settings (`config/settings.json`).
//!
//! The engine itself only reads `obsTextFolder` and `numberSeparator` (for the
//! text mirror). The rest is state owned by front ends, stored here so every
//! client sees the same values. Keys this version does not know about are
//! kept and written back untouched.

use crate::error::Result;
use crate::store::atomic::AtomicWriter;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

const SETTINGS_STEM: &str = "settings";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFormat {
    #[serde(rename = "DD.MM.YYYY")]
    DayMonthYearDots,
    #[serde(rename = "MM/DD/YYYY")]
    MonthDayYear,
    #[serde(rename = "DD/MM/YYYY")]
    DayMonthYear,
    #[default]
    #[serde(rename = "YYYY-MM-DD")]
    Iso,
    #[serde(rename = "DD-MMM-YYYY")]
    DayShortMonthYear,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFormat {
    #[serde(rename = "12h")]
    TwelveHour,
    #[default]
    #[serde(rename = "24h")]
    TwentyFourHour,
}

/// Digit grouping character used when numbers are rendered for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberSeparator {
    #[default]
    Comma,
    Dot,
    /// U+2009 THIN SPACE
    Thin,
}

impl NumberSeparator {
    pub fn as_char(self) -> char {
        match self {
            NumberSeparator::Comma => ',',
            NumberSeparator::Dot => '.',
            NumberSeparator::Thin => '\u{2009}',
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayVariant {
    #[default]
    Badge,
    Compact,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlaySettings {
    pub variant: OverlayVariant,
    pub click_through: bool,
    pub always_on_top: bool,
    pub enabled: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            variant: OverlayVariant::Badge,
            click_through: true,
            always_on_top: true,
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Hotkeys {
    pub increment: String,
    pub decrement: String,
    pub phase: String,
    pub toggle_global: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_switch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zen_mode: Option<String>,
}

impl Default for Hotkeys {
    fn default() -> Self {
        Self {
            increment: "Space".to_string(),
            decrement: "CommandOrControl+Z".to_string(),
            phase: "CommandOrControl+P".to_string(),
            toggle_global: "CommandOrControl+Shift+G".to_string(),
            quick_switch: None,
            zen_mode: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    #[default]
    None,
    Icloud,
    Googledrive,
    Dropbox,
    Onedrive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Cloud sync is configuration only; nothing in the engine acts on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudSync {
    pub provider: CloudProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CloudStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub date_format: DateFormat,
    pub time_format: TimeFormat,
    pub number_separator: NumberSeparator,
    pub cloud_sync: CloudSync,
    pub overlay: OverlaySettings,
    pub hotkeys: Hotkeys,
    /// Folder the text mirror writes into. Empty disables the mirror.
    pub obs_text_folder: String,
    pub safe_mode_apps: Vec<String>,
    pub global_hotkeys_enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            date_format: DateFormat::default(),
            time_format: TimeFormat::default(),
            number_separator: NumberSeparator::default(),
            cloud_sync: CloudSync::default(),
            overlay: OverlaySettings::default(),
            hotkeys: Hotkeys::default(),
            obs_text_folder: String::new(),
            safe_mode_apps: vec!["Photoshop.exe".to_string(), "Premiere.exe".to_string()],
            global_hotkeys_enabled: false,
            extra: Map::new(),
        }
    }
}

/// Shared, persisted settings. Reads are cheap clones; updates are written
/// through before they become visible.
pub struct SettingsStore {
    writer: Option<AtomicWriter>,
    current: RwLock<Settings>,
}

impl SettingsStore {
    /// Loads `settings.json` from `config_dir`. A missing or unreadable file
    /// is replaced by the defaults.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let writer = AtomicWriter::new(config_dir);
        let path = writer.canonical_path(SETTINGS_STEM);

        let parsed = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Settings>(&bytes) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    warn!("settings file {} is invalid, using defaults: {}", path.display(), e);
                    None
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("could not read {}, using defaults: {}", path.display(), e);
                None
            }
        };

        let store = Self {
            writer: Some(writer),
            current: RwLock::new(parsed.clone().unwrap_or_default()),
        };
        if parsed.is_none() {
            fs::create_dir_all(config_dir)?;
            store.persist(&store.get())?;
            debug!("wrote default settings to {}", path.display());
        }
        Ok(store)
    }

    /// A store that never touches disk.
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            writer: None,
            current: RwLock::new(settings),
        }
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.writer.as_ref().map(|w| w.canonical_path(SETTINGS_STEM))
    }

    pub fn get(&self) -> Settings {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applies `change` to a copy, persists it, then publishes it.
    /// On a failed write the previous settings stay in effect.
    pub fn update<F>(&self, change: F) -> Result<Settings>
    where
        F: FnOnce(&mut Settings),
    {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = current.clone();
        change(&mut next);
        self.persist(&next)?;
        *current = next.clone();
        Ok(next)
    }

    fn persist(&self, settings: &Settings) -> Result<()> {
        if let Some(writer) = &self.writer {
            let bytes = serde_json::to_vec_pretty(settings)?;
            writer.commit(SETTINGS_STEM, &bytes)?;
        }
        Ok(())
    }
}
