//! # Configuration
//!
//! Engine configuration is loaded with [`confique`] from layered sources.
//! User-facing preferences (theme, hotkeys, the mirror folder) live elsewhere,
//! in [`crate::settings`].
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Environment variables**: `HUNT_DATA_DIR`, `HUNT_SNAPSHOT_INTERVAL`,
//!    `HUNT_SNAPSHOT_KEEP_LAST`, `HUNT_SNAPSHOT_ONE_PER_DAY`.
//! 2. **Config file**: `hunt.toml` in the OS config directory (via the
//!    `directories` crate), or an explicit path.
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key                     | Default     | Description                                   |
//! |-------------------------|-------------|-----------------------------------------------|
//! | `data_dir`              | OS data dir | Root of `hunts/`, `snapshots/`, ...           |
//! | `snapshot.interval`     | `30`        | Snapshot every N encounters (0 disables)      |
//! | `snapshot.trigger`      | `observed`  | `observed` or `phase-changed`                 |
//! | `snapshot.keep_last`    | unset       | Keep only the newest N snapshots per hunt     |
//! | `snapshot.one_per_day`  | `false`     | Keep only the newest snapshot per hunt per day|
//!
//! `keep_last` takes precedence over `one_per_day` when both are set.

use crate::error::{HuntError, Result};
use crate::store::snapshot::{
    Retention, SnapshotPolicy, SnapshotTrigger, DEFAULT_SNAPSHOT_INTERVAL,
};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "hunt.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Data directory. When absent, the OS-appropriate data directory is used.
    #[config(env = "HUNT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[config(nested)]
    pub snapshot: SnapshotConfig,
}

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Snapshot whenever the counter is a multiple of this (0 disables).
    #[config(env = "HUNT_SNAPSHOT_INTERVAL", default = 30)]
    pub interval: u64,

    /// "observed" snapshots every save once a hunt has a phase;
    /// "phase-changed" only on saves that change the phase list.
    #[config(default = "observed")]
    pub trigger: SnapshotTrigger,

    #[config(env = "HUNT_SNAPSHOT_KEEP_LAST")]
    pub keep_last: Option<usize>,

    #[config(env = "HUNT_SNAPSHOT_ONE_PER_DAY", default = false)]
    pub one_per_day: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            snapshot: SnapshotConfig::default(),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SNAPSHOT_INTERVAL,
            trigger: SnapshotTrigger::Observed,
            keep_last: None,
            one_per_day: false,
        }
    }
}

impl SnapshotConfig {
    pub fn retention(&self) -> Retention {
        match (self.keep_last, self.one_per_day) {
            (Some(n), _) => Retention::KeepLast(n),
            (None, true) => Retention::OnePerDay,
            (None, false) => Retention::KeepAll,
        }
    }

    pub fn policy(&self) -> SnapshotPolicy {
        SnapshotPolicy {
            interval: self.interval,
            trigger: self.trigger,
            retention: self.retention(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "hunt", "hunt")
}

/// `hunt.toml` in the OS config directory, if one can be determined.
pub fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// The OS data directory used when nothing else is configured.
pub fn default_data_dir() -> Result<PathBuf> {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| HuntError::Config("could not determine a data directory".to_string()))
}

impl EngineConfig {
    /// Loads environment, then `file` (or the default config file), then
    /// defaults. A missing file is not an error.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        match file {
            Some(path) => builder = builder.file(path),
            None => {
                if let Some(path) = default_config_file() {
                    builder = builder.file(path);
                }
            }
        }
        builder
            .load()
            .map_err(|e| HuntError::Config(e.to_string()))
    }

    /// Loads a single file with defaults underneath, ignoring the environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::builder()
            .file(path)
            .load()
            .map_err(|e| HuntError::Config(e.to_string()))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_default_policy() {
        let config = EngineConfig::default();
        assert_eq!(config.snapshot.policy(), SnapshotPolicy::default());
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = EngineConfig::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "data_dir = \"/srv/hunts\"\n\n[snapshot]\ninterval = 50\ntrigger = \"phase-changed\"\nkeep_last = 5\n",
        )
        .unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/srv/hunts"));
        assert_eq!(
            config.snapshot.policy(),
            SnapshotPolicy {
                interval: 50,
                trigger: SnapshotTrigger::PhaseChanged,
                retention: Retention::KeepLast(5),
            }
        );
    }

    #[test]
    fn serialized_defaults_load_back_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, toml::to_string(&EngineConfig::default()).unwrap()).unwrap();
        assert_eq!(EngineConfig::from_file(&path).unwrap(), EngineConfig::default());
    }

    #[test]
    fn keep_last_wins_over_one_per_day() {
        let snapshot = SnapshotConfig {
            keep_last: Some(3),
            one_per_day: true,
            ..Default::default()
        };
        assert_eq!(snapshot.retention(), Retention::KeepLast(3));

        let daily = SnapshotConfig {
            one_per_day: true,
            ..Default::default()
        };
        assert_eq!(daily.retention(), Retention::OnePerDay);
    }
}
