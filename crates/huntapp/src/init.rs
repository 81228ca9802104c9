//! # Startup
//!
//! [`initialize`] turns an [`EngineConfig`] into a ready [`HuntContext`]:
//!
//! 1. Resolve the data directory: `data_dir` from the config (which the
//!    `HUNT_DATA_DIR` environment variable feeds), else the OS data directory.
//! 2. Create `hunts/`, `snapshots/` and `config/` if missing.
//! 3. Load `config/settings.json` (defaults are written when it is missing or
//!    unreadable) and wire the text mirror to it.
//! 4. Run the integrity scan and recovery over every record. The store is not
//!    handed out until this completes.

use crate::api::HuntApi;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::mirror::TextMirror;
use crate::recovery::RecoveryReport;
use crate::settings::SettingsStore;
use crate::store::{FsBackend, HuntStore};
use log::{debug, info, warn};
use std::sync::Arc;

pub struct HuntContext {
    pub api: HuntApi<FsBackend>,
    pub config: EngineConfig,
    /// What the startup scan found and fixed.
    pub report: RecoveryReport,
}

pub fn initialize(config: EngineConfig) -> Result<HuntContext> {
    let data_dir = config.data_dir()?;
    debug!("using data directory {}", data_dir.display());

    let backend = FsBackend::new(&data_dir);
    backend.ensure_layout()?;
    let config_dir = backend.config_dir();

    let settings = Arc::new(SettingsStore::load(&config_dir)?);
    let store = HuntStore::with_backend(backend)
        .with_policy(config.snapshot.policy())
        .with_observer(TextMirror::new(Arc::clone(&settings)));

    let report = store.scan_and_recover();
    if report.is_clean() {
        debug!("integrity scan: all records parse");
    } else {
        info!(
            "integrity scan: recovered {}/{} corrupted record(s)",
            report.recovered.len(),
            report.corrupted.len()
        );
        for id in report.unrecoverable() {
            warn!("record {} could not be recovered", id);
        }
    }

    Ok(HuntContext {
        api: HuntApi::new(store, settings),
        config,
        report,
    })
}
