//! # API Facade
//!
//! The API layer is a **thin facade** over the store. It is the single entry
//! point for all hunt operations, regardless of the UI being used.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Resolves selectors**: a hunt may be named by its ID or by its 1-based
//!   position in [`HuntApi::list_hunts`]; a phase by its ID or its 1-based
//!   position in the hunt's phase log.
//! - **Turns absence into errors**: the store answers "not found" with `None`;
//!   the API reports [`HuntError::HuntNotFound`] so clients get one error path.
//! - **Groups the maintenance surface**: recovery, the integrity report,
//!   backups, export/import and settings.
//!
//! ## What the API Does NOT Do
//!
//! - **Counter rules**: those live in [`crate::model`].
//! - **Durability**: that is [`crate::store`].
//! - **Presentation**: it returns data structures, never strings for display.
//!
//! ## Generic Over StorageBackend
//!
//! - Production: `HuntApi<FsBackend>`
//! - Testing: `HuntApi<MemBackend>`

use crate::backup::{backup_all, export_hunts, import_hunts};
use crate::error::{HuntError, Result};
use crate::integrity::{check_integrity, IntegrityReport};
use crate::mirror::{validate_output_folder, FolderCheck};
use crate::model::{Hunt, HuntUpdate, NewHunt};
use crate::recovery::RecoveryReport;
use crate::settings::{Settings, SettingsStore};
use crate::store::backend::StorageBackend;
use crate::store::{validate_id, HuntStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct HuntApi<B: StorageBackend> {
    store: HuntStore<B>,
    settings: Arc<SettingsStore>,
}

impl<B: StorageBackend> HuntApi<B> {
    pub fn new(store: HuntStore<B>, settings: Arc<SettingsStore>) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &HuntStore<B> {
        &self.store
    }

    /// Resolves a hunt selector (ID or 1-based list position) to an ID.
    pub fn resolve(&self, selector: &str) -> Result<String> {
        let selector = selector.trim();
        if let Ok(position) = selector.parse::<usize>() {
            let hunts = self.store.list();
            return position
                .checked_sub(1)
                .and_then(|i| hunts.get(i))
                .map(|hunt| hunt.id.clone())
                .ok_or_else(|| HuntError::HuntNotFound(format!("#{}", position)));
        }
        validate_id(selector)?;
        Ok(selector.to_string())
    }

    fn found(selector: &str, hunt: Option<Hunt>) -> Result<Hunt> {
        hunt.ok_or_else(|| HuntError::HuntNotFound(selector.to_string()))
    }

    // --- Hunts ---

    pub fn create_hunt(&self, data: NewHunt) -> Result<Hunt> {
        self.store.create(data)
    }

    pub fn list_hunts(&self) -> Vec<Hunt> {
        self.store.list()
    }

    pub fn get_hunt(&self, selector: &str) -> Result<Hunt> {
        let id = self.resolve(selector)?;
        Self::found(selector, self.store.get(&id))
    }

    pub fn update_hunt(&self, selector: &str, updates: Vec<HuntUpdate>) -> Result<Hunt> {
        let id = self.resolve(selector)?;
        Self::found(selector, self.store.update(&id, updates)?)
    }

    /// Returns the deleted hunt's ID.
    pub fn delete_hunt(&self, selector: &str) -> Result<String> {
        let id = self.resolve(selector)?;
        if self.store.delete(&id) {
            Ok(id)
        } else {
            Err(HuntError::HuntNotFound(selector.to_string()))
        }
    }

    // --- Counter & Phases ---

    pub fn increment(&self, selector: &str) -> Result<Hunt> {
        let id = self.resolve(selector)?;
        Self::found(selector, self.store.increment_counter(&id)?)
    }

    pub fn decrement(&self, selector: &str) -> Result<Hunt> {
        let id = self.resolve(selector)?;
        Self::found(selector, self.store.decrement_counter(&id)?)
    }

    pub fn set_count(&self, selector: &str, value: i64) -> Result<Hunt> {
        let id = self.resolve(selector)?;
        Self::found(selector, self.store.set_counter(&id, value)?)
    }

    pub fn add_phase(
        &self,
        selector: &str,
        species: &str,
        is_target: bool,
        notes: Option<String>,
    ) -> Result<Hunt> {
        let id = self.resolve(selector)?;
        Self::found(
            selector,
            self.store.append_phase(&id, species, is_target, notes)?,
        )
    }

    /// `phase` is a phase ID or the phase's 1-based position in the log.
    /// An unknown phase leaves the hunt unchanged.
    pub fn remove_phase(&self, selector: &str, phase: &str) -> Result<Hunt> {
        let hunt = self.get_hunt(selector)?;
        let phase_id = match phase.trim().parse::<usize>() {
            Ok(position) => match position.checked_sub(1).and_then(|i| hunt.phases.get(i)) {
                Some(p) => p.id.clone(),
                None => return Ok(hunt),
            },
            Err(_) => phase.trim().to_string(),
        };
        Self::found(selector, self.store.remove_phase(&hunt.id, &phase_id)?)
    }

    /// Snapshot names of a hunt, newest first.
    pub fn snapshots(&self, selector: &str) -> Result<Vec<String>> {
        let id = self.resolve(selector)?;
        self.store.snapshots(&id)
    }

    // --- Maintenance ---

    pub fn scan_and_recover(&self) -> RecoveryReport {
        self.store.scan_and_recover()
    }

    pub fn check_integrity(&self) -> IntegrityReport {
        check_integrity(self.store.backend())
    }

    pub fn emergency_backup(&self) -> Option<PathBuf> {
        backup_all(self.store.backend())
    }

    pub fn export(&self, path: &Path) -> Result<usize> {
        export_hunts(&self.store, path)
    }

    pub fn import(&self, path: &Path) -> Result<Vec<Hunt>> {
        import_hunts(&self.store, path)
    }

    pub fn data_directory(&self) -> PathBuf {
        self.store.backend().data_dir()
    }

    // --- Settings ---

    pub fn settings(&self) -> Settings {
        self.settings.get()
    }

    pub fn update_settings<F>(&self, change: F) -> Result<Settings>
    where
        F: FnOnce(&mut Settings),
    {
        self.settings.update(change)
    }

    pub fn validate_output_folder(&self, path: &Path) -> FolderCheck {
        validate_output_folder(path)
    }
}
