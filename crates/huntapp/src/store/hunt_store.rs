use super::backend::StorageBackend;
use super::snapshot::{snapshots_for, SnapshotManager, SnapshotPolicy};
use super::validate_id;
use crate::error::{HuntError, Result};
use crate::mirror::CommitObserver;
use crate::model::{Hunt, HuntUpdate, NewHunt, Odds};
use crate::recovery::{scan_record, RecoveryReport};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

type Observer = Box<dyn CommitObserver + Send + Sync>;

pub struct HuntStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    policy: SnapshotPolicy,
    observer: Option<Observer>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<B: StorageBackend> HuntStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            policy: SnapshotPolicy::default(),
            observer: None,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_policy(mut self, policy: SnapshotPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Registers the observer notified after every successful commit.
    pub fn with_observer(mut self, observer: impl CommitObserver + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn policy(&self) -> &SnapshotPolicy {
        &self.policy
    }

    fn lock_for(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops the map entry for `id` unless another caller still holds it.
    /// Takes the caller's handle so it is counted and then released.
    fn release_lock(&self, id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one in `lock`.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(id);
        }
    }

    // --- CRUD ---

    pub fn create(&self, data: NewHunt) -> Result<Hunt> {
        if data.name.trim().is_empty() {
            return Err(HuntError::Invalid("hunt name cannot be empty".to_string()));
        }
        Odds::new(data.base_odds.numerator, data.base_odds.denominator)?;

        let hunt = Hunt::new(data);
        let lock = self.lock_for(&hunt.id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.commit(&hunt, None)?;
        debug!("created hunt {}", hunt.id);
        Ok(hunt)
    }

    /// Reads a hunt. Missing and unparseable records both come back as `None`;
    /// recovery only happens at startup.
    pub fn get(&self, id: &str) -> Option<Hunt> {
        if validate_id(id).is_err() {
            debug!("ignoring lookup of invalid id {:?}", id);
            return None;
        }
        self.load(id)
    }

    fn load(&self, id: &str) -> Option<Hunt> {
        let bytes = match self.backend.read_record(id) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!("could not read hunt {}: {}", id, e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(hunt) => Some(hunt),
            Err(e) => {
                warn!("hunt {} does not parse: {}", id, e);
                None
            }
        }
    }

    /// Applies the updates in order. If any is rejected nothing is committed.
    pub fn update(&self, id: &str, updates: Vec<HuntUpdate>) -> Result<Option<Hunt>> {
        self.mutate(id, |hunt| {
            for update in updates {
                hunt.apply(update)?;
            }
            Ok(true)
        })
    }

    /// Removes the canonical record. Snapshots stay behind.
    pub fn delete(&self, id: &str) -> bool {
        if validate_id(id).is_err() {
            return false;
        }
        let lock = self.lock_for(id);
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let deleted = match self.backend.delete_record(id) {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!("could not delete hunt {}: {}", id, e);
                false
            }
        };
        drop(guard);
        self.release_lock(id, lock);
        deleted
    }

    /// Every readable hunt, most recently updated first.
    pub fn list(&self) -> Vec<Hunt> {
        let ids = match self.backend.list_record_ids() {
            Ok(ids) => ids,
            Err(e) => {
                warn!("could not list hunts: {}", e);
                return Vec::new();
            }
        };
        let mut hunts: Vec<Hunt> = ids
            .iter()
            .filter(|id| validate_id(id).is_ok())
            .filter_map(|id| self.load(id))
            .collect();
        hunts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        hunts
    }

    // --- Counter & Phases ---

    pub fn increment_counter(&self, id: &str) -> Result<Option<Hunt>> {
        self.mutate(id, |hunt| {
            hunt.increment();
            Ok(true)
        })
    }

    /// At zero this returns the unchanged hunt without writing anything.
    pub fn decrement_counter(&self, id: &str) -> Result<Option<Hunt>> {
        self.mutate(id, |hunt| Ok(hunt.decrement()))
    }

    pub fn set_counter(&self, id: &str, value: i64) -> Result<Option<Hunt>> {
        self.mutate(id, |hunt| {
            hunt.set_count(value);
            Ok(true)
        })
    }

    pub fn append_phase(
        &self,
        id: &str,
        species: &str,
        is_target: bool,
        notes: Option<String>,
    ) -> Result<Option<Hunt>> {
        if species.trim().is_empty() {
            return Err(HuntError::Invalid("phase species cannot be empty".to_string()));
        }
        self.mutate(id, |hunt| {
            hunt.push_phase(species, is_target, notes);
            Ok(true)
        })
    }

    /// An unknown phase ID returns the unchanged hunt without writing anything.
    pub fn remove_phase(&self, id: &str, phase_id: &str) -> Result<Option<Hunt>> {
        self.mutate(id, |hunt| Ok(hunt.remove_phase(phase_id)))
    }

    // --- Maintenance ---

    /// Commits a complete hunt as-is, replacing any record with the same ID.
    /// Used by import.
    pub fn restore(&self, hunt: &Hunt) -> Result<()> {
        validate_id(&hunt.id)?;
        let lock = self.lock_for(&hunt.id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.commit(hunt, None)
    }

    /// Snapshot names of one hunt, newest first.
    pub fn snapshots(&self, id: &str) -> Result<Vec<String>> {
        validate_id(id)?;
        snapshots_for(&self.backend, id)
    }

    /// Walks every canonical record, recovering the ones that do not parse.
    /// Each record is checked under its own lock.
    pub fn scan_and_recover(&self) -> RecoveryReport {
        let mut report = RecoveryReport::default();
        let ids = match self.backend.list_record_ids() {
            Ok(ids) => ids,
            Err(e) => {
                warn!("could not list hunts for the integrity scan: {}", e);
                return report;
            }
        };

        for id in ids {
            if validate_id(&id).is_err() {
                warn!("skipping record with unexpected file name {:?}", id);
                continue;
            }
            let lock = self.lock_for(&id);
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            scan_record(&self.backend, &id, &mut report);
        }
        report
    }

    // --- Internals ---

    /// Read-modify-write under the hunt's lock. `change` returns whether it
    /// changed anything; a no-op skips the commit.
    fn mutate<F>(&self, id: &str, change: F) -> Result<Option<Hunt>>
    where
        F: FnOnce(&mut Hunt) -> Result<bool>,
    {
        if validate_id(id).is_err() {
            return Ok(None);
        }
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(mut hunt) = self.load(id) else {
            return Ok(None);
        };
        let phases_before = hunt.phases.len();
        if !change(&mut hunt)? {
            return Ok(Some(hunt));
        }
        hunt.touch();
        self.commit(&hunt, Some(phases_before))?;
        Ok(Some(hunt))
    }

    /// Caller holds the hunt's lock.
    fn commit(&self, hunt: &Hunt, phases_before: Option<usize>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(hunt)?;
        self.backend.commit_record(&hunt.id, &bytes)?;

        let snapshots = SnapshotManager::new(&self.backend, &self.policy);
        if let Err(e) = snapshots.maybe_snapshot(hunt, &bytes, phases_before) {
            warn!("snapshot of {} failed: {}", hunt.id, e);
        }

        if let Some(observer) = &self.observer {
            if let Err(e) = observer.on_commit(hunt) {
                warn!("commit observer failed for {}: {}", hunt.id, e);
            }
        }
        Ok(())
    }
}
