use super::backend::StorageBackend;
use crate::error::{HuntError, Result, WriteError};
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Where a simulated commit failure strikes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitFailure {
    /// The temp write fails; nothing is left behind.
    Temp,
    /// The temp write succeeds, the rename fails; the temp stays.
    Promote,
}

#[derive(Default)]
struct MemState {
    records: HashMap<String, Vec<u8>>,
    temps: HashMap<String, Vec<u8>>,
    snapshots: BTreeMap<String, Vec<u8>>,
    backups: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    commit_failure: Option<CommitFailure>,
    fail_snapshots: bool,
    commits: usize,
    snapshot_writes: usize,
}

/// In-memory storage backend for testing.
///
/// Uses a single `Mutex` so the backend is `Sync` and can sit behind a
/// store that is shared between threads.
#[derive(Default)]
pub struct MemBackend {
    state: Mutex<MemState>,
}

fn simulated(what: &str) -> io::Error {
    io::Error::other(format!("simulated {} failure", what))
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every following commit fail at the given stage (None clears it).
    pub fn set_commit_failure(&self, failure: Option<CommitFailure>) {
        self.state().commit_failure = failure;
    }

    pub fn set_fail_snapshots(&self, fail: bool) {
        self.state().fail_snapshots = fail;
    }

    /// Successful commits so far.
    pub fn commit_count(&self) -> usize {
        self.state().commits
    }

    /// Snapshot writes so far, including ones that reused a name.
    pub fn snapshot_write_count(&self) -> usize {
        self.state().snapshot_writes
    }

    /// Test helper: place raw bytes at the canonical path, bypassing commit.
    pub fn put_raw_record(&self, id: &str, bytes: &[u8]) {
        self.state().records.insert(id.to_string(), bytes.to_vec());
    }

    /// Test helper: leave a temp file behind as a crashed write would.
    pub fn put_raw_temp(&self, id: &str, bytes: &[u8]) {
        self.state().temps.insert(id.to_string(), bytes.to_vec());
    }

    pub fn has_temp(&self, id: &str) -> bool {
        self.state().temps.contains_key(id)
    }

    pub fn backup(&self, label: &str) -> Option<BTreeMap<String, Vec<u8>>> {
        self.state().backups.get(label).cloned()
    }
}

impl StorageBackend for MemBackend {
    fn read_record(&self, id: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.state().records.get(id).cloned())
    }

    fn commit_record(&self, id: &str, bytes: &[u8]) -> std::result::Result<(), WriteError> {
        let mut state = self.state();
        let temp = PathBuf::from(format!("memory://hunts/{}.tmp", id));
        let target = PathBuf::from(format!("memory://hunts/{}.json", id));

        match state.commit_failure {
            Some(CommitFailure::Temp) => Err(WriteError::Temp {
                path: temp,
                source: simulated("temp write"),
            }),
            Some(CommitFailure::Promote) => {
                state.temps.insert(id.to_string(), bytes.to_vec());
                Err(WriteError::Promote {
                    from: temp,
                    to: target,
                    source: simulated("rename"),
                })
            }
            None => {
                state.records.insert(id.to_string(), bytes.to_vec());
                state.temps.remove(id);
                state.commits += 1;
                Ok(())
            }
        }
    }

    fn write_record_plain(&self, id: &str, bytes: &[u8]) -> Result<()> {
        self.state().records.insert(id.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete_record(&self, id: &str) -> Result<bool> {
        Ok(self.state().records.remove(id).is_some())
    }

    fn list_record_ids(&self) -> Result<Vec<String>> {
        Ok(self.state().records.keys().cloned().collect())
    }

    fn read_temp(&self, id: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.state().temps.get(id).cloned())
    }

    fn promote_temp(&self, id: &str) -> Result<()> {
        let mut state = self.state();
        let bytes = state
            .temps
            .remove(id)
            .ok_or_else(|| HuntError::Store(format!("no temp file for {}", id)))?;
        state.records.insert(id.to_string(), bytes);
        Ok(())
    }

    fn remove_temp(&self, id: &str) -> Result<bool> {
        Ok(self.state().temps.remove(id).is_some())
    }

    fn write_snapshot(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let mut state = self.state();
        if state.fail_snapshots {
            return Err(HuntError::Io(simulated("snapshot write")));
        }
        state.snapshots.insert(name.to_string(), bytes.to_vec());
        state.snapshot_writes += 1;
        Ok(())
    }

    fn list_snapshots(&self) -> Result<Vec<String>> {
        Ok(self.state().snapshots.keys().cloned().collect())
    }

    fn read_snapshot(&self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.state().snapshots.get(name).cloned())
    }

    fn delete_snapshot(&self, name: &str) -> Result<()> {
        self.state().snapshots.remove(name);
        Ok(())
    }

    fn backup_records(&self, label: &str) -> Result<PathBuf> {
        let mut state = self.state();
        let copies: BTreeMap<String, Vec<u8>> = state
            .records
            .iter()
            .map(|(id, bytes)| (format!("{}.json", id), bytes.clone()))
            .collect();
        state.backups.insert(label.to_string(), copies);
        Ok(PathBuf::from(format!("memory://emergency-backups/{}", label)))
    }

    fn data_dir(&self) -> PathBuf {
        PathBuf::from("memory://")
    }
}
