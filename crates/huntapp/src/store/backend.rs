use crate::error::{Result, WriteError};
use std::path::PathBuf;

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while HuntStore handles the "what" (counter rules, snapshots, recovery).
///
/// Records are addressed by their ID, which is also the filename stem on disk.
/// Callers validate IDs before they reach a backend.
pub trait StorageBackend {
    // --- Canonical Records ---

    /// Read the raw bytes of a canonical record.
    /// Returns Ok(None) if the record does not exist.
    fn read_record(&self, id: &str) -> Result<Option<Vec<u8>>>;

    /// Durably replace a canonical record.
    /// MUST go through a temp file and a rename so the canonical record is
    /// never observed half-written.
    fn commit_record(&self, id: &str, bytes: &[u8]) -> std::result::Result<(), WriteError>;

    /// Overwrite a canonical record without the temp+rename dance.
    /// Only startup recovery uses this, before the record is live.
    fn write_record_plain(&self, id: &str, bytes: &[u8]) -> Result<()>;

    /// Remove a canonical record. Returns Ok(false) if it did not exist.
    fn delete_record(&self, id: &str) -> Result<bool>;

    /// List the IDs of all canonical records.
    fn list_record_ids(&self) -> Result<Vec<String>>;

    // --- Temp Files (crash residue) ---

    /// Read a leftover temp file for the record, if any.
    fn read_temp(&self, id: &str) -> Result<Option<Vec<u8>>>;

    /// Rename the temp file over the canonical record.
    fn promote_temp(&self, id: &str) -> Result<()>;

    /// Remove a leftover temp file. Returns Ok(false) if there was none.
    fn remove_temp(&self, id: &str) -> Result<bool>;

    // --- Snapshots ---

    /// Write an immutable snapshot under the given file name.
    fn write_snapshot(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// List every snapshot file name (unsorted).
    fn list_snapshots(&self) -> Result<Vec<String>>;

    fn read_snapshot(&self, name: &str) -> Result<Option<Vec<u8>>>;

    fn delete_snapshot(&self, name: &str) -> Result<()>;

    // --- Backups & Paths ---

    /// Copy every canonical record verbatim into a fresh backup location
    /// named by `label`. Returns where the copies went.
    fn backup_records(&self, label: &str) -> Result<PathBuf>;

    /// Root of the data directory. For MemBackend, a virtual path.
    fn data_dir(&self) -> PathBuf;
}
