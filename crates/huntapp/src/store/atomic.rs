//! Atomic record commits: write `<id>.tmp`, sync it, rename to `<id>.json`.
//!
//! Rename is the only step that touches the canonical path, so a crash at any
//! point leaves either the previous canonical file or the new one, never a
//! mix. A temp file found at rest afterwards is crash residue and is handled
//! by startup recovery.

use crate::error::WriteError;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const RECORD_EXT: &str = "json";
pub const TEMP_EXT: &str = "tmp";

#[derive(Debug, Clone)]
pub struct AtomicWriter {
    dir: PathBuf,
}

impl AtomicWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn canonical_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, RECORD_EXT))
    }

    pub fn temp_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, TEMP_EXT))
    }

    pub fn commit(&self, id: &str, bytes: &[u8]) -> Result<(), WriteError> {
        let temp = self.temp_path(id);
        let target = self.canonical_path(id);

        if let Err(source) = write_synced(&temp, bytes) {
            // Best effort; the canonical file is untouched either way.
            let _ = fs::remove_file(&temp);
            return Err(WriteError::Temp { path: temp, source });
        }

        // On failure the temp file stays: it is a complete, valid candidate
        // for recovery.
        if let Err(source) = fs::rename(&temp, &target) {
            return Err(WriteError::Promote {
                from: temp,
                to: target,
                source,
            });
        }

        sync_dir(&self.dir);
        Ok(())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Persist the rename itself. Not all platforms allow opening a directory,
/// so failures are ignored.
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, AtomicWriter) {
        let dir = TempDir::new().unwrap();
        let writer = AtomicWriter::new(dir.path());
        (dir, writer)
    }

    #[test]
    fn commit_writes_canonical_and_leaves_no_temp() {
        let (_dir, writer) = setup();
        writer.commit("hunt_1_a", b"{\"v\":1}").unwrap();

        assert_eq!(
            fs::read(writer.canonical_path("hunt_1_a")).unwrap(),
            b"{\"v\":1}"
        );
        assert!(!writer.temp_path("hunt_1_a").exists());
    }

    #[test]
    fn commit_replaces_previous_version() {
        let (_dir, writer) = setup();
        writer.commit("hunt_1_a", b"old").unwrap();
        writer.commit("hunt_1_a", b"new").unwrap();
        assert_eq!(fs::read(writer.canonical_path("hunt_1_a")).unwrap(), b"new");
    }

    #[test]
    fn temp_failure_leaves_canonical_untouched() {
        let (_dir, writer) = setup();
        writer.commit("hunt_1_a", b"committed").unwrap();

        // A directory squatting on the temp path makes File::create fail.
        fs::create_dir(writer.temp_path("hunt_1_a")).unwrap();

        let err = writer.commit("hunt_1_a", b"never lands").unwrap_err();
        assert!(matches!(err, WriteError::Temp { .. }));
        assert_eq!(
            fs::read(writer.canonical_path("hunt_1_a")).unwrap(),
            b"committed"
        );
    }

    #[test]
    fn promote_failure_keeps_temp_for_recovery() {
        let (_dir, writer) = setup();

        // A non-empty directory at the canonical path makes rename fail.
        let canonical = writer.canonical_path("hunt_1_a");
        fs::create_dir(&canonical).unwrap();
        fs::write(canonical.join("blocker"), b"x").unwrap();

        let err = writer.commit("hunt_1_a", b"complete").unwrap_err();
        assert!(matches!(err, WriteError::Promote { .. }));
        assert_eq!(fs::read(writer.temp_path("hunt_1_a")).unwrap(), b"complete");
    }
}
