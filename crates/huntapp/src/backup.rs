//! Emergency backups and JSON export/import.

use crate::error::{HuntError, Result};
use crate::integrity::validate;
use crate::model::Hunt;
use crate::store::backend::StorageBackend;
use crate::store::snapshot::snapshot_timestamp;
use crate::store::{validate_id, HuntStore};
use chrono::Utc;
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Copies every canonical record verbatim into
/// `emergency-backups/<timestamp>/`. Returns `None` on any failure; copies
/// made before the failure are left in place.
pub fn backup_all<B: StorageBackend>(backend: &B) -> Option<PathBuf> {
    let label = snapshot_timestamp(Utc::now());
    match backend.backup_records(&label) {
        Ok(path) => {
            info!("emergency backup created: {}", path.display());
            Some(path)
        }
        Err(e) => {
            error!("failed to create emergency backup: {}", e);
            None
        }
    }
}

/// Writes every readable hunt to `path` as a pretty-printed JSON array.
/// Returns how many hunts were written.
pub fn export_hunts<B: StorageBackend>(store: &HuntStore<B>, path: &Path) -> Result<usize> {
    let hunts = store.list();
    let bytes = serde_json::to_vec_pretty(&hunts)?;
    fs::write(path, bytes)?;
    info!("exported {} hunt(s) to {}", hunts.len(), path.display());
    Ok(hunts.len())
}

/// Reads a JSON array of hunts (as written by [`export_hunts`]) and commits
/// each one. A hunt with an existing ID replaces it. The file is parsed and
/// validated in full before anything is written.
pub fn import_hunts<B: StorageBackend>(store: &HuntStore<B>, path: &Path) -> Result<Vec<Hunt>> {
    let bytes = fs::read(path)?;
    let hunts: Vec<Hunt> = serde_json::from_slice(&bytes)
        .map_err(|e| HuntError::Invalid(format!("{} is not a hunt export: {}", path.display(), e)))?;

    for hunt in &hunts {
        validate_id(&hunt.id)?;
        if !validate(hunt) {
            return Err(HuntError::Invalid(format!(
                "hunt {} in {} has a phase without an id or species",
                hunt.id,
                path.display()
            )));
        }
    }
    for hunt in &hunts {
        store.restore(hunt)?;
    }
    info!("imported {} hunt(s) from {}", hunts.len(), path.display());
    Ok(hunts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewHunt;
    use crate::store::mem_backend::MemBackend;
    use tempfile::TempDir;

    #[test]
    fn backup_copies_every_record_verbatim() {
        let backend = MemBackend::new();
        backend.put_raw_record("hunt_1_a", b"{\"a\":1}");
        backend.put_raw_record("hunt_1_b", b"not even json");

        let path = backup_all(&backend).unwrap();
        let label = path.file_name().unwrap().to_string_lossy().into_owned();
        let copies = backend.backup(&label).unwrap();
        assert_eq!(copies.len(), 2);
        assert_eq!(copies["hunt_1_b.json"], b"not even json");
    }

    #[test]
    fn export_then_import_into_fresh_store() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("hunts.json");

        let source = HuntStore::with_backend(MemBackend::new());
        let hunt = source.create(NewHunt::new("Charm hunt", "Ralts")).unwrap();
        source.set_counter(&hunt.id, 77).unwrap();
        assert_eq!(export_hunts(&source, &file).unwrap(), 1);

        let target = HuntStore::with_backend(MemBackend::new());
        let imported = import_hunts(&target, &file).unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(target.get(&hunt.id).unwrap().count, 77);
    }

    #[test]
    fn import_rejects_non_export_files_without_writing() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("nope.json");
        fs::write(&file, br#"{"not": "an array"}"#).unwrap();

        let store = HuntStore::with_backend(MemBackend::new());
        assert!(matches!(
            import_hunts(&store, &file),
            Err(HuntError::Invalid(_))
        ));
        assert_eq!(store.backend().commit_count(), 0);
    }

    #[test]
    fn import_rejects_structurally_invalid_hunts_without_writing() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("hunts.json");

        let good = Hunt::new(NewHunt::new("Good", "Ralts"));
        let mut bad = Hunt::new(NewHunt::new("Bad", "Eevee"));
        bad.push_phase("", false, None);
        fs::write(&file, serde_json::to_vec(&vec![good, bad]).unwrap()).unwrap();

        let store = HuntStore::with_backend(MemBackend::new());
        assert!(matches!(
            import_hunts(&store, &file),
            Err(HuntError::Invalid(_))
        ));
        assert_eq!(store.backend().commit_count(), 0);
    }
}
