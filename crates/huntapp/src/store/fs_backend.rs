use super::atomic::{AtomicWriter, RECORD_EXT};
use super::backend::StorageBackend;
use crate::error::{HuntError, Result, WriteError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const HUNTS_DIR: &str = "hunts";
pub const SNAPSHOTS_DIR: &str = "snapshots";
pub const BACKUPS_DIR: &str = "emergency-backups";
pub const CONFIG_DIR: &str = "config";

/// Filesystem storage rooted at a data directory:
///
/// ```text
/// <root>/
/// ├── hunts/<id>.json | <id>.tmp
/// ├── snapshots/<timestamp>-<id>.json
/// ├── emergency-backups/<timestamp>/<id>.json
/// └── config/settings.json
/// ```
pub struct FsBackend {
    root: PathBuf,
    writer: AtomicWriter,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let writer = AtomicWriter::new(root.join(HUNTS_DIR));
        Self { root, writer }
    }

    pub fn hunts_dir(&self) -> &Path {
        self.writer.dir()
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.root.join(SNAPSHOTS_DIR)
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join(BACKUPS_DIR)
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join(CONFIG_DIR)
    }

    /// Create every directory of the layout that does not exist yet.
    pub fn ensure_layout(&self) -> Result<()> {
        for dir in [
            self.root.clone(),
            self.hunts_dir().to_path_buf(),
            self.snapshots_dir(),
            self.config_dir(),
        ] {
            ensure_dir(&dir)?;
        }
        Ok(())
    }

    pub fn canonical_path(&self, id: &str) -> PathBuf {
        self.writer.canonical_path(id)
    }

    pub fn temp_path(&self, id: &str) -> PathBuf {
        self.writer.temp_path(id)
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(HuntError::Io)?;
    }
    Ok(())
}

/// Reads a file, mapping "not found" to Ok(None).
fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(HuntError::Io(e)),
    }
}

fn remove_optional(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(HuntError::Io(e)),
    }
}

/// File names in `dir` with the given extension; an absent dir is empty.
fn file_names_with_ext(dir: &Path, ext: &str) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(HuntError::Io)? {
        let entry = entry.map_err(HuntError::Io)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|s| s.to_str()) != Some(ext) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

impl StorageBackend for FsBackend {
    fn read_record(&self, id: &str) -> Result<Option<Vec<u8>>> {
        read_optional(&self.canonical_path(id))
    }

    fn commit_record(&self, id: &str, bytes: &[u8]) -> std::result::Result<(), WriteError> {
        if let Err(source) = fs::create_dir_all(self.hunts_dir()) {
            return Err(WriteError::Temp {
                path: self.temp_path(id),
                source,
            });
        }
        self.writer.commit(id, bytes)
    }

    fn write_record_plain(&self, id: &str, bytes: &[u8]) -> Result<()> {
        ensure_dir(self.hunts_dir())?;
        fs::write(self.canonical_path(id), bytes).map_err(HuntError::Io)
    }

    fn delete_record(&self, id: &str) -> Result<bool> {
        remove_optional(&self.canonical_path(id))
    }

    fn list_record_ids(&self) -> Result<Vec<String>> {
        let suffix = format!(".{}", RECORD_EXT);
        Ok(file_names_with_ext(self.hunts_dir(), RECORD_EXT)?
            .into_iter()
            .filter_map(|name| name.strip_suffix(&suffix).map(str::to_string))
            .collect())
    }

    fn read_temp(&self, id: &str) -> Result<Option<Vec<u8>>> {
        read_optional(&self.temp_path(id))
    }

    fn promote_temp(&self, id: &str) -> Result<()> {
        fs::rename(self.temp_path(id), self.canonical_path(id)).map_err(HuntError::Io)
    }

    fn remove_temp(&self, id: &str) -> Result<bool> {
        remove_optional(&self.temp_path(id))
    }

    fn write_snapshot(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let dir = self.snapshots_dir();
        ensure_dir(&dir)?;
        fs::write(dir.join(name), bytes).map_err(HuntError::Io)
    }

    fn list_snapshots(&self) -> Result<Vec<String>> {
        file_names_with_ext(&self.snapshots_dir(), RECORD_EXT)
    }

    fn read_snapshot(&self, name: &str) -> Result<Option<Vec<u8>>> {
        read_optional(&self.snapshots_dir().join(name))
    }

    fn delete_snapshot(&self, name: &str) -> Result<()> {
        remove_optional(&self.snapshots_dir().join(name)).map(|_| ())
    }

    fn backup_records(&self, label: &str) -> Result<PathBuf> {
        let target = self.backups_dir().join(label);
        fs::create_dir_all(&target).map_err(HuntError::Io)?;

        // Any single failed copy aborts; files copied so far stay in place.
        for name in file_names_with_ext(self.hunts_dir(), RECORD_EXT)? {
            fs::copy(self.hunts_dir().join(&name), target.join(&name)).map_err(HuntError::Io)?;
        }
        Ok(target)
    }

    fn data_dir(&self) -> PathBuf {
        self.root.clone()
    }
}
