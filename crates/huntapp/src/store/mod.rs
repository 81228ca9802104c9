//! # Storage Layer
//!
//! This module owns everything between a [`Hunt`](crate::model::Hunt) value and
//! the bytes on disk. [`HuntStore`] is the only writer; it sits on top of a
//! [`StorageBackend`] that performs the raw I/O.
//!
//! ## Durability Model
//!
//! Every committed change is written as a whole record to `<id>.tmp`, flushed,
//! and renamed over `<id>.json`. The canonical file is therefore always either
//! the previous committed version or the new one.
//!
//! ### Philosophy
//! - **One file per hunt**: the record is the unit of atomicity. There is no
//!   index to drift out of sync with the records.
//! - **Temp files are residue**: at rest, a `<id>.tmp` only exists if a commit
//!   crashed. Startup recovery either promotes it or deletes it.
//! - **Snapshots are a safety net**: periodic full copies of a record, used
//!   only when both the canonical file and its temp are unusable.
//! - **Best effort around the commit**: snapshot and text-mirror failures are
//!   logged, never surfaced. Only the commit itself can fail an operation.
//!
//! ## Concurrency
//!
//! Mutations of one hunt are serialized by a per-ID lock held across the whole
//! read-modify-write. Different hunts proceed in parallel.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: production backend over a data directory.
//! - [`mem_backend::MemBackend`]: for testing logic without filesystem I/O,
//!   with hooks to simulate failed commits and snapshots.
//!
//! ## Storage Layout
//!
//! ```text
//! <data dir>/
//! ├── hunts/
//! │   ├── hunt_<millis>_<rand>.json   # canonical record
//! │   └── hunt_<millis>_<rand>.tmp    # only after a crash
//! ├── snapshots/
//! │   └── <timestamp>-<id>.json
//! ├── emergency-backups/
//! │   └── <timestamp>/<id>.json
//! └── config/
//!     └── settings.json
//! ```

use crate::error::{HuntError, Result};

pub mod atomic;
pub mod backend;
pub mod fs_backend;
pub mod hunt_store;
pub mod mem_backend;
pub mod snapshot;

pub use backend::StorageBackend;
pub use fs_backend::FsBackend;
pub use hunt_store::HuntStore;
pub use mem_backend::MemBackend;
pub use snapshot::{Retention, SnapshotPolicy, SnapshotTrigger};

/// IDs double as file name stems, so only `[A-Za-z0-9_-]` is accepted.
pub fn validate_id(id: &str) -> Result<()> {
    let ok = !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(HuntError::Invalid(format!("not a valid hunt id: {:?}", id)))
    }
}
