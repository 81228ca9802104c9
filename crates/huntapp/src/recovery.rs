//! # Startup Recovery
//!
//! Crash recovery runs once at startup (and on demand via `doctor`), before the
//! store is handed to callers. It walks every canonical record and checks that
//! it parses as JSON. Records that do not are *corrupted* and go through the
//! recovery ladder, cheapest and freshest first:
//!
//! 1. **Temp promotion**: a leftover `<id>.tmp` that parses as a hunt is a
//!    write that finished the temp stage but crashed before the rename. It is
//!    renamed over the canonical file.
//! 2. **Snapshot restore**: the newest parseable snapshot of the hunt has its
//!    `updatedAt` restamped (so the recovery is visible) and is written to the
//!    canonical path with a plain write.
//! 3. **Unrecoverable**: nothing usable exists. The corrupted file is left
//!    exactly as found for a human to inspect.
//!
//! Recovery never fails the caller. Every step downgrades to the next one,
//! and one record's outcome never stops the scan of the others.
//!
//! After each record, any temp sibling that recovery did not consume is
//! deleted: for a healthy record it is residue of a crash mid-write whose
//! rename never happened, and the canonical file is the committed state.
//!
//! A record that parses as JSON but has the wrong shape is *not* corrupted
//! from this module's point of view. See [`crate::integrity`].

use crate::model::Hunt;
use crate::store::backend::StorageBackend;
use crate::store::snapshot::snapshots_for;
use chrono::Utc;
use log::{debug, error, info, warn};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "snapshot", rename_all = "snake_case")]
pub enum RecoveryOutcome {
    Promoted,
    RestoredFromSnapshot(String),
    Unrecoverable,
}

impl RecoveryOutcome {
    pub fn is_recovered(&self) -> bool {
        !matches!(self, RecoveryOutcome::Unrecoverable)
    }
}

/// Result of a full scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecoveryReport {
    /// IDs whose canonical file failed to parse.
    pub corrupted: Vec<String>,
    /// IDs brought back by temp promotion or snapshot restore.
    pub recovered: Vec<String>,
    /// How each corrupted record was handled, in scan order.
    pub outcomes: Vec<(String, RecoveryOutcome)>,
    /// Leftover temp files deleted next to healthy records.
    pub stray_temps_removed: usize,
}

impl RecoveryReport {
    pub fn unrecoverable(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_recovered())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.corrupted.is_empty()
    }

    /// Folds a later scan into this one. A record already reported here
    /// (typically one left unrecoverable) is not counted again.
    pub fn merge(&mut self, later: RecoveryReport) {
        for (id, outcome) in later.outcomes {
            if self.corrupted.contains(&id) {
                continue;
            }
            self.corrupted.push(id.clone());
            if outcome.is_recovered() {
                self.recovered.push(id.clone());
            }
            self.outcomes.push((id, outcome));
        }
        self.stray_temps_removed += later.stray_temps_removed;
    }
}

/// Checks one canonical record and recovers it if needed, folding the result
/// into `report`.
pub fn scan_record<B: StorageBackend>(backend: &B, id: &str, report: &mut RecoveryReport) {
    let parses = match backend.read_record(id) {
        Ok(Some(bytes)) => serde_json::from_slice::<serde_json::Value>(&bytes).is_ok(),
        // Deleted between listing and reading; nothing to check.
        Ok(None) => return,
        Err(e) => {
            warn!("could not read {}: {}", id, e);
            false
        }
    };

    let mut temp_consumed = false;
    if !parses {
        report.corrupted.push(id.to_string());
        let outcome = recover(backend, id);
        match &outcome {
            RecoveryOutcome::Promoted => {
                temp_consumed = true;
                info!("recovered {} from its temp file", id);
            }
            RecoveryOutcome::RestoredFromSnapshot(name) => {
                info!("recovered {} from snapshot {}", id, name);
            }
            RecoveryOutcome::Unrecoverable => {
                error!("could not recover {}; corrupted file left in place", id);
            }
        }
        if outcome.is_recovered() {
            report.recovered.push(id.to_string());
        }
        report.outcomes.push((id.to_string(), outcome));
    }

    if !temp_consumed {
        match backend.remove_temp(id) {
            Ok(true) => {
                debug!("removed leftover temp file of {}", id);
                report.stray_temps_removed += 1;
            }
            Ok(false) => {}
            Err(e) => warn!("could not remove leftover temp file of {}: {}", id, e),
        }
    }
}

/// Runs the recovery ladder for one corrupted record.
pub fn recover<B: StorageBackend>(backend: &B, id: &str) -> RecoveryOutcome {
    if promote_temp(backend, id) {
        return RecoveryOutcome::Promoted;
    }
    match restore_from_snapshot(backend, id) {
        Some(name) => RecoveryOutcome::RestoredFromSnapshot(name),
        None => RecoveryOutcome::Unrecoverable,
    }
}

fn promote_temp<B: StorageBackend>(backend: &B, id: &str) -> bool {
    let bytes = match backend.read_temp(id) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return false,
        Err(e) => {
            warn!("could not read temp file of {}: {}", id, e);
            return false;
        }
    };

    if let Err(e) = serde_json::from_slice::<Hunt>(&bytes) {
        debug!("temp file of {} is not a valid hunt: {}", id, e);
        return false;
    }

    match backend.promote_temp(id) {
        Ok(()) => true,
        Err(e) => {
            warn!("could not promote temp file of {}: {}", id, e);
            false
        }
    }
}

/// Restores the newest snapshot that parses. Older snapshots are tried when a
/// newer one is truncated or otherwise unreadable.
fn restore_from_snapshot<B: StorageBackend>(backend: &B, id: &str) -> Option<String> {
    let candidates = match snapshots_for(backend, id) {
        Ok(names) => names,
        Err(e) => {
            warn!("could not list snapshots for {}: {}", id, e);
            return None;
        }
    };

    for name in candidates {
        let mut hunt = match backend.read_snapshot(&name) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Hunt>(&bytes) {
                Ok(hunt) => hunt,
                Err(e) => {
                    debug!("skipping unparseable snapshot {}: {}", name, e);
                    continue;
                }
            },
            Ok(None) => continue,
            Err(e) => {
                warn!("could not read snapshot {}: {}", name, e);
                continue;
            }
        };

        hunt.updated_at = Utc::now();
        let bytes = match serde_json::to_vec_pretty(&hunt) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("could not serialize snapshot {}: {}", name, e);
                continue;
            }
        };
        return match backend.write_record_plain(id, &bytes) {
            Ok(()) => Some(name),
            Err(e) => {
                warn!("could not restore {} from {}: {}", id, name, e);
                None
            }
        };
    }
    None
}
