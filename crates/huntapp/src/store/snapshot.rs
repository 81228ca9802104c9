//! # Snapshots
//!
//! After a successful commit the store hands the freshly written bytes to
//! [`SnapshotManager::maybe_snapshot`]. When the [`SnapshotPolicy`] says so,
//! the bytes are written verbatim to `snapshots/<timestamp>-<id>.json`.
//!
//! Snapshot writes are plain writes, not temp+rename: they are only read back
//! during recovery, and recovery skips any snapshot that does not parse.
//!
//! ## Naming
//!
//! The timestamp is the UTC ISO 8601 instant with millisecond precision and
//! every `:` and `.` replaced by `-`, e.g. `2024-05-01T18-22-03-117Z`. The
//! fixed width makes lexicographic order equal chronological order, which is
//! what recovery relies on to find the newest snapshot.
//!
//! ## Triggers
//!
//! | Trigger          | Snapshot when                                            |
//! |------------------|----------------------------------------------------------|
//! | `Observed`       | `count % interval == 0` or the hunt has any phase        |
//! | `PhaseChanged`   | `count % interval == 0` or this save changed the phases  |
//!
//! `Observed` is the default. Once a hunt has a phase it snapshots on every
//! save, so pair it with a [`Retention`] other than `KeepAll` to bound disk use.

use super::backend::StorageBackend;
use crate::error::Result;
use crate::model::Hunt;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_SNAPSHOT_INTERVAL: u64 = 30;

/// `2024-05-01T18:22:03.117Z` → `2024-05-01T18-22-03-117Z`
pub fn snapshot_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

pub fn snapshot_name(timestamp: &str, id: &str) -> String {
    format!("{}-{}.json", timestamp, id)
}

/// Width of [`snapshot_timestamp`] output, e.g. `2024-05-01T18-22-03-117Z`.
const TIMESTAMP_LEN: usize = 24;

/// Compares the ID part exactly; IDs may themselves contain `-`.
pub fn snapshot_belongs_to(name: &str, id: &str) -> bool {
    name.strip_suffix(".json")
        .and_then(|stem| stem.get(TIMESTAMP_LEN..))
        .and_then(|rest| rest.strip_prefix('-'))
        == Some(id)
}

/// All snapshot names for `id`, newest first.
pub fn snapshots_for<B: StorageBackend>(backend: &B, id: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = backend
        .list_snapshots()?
        .into_iter()
        .filter(|name| snapshot_belongs_to(name, id))
        .collect();
    names.sort();
    names.reverse();
    Ok(names)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapshotTrigger {
    #[default]
    Observed,
    PhaseChanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Retention {
    #[default]
    KeepAll,
    /// Keep the newest N snapshots per hunt (at least one).
    KeepLast(usize),
    /// Keep the newest snapshot of each UTC day per hunt.
    OnePerDay,
}

impl Retention {
    /// Given one hunt's snapshot names sorted newest first, return the ones
    /// this policy discards.
    pub fn discard(&self, newest_first: &[String]) -> Vec<String> {
        match *self {
            Retention::KeepAll => Vec::new(),
            Retention::KeepLast(n) => newest_first.iter().skip(n.max(1)).cloned().collect(),
            Retention::OnePerDay => {
                let mut seen_days = HashSet::new();
                newest_first
                    .iter()
                    .filter(|name| !seen_days.insert(name.get(..10).unwrap_or(name.as_str())))
                    .cloned()
                    .collect()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotPolicy {
    pub interval: u64,
    pub trigger: SnapshotTrigger,
    pub retention: Retention,
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SNAPSHOT_INTERVAL,
            trigger: SnapshotTrigger::Observed,
            retention: Retention::KeepAll,
        }
    }
}

impl SnapshotPolicy {
    /// `phases_before` is the phase count prior to this save (None for a
    /// fresh hunt). An interval of zero disables count-based snapshots.
    pub fn should_snapshot(&self, hunt: &Hunt, phases_before: Option<usize>) -> bool {
        let on_interval = self.interval > 0 && hunt.count % self.interval == 0;
        let on_phase = match self.trigger {
            SnapshotTrigger::Observed => !hunt.phases.is_empty(),
            SnapshotTrigger::PhaseChanged => {
                phases_before.is_some_and(|before| before != hunt.phases.len())
            }
        };
        on_interval || on_phase
    }
}

pub struct SnapshotManager<'a, B: StorageBackend> {
    backend: &'a B,
    policy: &'a SnapshotPolicy,
}

impl<'a, B: StorageBackend> SnapshotManager<'a, B> {
    pub fn new(backend: &'a B, policy: &'a SnapshotPolicy) -> Self {
        Self { backend, policy }
    }

    /// Writes a snapshot of `bytes` (the just-committed record) if the policy
    /// asks for one, then applies retention. Returns the snapshot name.
    pub fn maybe_snapshot(
        &self,
        hunt: &Hunt,
        bytes: &[u8],
        phases_before: Option<usize>,
    ) -> Result<Option<String>> {
        if !self.policy.should_snapshot(hunt, phases_before) {
            return Ok(None);
        }

        let name = snapshot_name(&snapshot_timestamp(Utc::now()), &hunt.id);
        self.backend.write_snapshot(&name, bytes)?;
        debug!("snapshot {} written (count {})", name, hunt.count);

        if let Err(e) = self.prune(&hunt.id) {
            warn!("snapshot pruning for {} failed: {}", hunt.id, e);
        }
        Ok(Some(name))
    }

    /// Applies the retention policy to one hunt's snapshots.
    /// Returns how many were deleted.
    pub fn prune(&self, id: &str) -> Result<usize> {
        if self.policy.retention == Retention::KeepAll {
            return Ok(0);
        }
        let doomed = self.policy.retention.discard(&snapshots_for(self.backend, id)?);
        for name in &doomed {
            self.backend.delete_snapshot(name)?;
        }
        if !doomed.is_empty() {
            debug!("pruned {} snapshot(s) of {}", doomed.len(), id);
        }
        Ok(doomed.len())
    }
}
