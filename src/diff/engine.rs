//! Snapshot alignment and aggregate change counts

use super::RegionChange;
use crate::core::types::{ForensicsError, ForensicsResult, ProcessId};
use crate::snapshot::{Snapshot, SnapshotRegion};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// The classified comparison of two snapshots of the same process.
///
/// Construction walks both region lists once; the aggregate counts are
/// computed then and the accessors only return them. A diff holds no
/// reference to the process or to the input snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDiff {
    pid: ProcessId,
    changes: Vec<RegionChange>,
    modified_regions: usize,
    modified_bytes: u64,
}

impl SnapshotDiff {
    /// Compares two snapshots, `old` taken before `new`.
    ///
    /// Both snapshots must record the same pid; comparing captures of two
    /// different processes reports `DiffFailed` before any alignment work.
    /// A snapshot whose region list is not sorted and non-overlapping
    /// (possible only through deserialized data) is also rejected.
    pub fn between(old: &Snapshot, new: &Snapshot) -> ForensicsResult<SnapshotDiff> {
        if old.pid() != new.pid() {
            return Err(ForensicsError::diff_failed(format!(
                "snapshots record different processes: {} vs {}",
                old.pid(),
                new.pid()
            )));
        }
        if !old.is_canonically_ordered() || !new.is_canonically_ordered() {
            return Err(ForensicsError::diff_failed(
                "snapshot region list is not sorted and non-overlapping",
            ));
        }

        let changes = align(old.regions(), new.regions());
        let mut modified_regions = 0usize;
        let mut modified_bytes = 0u64;
        for change in &changes {
            if change.is_change() {
                modified_regions += 1;
                modified_bytes += change.modified_bytes();
            }
        }
        debug!(
            pid = old.pid(),
            modified_regions, modified_bytes, "diffed snapshots"
        );
        Ok(SnapshotDiff {
            pid: old.pid(),
            changes,
            modified_regions,
            modified_bytes,
        })
    }

    /// Pid both input snapshots were taken from
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Every classified entry, in ascending address order
    pub fn changes(&self) -> &[RegionChange] {
        &self.changes
    }

    /// Number of regions classified as appeared, disappeared, or modified
    pub fn modified_region_count(&self) -> usize {
        self.modified_regions
    }

    /// Total bytes covered by changed regions, at whole-region granularity
    pub fn modified_byte_count(&self) -> u64 {
        self.modified_bytes
    }

    /// True when no change of any kind was detected.
    pub fn is_identical(&self) -> bool {
        self.modified_regions == 0
    }
}

impl fmt::Display for SnapshotDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SnapshotDiff(pid={}, modified_regions={}, modified_bytes={})",
            self.pid, self.modified_regions, self.modified_bytes
        )
    }
}

/// Merges two address-sorted region lists into classified entries, O(n+m).
fn align(old: &[SnapshotRegion], new: &[SnapshotRegion]) -> Vec<RegionChange> {
    let mut changes = Vec::with_capacity(old.len().max(new.len()));
    let mut i = 0;
    let mut j = 0;

    while i < old.len() && j < new.len() {
        let a = &old[i];
        let b = &new[j];
        if a.region.same_range(&b.region) {
            changes.push(classify_same_range(a, b));
            i += 1;
            j += 1;
        } else if a.region.end <= b.region.start {
            changes.push(RegionChange::Disappeared { region: *a });
            i += 1;
        } else if b.region.end <= a.region.start {
            changes.push(RegionChange::Appeared { region: *b });
            j += 1;
        } else {
            // Partial overlap: the region was split, merged, or resized
            // between captures. Report both shapes rather than guess at
            // sub-range equality.
            changes.push(RegionChange::Disappeared { region: *a });
            changes.push(RegionChange::Appeared { region: *b });
            i += 1;
            j += 1;
        }
    }
    for a in &old[i..] {
        changes.push(RegionChange::Disappeared { region: *a });
    }
    for b in &new[j..] {
        changes.push(RegionChange::Appeared { region: *b });
    }
    changes
}

fn classify_same_range(a: &SnapshotRegion, b: &SnapshotRegion) -> RegionChange {
    if a.fingerprint == b.fingerprint && a.region.permissions == b.region.permissions {
        RegionChange::Unchanged { region: *b }
    } else {
        RegionChange::Modified { old: *a, new: *b }
    }
}
