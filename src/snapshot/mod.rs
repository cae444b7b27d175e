//! Point-in-time captures of a process's mapped memory
//!
//! A [`Snapshot`] records the shape of every mapped region together with a
//! content fingerprint, never the content itself. Snapshots are built by
//! [`SnapshotBuilder`], frozen on construction, and safe to share across
//! threads; they hold no reference to the process they were taken from.

pub mod builder;
pub mod enumerator;

pub use builder::SnapshotBuilder;

use crate::core::types::{Address, Fingerprint, MemoryRegion, ProcessId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One captured region: its address range and permissions at capture time,
/// plus the fingerprint of its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRegion {
    pub region: MemoryRegion,
    pub fingerprint: Fingerprint,
}

impl SnapshotRegion {
    pub fn new(region: MemoryRegion, fingerprint: Fingerprint) -> Self {
        SnapshotRegion {
            region,
            fingerprint,
        }
    }

    /// Extent of the captured region in bytes
    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }
}

/// An immutable capture of a process's mapped regions at one instant.
///
/// Region entries are sorted ascending by start address and never overlap.
/// The snapshot records the pid it was taken from; diffing two snapshots
/// requires their pids to match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pid: ProcessId,
    captured_at: u64,
    regions: Vec<SnapshotRegion>,
}

impl Snapshot {
    pub(crate) fn new(pid: ProcessId, captured_at: u64, regions: Vec<SnapshotRegion>) -> Self {
        Snapshot {
            pid,
            captured_at,
            regions,
        }
    }

    /// Pid of the process the snapshot was taken from
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Capture time, seconds since the Unix epoch
    pub fn captured_at(&self) -> u64 {
        self.captured_at
    }

    /// Captured regions, sorted ascending by start address
    pub fn regions(&self) -> &[SnapshotRegion] {
        &self.regions
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Total mapped bytes across all captured regions
    pub fn total_bytes(&self) -> u64 {
        self.regions.iter().map(|r| r.len() as u64).sum()
    }

    /// Finds the captured region containing `address`, if any.
    pub fn find_region(&self, address: Address) -> Option<&SnapshotRegion> {
        let index = self.regions.partition_point(|r| r.region.start <= address);
        let candidate = self.regions.get(index.checked_sub(1)?)?;
        candidate.region.contains(address).then_some(candidate)
    }

    /// Whether the region list satisfies the sorted/non-overlapping form the
    /// diff alignment assumes. Construction guarantees it; deserialized data
    /// may not.
    pub(crate) fn is_canonically_ordered(&self) -> bool {
        self.regions.windows(2).all(|pair| {
            pair[0].region.end <= pair[1].region.start && !pair[0].region.is_empty()
        }) && self.regions.last().map_or(true, |r| !r.region.is_empty())
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Snapshot(pid={}, regions={}, bytes={})",
            self.pid,
            self.regions.len(),
            self.total_bytes()
        )
    }
}
