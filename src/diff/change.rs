//! Per-region change classification

use crate::core::types::MemoryRegion;
use crate::snapshot::SnapshotRegion;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How one region compares between two snapshots.
///
/// `Modified` covers both a content fingerprint change and a permission
/// change over an identical address range. A region whose range shifted
/// between captures is reported as a `Disappeared`/`Appeared` pair; a
/// whole-region fingerprint proves nothing about sub-ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionChange {
    /// Identical range, fingerprint, and permissions in both snapshots.
    Unchanged { region: SnapshotRegion },
    /// Identical range with a different fingerprint or permissions.
    Modified {
        old: SnapshotRegion,
        new: SnapshotRegion,
    },
    /// Present only in the newer snapshot.
    Appeared { region: SnapshotRegion },
    /// Present only in the older snapshot.
    Disappeared { region: SnapshotRegion },
}

impl RegionChange {
    /// The address range the entry refers to. For `Modified` the old and new
    /// ranges are identical.
    pub fn region(&self) -> MemoryRegion {
        match self {
            RegionChange::Unchanged { region }
            | RegionChange::Appeared { region }
            | RegionChange::Disappeared { region } => region.region,
            RegionChange::Modified { new, .. } => new.region,
        }
    }

    /// Whether the entry represents a detected change.
    pub fn is_change(&self) -> bool {
        !matches!(self, RegionChange::Unchanged { .. })
    }

    /// Bytes this entry contributes to the modified-byte total. Whole-region
    /// granularity; zero for `Unchanged`.
    pub fn modified_bytes(&self) -> u64 {
        if self.is_change() {
            self.region().len() as u64
        } else {
            0
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RegionChange::Unchanged { .. } => "unchanged",
            RegionChange::Modified { .. } => "modified",
            RegionChange::Appeared { .. } => "appeared",
            RegionChange::Disappeared { .. } => "disappeared",
        }
    }
}

impl fmt::Display for RegionChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label(), self.region())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Address, Fingerprint, Permissions};

    fn entry(start: usize, end: usize, seed: &[u8]) -> SnapshotRegion {
        SnapshotRegion::new(
            MemoryRegion::new(
                Address::new(start),
                Address::new(end),
                Permissions::read_write(),
            ),
            Fingerprint::compute(seed),
        )
    }

    #[test]
    fn test_modified_bytes_per_variant() {
        let a = entry(0x1000, 0x2000, b"a");
        let b = entry(0x1000, 0x2000, b"b");

        assert_eq!(RegionChange::Unchanged { region: a }.modified_bytes(), 0);
        assert_eq!(
            RegionChange::Modified { old: a, new: b }.modified_bytes(),
            0x1000
        );
        assert_eq!(RegionChange::Appeared { region: a }.modified_bytes(), 0x1000);
        assert_eq!(
            RegionChange::Disappeared { region: a }.modified_bytes(),
            0x1000
        );
    }

    #[test]
    fn test_is_change() {
        let a = entry(0x1000, 0x2000, b"a");
        assert!(!RegionChange::Unchanged { region: a }.is_change());
        assert!(RegionChange::Appeared { region: a }.is_change());
    }

    #[test]
    fn test_display() {
        let a = entry(0x1000, 0x2000, b"a");
        let s = format!("{}", RegionChange::Disappeared { region: a });
        assert!(s.starts_with("disappeared"));
        assert!(s.contains("0x0000000000001000"));
    }

    #[test]
    fn test_serde_round_trip() {
        let change = RegionChange::Modified {
            old: entry(0x1000, 0x2000, b"a"),
            new: entry(0x1000, 0x2000, b"b"),
        };
        let json = serde_json::to_string(&change).unwrap();
        let back: RegionChange = serde_json::from_str(&json).unwrap();
        assert_eq!(back, change);
    }
}
