//! Structural comparison of two snapshots
//!
//! The engine aligns two address-sorted region lists in one O(n+m) merge and
//! classifies every range as unchanged, modified, appeared, or disappeared.
//! Aggregate counts are memoized at construction; no raw memory is touched.

pub mod change;
pub mod engine;

pub use change::RegionChange;
pub use engine::SnapshotDiff;
