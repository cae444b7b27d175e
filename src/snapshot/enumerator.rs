//! Region list normalization
//!
//! Backends report regions in whatever order and granularity their platform
//! source provides. This pass brings the list into the canonical form the
//! rest of the engine assumes: sorted ascending by start address, free of
//! zero-length entries, non-overlapping. Adjacent regions with identical
//! permissions are left unmerged; mapping boundaries are evidence.

use crate::backend::OsBackend;
use crate::core::types::{ForensicsError, ForensicsResult, MemoryRegion};
use crate::process::ProcessHandle;
use tracing::debug;

/// Enumerates the process's regions through `backend` and normalizes them.
pub fn enumerate(
    backend: &dyn OsBackend,
    handle: &ProcessHandle,
) -> ForensicsResult<Vec<MemoryRegion>> {
    let raw = backend.enumerate_regions(handle)?;
    let raw_count = raw.len();
    let regions = normalize(raw)?;
    debug!(
        pid = handle.pid(),
        raw = raw_count,
        kept = regions.len(),
        "normalized region list"
    );
    Ok(regions)
}

/// Sorts the list by start address, discards zero-length entries, and
/// verifies the result is non-overlapping.
///
/// An inverted range (`end < start`) or an overlap between two regions is a
/// contract violation on the backend's part and reports `Internal`.
pub fn normalize(mut regions: Vec<MemoryRegion>) -> ForensicsResult<Vec<MemoryRegion>> {
    for region in &regions {
        if region.end < region.start {
            return Err(ForensicsError::internal(format!(
                "inverted region range {}-{}",
                region.start, region.end
            )));
        }
    }
    regions.retain(|r| !r.is_empty());
    regions.sort_by_key(|r| r.start);
    for pair in regions.windows(2) {
        if pair[0].end > pair[1].start {
            return Err(ForensicsError::internal(format!(
                "overlapping regions {} and {}",
                pair[0], pair[1]
            )));
        }
    }
    Ok(regions)
}
