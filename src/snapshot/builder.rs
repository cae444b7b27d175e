//! Content capture into immutable snapshots
//!
//! The builder walks the normalized region list in address order and streams
//! each readable region through a fingerprint hasher in fixed-size chunks.
//! Raw content is never retained past the chunk buffer.

use super::{enumerator, Snapshot, SnapshotRegion};
use crate::backend::OsBackend;
use crate::config::CaptureConfig;
use crate::core::types::{
    Fingerprint, FingerprintBuilder, ForensicsError, ForensicsResult, MemoryRegion,
};
use crate::process::ProcessHandle;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, trace, warn};

/// Captures [`Snapshot`]s through a backend under a capture configuration.
pub struct SnapshotBuilder<'a> {
    backend: &'a dyn OsBackend,
    capture: &'a CaptureConfig,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(backend: &'a dyn OsBackend, capture: &'a CaptureConfig) -> Self {
        SnapshotBuilder { backend, capture }
    }

    /// Builds a snapshot of the attached process.
    ///
    /// A read failure inside one region degrades that region to the
    /// unreadable sentinel and capture continues. The whole capture fails
    /// with `SnapshotFailed` only when enumeration fails, the handle is
    /// detached, or not a single region could be read.
    pub fn capture(&self, handle: &ProcessHandle) -> ForensicsResult<Snapshot> {
        let pid = handle.pid();
        if !handle.is_attached() {
            return Err(ForensicsError::snapshot_failed(
                pid,
                "process handle is detached",
            ));
        }
        let regions = enumerator::enumerate(self.backend, handle)
            .map_err(|err| ForensicsError::snapshot_failed(pid, err.to_string()))?;

        let captured_at = unix_timestamp();
        let mut chunk = vec![0u8; self.capture.read_chunk_size];
        let mut entries = Vec::with_capacity(regions.len());
        let mut readable = 0usize;
        for region in regions {
            let fingerprint = self.fingerprint_region(handle, &region, &mut chunk);
            if matches!(fingerprint, Fingerprint::Content { .. }) {
                readable += 1;
            }
            entries.push(SnapshotRegion::new(region, fingerprint));
        }
        if readable == 0 {
            return Err(ForensicsError::snapshot_failed(
                pid,
                "no region could be read",
            ));
        }
        debug!(
            pid,
            regions = entries.len(),
            readable,
            "captured snapshot"
        );
        Ok(Snapshot::new(pid, captured_at, entries))
    }

    fn fingerprint_region(
        &self,
        handle: &ProcessHandle,
        region: &MemoryRegion,
        chunk: &mut [u8],
    ) -> Fingerprint {
        if !region.is_readable() {
            return Fingerprint::Unreadable;
        }
        let limit = self.capture.max_region_bytes;
        if limit != 0 && region.len() as u64 > limit {
            warn!(region = %region, limit, "region exceeds capture limit, recorded unreadable");
            return Fingerprint::Unreadable;
        }
        match self.hash_region(handle, region, chunk) {
            Ok(fingerprint) => fingerprint,
            Err(err) => {
                warn!(region = %region, error = %err, "read failed, region recorded unreadable");
                Fingerprint::Unreadable
            }
        }
    }

    fn hash_region(
        &self,
        handle: &ProcessHandle,
        region: &MemoryRegion,
        chunk: &mut [u8],
    ) -> ForensicsResult<Fingerprint> {
        let mut builder = FingerprintBuilder::new();
        let total = region.len();
        let mut offset = 0usize;
        while offset < total {
            let take = chunk.len().min(total - offset);
            let address = region
                .start
                .checked_add(offset)
                .ok_or_else(|| ForensicsError::unreadable(region.start, "address range overflows"))?;
            self.backend.read(handle, address, &mut chunk[..take])?;
            builder.update(&chunk[..take]);
            offset += take;
        }
        trace!(region = %region, bytes = total, "fingerprinted region");
        Ok(builder.finish())
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
