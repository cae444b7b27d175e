//! Read-only process-memory snapshot and diff engine
//!
//! Attach to a running process, capture an immutable fingerprint snapshot of
//! its mapped regions, and structurally diff two snapshots to surface
//! modified regions and bytes. Target memory is never written; raw content
//! is never retained beyond the hashing chunk buffer.

pub mod backend;
pub mod config;
pub mod core;
pub mod diff;
pub mod engine;
pub mod process;
pub mod snapshot;

// Re-export the main types at the crate root
pub use crate::backend::{BackendKind, MockBackend, MockController, OsBackend, ReadStrategy};
pub use crate::config::{Config, ConfigError};
pub use crate::core::types::{
    Address, Fingerprint, ForensicsError, ForensicsResult, MemoryRegion, Permissions, ProcessId,
};
pub use crate::core::{AUTHORS, VERSION};
pub use crate::diff::{RegionChange, SnapshotDiff};
pub use crate::engine::ForensicsEngine;
pub use crate::process::ProcessHandle;
pub use crate::snapshot::{Snapshot, SnapshotBuilder, SnapshotRegion};
