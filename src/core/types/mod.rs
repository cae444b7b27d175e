//! Core type definitions for the snapshot/diff engine
//!
//! This module contains the fundamental types used throughout the crate:
//! address wrappers, region and permission descriptions, content
//! fingerprints, and error types.

mod address;
mod error;
mod fingerprint;
mod region;

// Re-export all public types
pub use address::Address;
pub use error::{ForensicsError, ForensicsResult};
pub use fingerprint::{Fingerprint, FingerprintBuilder, DIGEST_LEN};
pub use region::{MemoryRegion, Permissions};

// Common type aliases
pub type ProcessId = u32;
