//! Core module containing the fundamental types of the engine
//!
//! This module provides the building blocks used throughout the crate:
//! address handling, memory regions and permissions, content fingerprints,
//! and error types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{Address, Fingerprint, ForensicsError, ForensicsResult, MemoryRegion};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
