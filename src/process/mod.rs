//! Attached-process handle management
//!
//! The attach/detach lifecycle itself lives on the engine; this module
//! provides the opaque handle those calls produce and consume.

pub mod handle;

pub use handle::ProcessHandle;
