//! Error types shared by every layer of the engine

use super::{Address, ProcessId};
use thiserror::Error;

/// Main error type for snapshot and diff operations.
///
/// Per-region read failures during snapshot construction are recovered
/// internally (the region is recorded as unreadable); every other failure
/// surfaces as one of these kinds. The set is closed: backends translate
/// OS errors into it at the boundary.
#[derive(Error, Debug)]
pub enum ForensicsError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Process not found: {0}")]
    ProcessNotFound(ProcessId),

    #[error("Access denied to process {pid}: {reason}")]
    AccessDenied { pid: ProcessId, reason: String },

    #[error("Operation not supported by the {backend} backend: {reason}")]
    Unsupported {
        backend: &'static str,
        reason: String,
    },

    #[error("Memory at {address} is unreadable: {reason}")]
    Unreadable { address: Address, reason: String },

    #[error("Snapshot of process {pid} failed: {reason}")]
    SnapshotFailed { pid: ProcessId, reason: String },

    #[error("Snapshot diff failed: {0}")]
    DiffFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for snapshot and diff operations
pub type ForensicsResult<T> = Result<T, ForensicsError>;

impl ForensicsError {
    /// Creates an access denied error for a process
    pub fn access_denied(pid: ProcessId, reason: impl Into<String>) -> Self {
        ForensicsError::AccessDenied {
            pid,
            reason: reason.into(),
        }
    }

    /// Creates an unsupported-operation error for a backend
    pub fn unsupported(backend: &'static str, reason: impl Into<String>) -> Self {
        ForensicsError::Unsupported {
            backend,
            reason: reason.into(),
        }
    }

    /// Creates an unreadable-memory error at an address
    pub fn unreadable(address: Address, reason: impl Into<String>) -> Self {
        ForensicsError::Unreadable {
            address,
            reason: reason.into(),
        }
    }

    /// Creates a snapshot failure for a process
    pub fn snapshot_failed(pid: ProcessId, reason: impl Into<String>) -> Self {
        ForensicsError::SnapshotFailed {
            pid,
            reason: reason.into(),
        }
    }

    /// Creates a diff failure error
    pub fn diff_failed(reason: impl Into<String>) -> Self {
        ForensicsError::DiffFailed(reason.into())
    }

    /// Creates a backend contract violation error
    pub fn internal(reason: impl Into<String>) -> Self {
        ForensicsError::Internal(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ForensicsError::InvalidArgument("pid must be non-zero".to_string());
        assert_eq!(err.to_string(), "Invalid argument: pid must be non-zero");

        let err = ForensicsError::access_denied(1234, "ptrace scope restriction");
        assert_eq!(
            err.to_string(),
            "Access denied to process 1234: ptrace scope restriction"
        );
    }

    #[test]
    fn test_all_error_variants() {
        let errors: Vec<(ForensicsError, &str)> = vec![
            (
                ForensicsError::InvalidArgument("bad handle".to_string()),
                "Invalid argument: bad handle",
            ),
            (
                ForensicsError::ProcessNotFound(4242),
                "Process not found: 4242",
            ),
            (
                ForensicsError::AccessDenied {
                    pid: 999,
                    reason: "denied".to_string(),
                },
                "Access denied to process 999: denied",
            ),
            (
                ForensicsError::Unsupported {
                    backend: "procfs",
                    reason: "wrong platform".to_string(),
                },
                "Operation not supported by the procfs backend: wrong platform",
            ),
            (
                ForensicsError::Unreadable {
                    address: Address::new(0x1000),
                    reason: "page fault".to_string(),
                },
                "Memory at 0x0000000000001000 is unreadable: page fault",
            ),
            (
                ForensicsError::SnapshotFailed {
                    pid: 77,
                    reason: "enumeration failed".to_string(),
                },
                "Snapshot of process 77 failed: enumeration failed",
            ),
            (
                ForensicsError::DiffFailed("process identities differ".to_string()),
                "Snapshot diff failed: process identities differ",
            ),
            (
                ForensicsError::Internal("overlapping regions".to_string()),
                "Internal error: overlapping regions",
            ),
        ];

        for (error, expected) in errors {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_helper_methods() {
        let err = ForensicsError::access_denied(42, "test reason");
        match err {
            ForensicsError::AccessDenied { pid, reason } => {
                assert_eq!(pid, 42);
                assert_eq!(reason, "test reason");
            }
            _ => panic!("Wrong error type"),
        }

        let err = ForensicsError::unreadable(Address::new(0xABCD), "invalid page");
        match err {
            ForensicsError::Unreadable { address, reason } => {
                assert_eq!(address, Address::new(0xABCD));
                assert_eq!(reason, "invalid page");
            }
            _ => panic!("Wrong error type"),
        }

        let err = ForensicsError::snapshot_failed(5, "handle detached");
        match err {
            ForensicsError::SnapshotFailed { pid, reason } => {
                assert_eq!(pid, 5);
                assert_eq!(reason, "handle detached");
            }
            _ => panic!("Wrong error type"),
        }

        let err = ForensicsError::unsupported("mock", "not implemented");
        match err {
            ForensicsError::Unsupported { backend, reason } => {
                assert_eq!(backend, "mock");
                assert_eq!(reason, "not implemented");
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_forensics_result_type() {
        fn example_function() -> ForensicsResult<u32> {
            Ok(42)
        }

        fn failing_function() -> ForensicsResult<u32> {
            Err(ForensicsError::internal("test"))
        }

        assert_eq!(example_function().unwrap(), 42);
        assert!(failing_function().is_err());
    }

    #[test]
    fn test_error_debug_format() {
        let err = ForensicsError::DiffFailed("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("DiffFailed"));
        assert!(debug_str.contains("test"));
    }
}
