//! Opaque attached-process handle with RAII semantics

use crate::core::types::ProcessId;
use std::any::Any;
use std::fmt;

/// Handle to an attached target process.
///
/// Carries the process identifier and a backend-private attachment token
/// (an open file, an OS handle, a mock index). The token is dropped on
/// detach, which releases whatever the backend holds; dropping the handle
/// has the same effect. Fields are private: callers interact with the
/// target only through the engine.
///
/// The handle is `Send` but not `Sync`; one handle must not serve
/// concurrent operations without external serialization.
pub struct ProcessHandle {
    pid: ProcessId,
    token: Option<Box<dyn Any + Send>>,
}

impl ProcessHandle {
    /// Wraps a backend attachment token.
    ///
    /// Called by `OsBackend` implementations from `attach`; not part of the
    /// caller-facing surface.
    pub fn new(pid: ProcessId, token: Box<dyn Any + Send>) -> Self {
        ProcessHandle {
            pid,
            token: Some(token),
        }
    }

    /// Process identifier of the attached target
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Whether the handle still carries its attachment token
    pub fn is_attached(&self) -> bool {
        self.token.is_some()
    }

    /// Borrows the backend token for downcasting.
    ///
    /// Backends downcast this to their own token type; a foreign token is a
    /// contract violation they report as `Internal`.
    pub fn token(&self) -> Option<&(dyn Any + Send)> {
        self.token.as_deref()
    }

    /// Drops the attachment token, releasing backend resources.
    ///
    /// Idempotent: releasing an already-detached handle is a no-op.
    pub fn release(&mut self) {
        self.token = None;
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProcessHandle(pid={}, attached={})",
            self.pid,
            self.is_attached()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_with_token(pid: ProcessId) -> ProcessHandle {
        ProcessHandle::new(pid, Box::new(0xABCDu32))
    }

    #[test]
    fn test_handle_pid() {
        let handle = handle_with_token(1234);
        assert_eq!(handle.pid(), 1234);
        assert!(handle.is_attached());
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut handle = handle_with_token(42);
        handle.release();
        assert!(!handle.is_attached());
        assert!(handle.token().is_none());

        handle.release();
        assert!(!handle.is_attached());
    }

    #[test]
    fn test_token_downcast() {
        let handle = handle_with_token(7);
        let token = handle.token().unwrap();
        assert_eq!(token.downcast_ref::<u32>(), Some(&0xABCD));
        assert!(token.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_handle_display() {
        let mut handle = handle_with_token(1234);
        assert_eq!(
            format!("{}", handle),
            "ProcessHandle(pid=1234, attached=true)"
        );

        handle.release();
        assert_eq!(
            format!("{}", handle),
            "ProcessHandle(pid=1234, attached=false)"
        );
    }

    #[test]
    fn test_handle_debug() {
        let handle = handle_with_token(5678);
        let debug = format!("{:?}", handle);
        assert!(debug.contains("ProcessHandle"));
        assert!(debug.contains("pid: 5678"));
        assert!(debug.contains("attached: true"));
    }

    #[test]
    fn test_handle_is_send() {
        fn requires_send<T: Send>() {}
        requires_send::<ProcessHandle>();
    }
}
