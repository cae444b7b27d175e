//! Engine context: backend selection and the snapshot/diff entry points
//!
//! A [`ForensicsEngine`] owns one backend and one validated configuration,
//! both fixed at construction. Every capture and comparison goes through
//! this context; there is no process-wide state behind it.

use crate::backend::{select_backend, OsBackend};
use crate::config::{Config, ConfigValidator};
use crate::core::types::{ForensicsError, ForensicsResult, ProcessId};
use crate::diff::SnapshotDiff;
use crate::process::ProcessHandle;
use crate::snapshot::{Snapshot, SnapshotBuilder};
use std::fmt;
use tracing::debug;

/// Read-only process introspection engine.
///
/// Construction selects the backend once; afterwards the engine is immutable
/// and can be shared between threads.
pub struct ForensicsEngine {
    backend: Box<dyn OsBackend>,
    config: Config,
}

impl ForensicsEngine {
    /// Creates an engine with the default configuration and the platform
    /// backend.
    pub fn new() -> ForensicsResult<Self> {
        Self::with_config(Config::default())
    }

    /// Creates an engine from a configuration, selecting the backend the
    /// configuration names.
    pub fn with_config(config: Config) -> ForensicsResult<Self> {
        ConfigValidator::validate(&config)
            .map_err(|err| ForensicsError::InvalidArgument(err.to_string()))?;
        let backend = select_backend(config.backend.kind, config.backend.read_strategy)?;
        debug!(backend = backend.name(), "engine constructed");
        Ok(ForensicsEngine { backend, config })
    }

    /// Creates an engine around an injected backend. Used by tests and by
    /// embedders with their own platform layer.
    pub fn with_backend(backend: Box<dyn OsBackend>, config: Config) -> ForensicsResult<Self> {
        ConfigValidator::validate(&config)
            .map_err(|err| ForensicsError::InvalidArgument(err.to_string()))?;
        Ok(ForensicsEngine { backend, config })
    }

    /// Name of the active backend
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// The validated configuration the engine was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Attaches to a process for reading.
    ///
    /// The returned handle owns the attachment; dropping it or passing it to
    /// [`detach`](Self::detach) releases the underlying OS resources.
    pub fn attach(&self, pid: ProcessId) -> ForensicsResult<ProcessHandle> {
        if pid == 0 {
            return Err(ForensicsError::InvalidArgument(
                "pid must be non-zero".to_string(),
            ));
        }
        self.backend.attach(pid)
    }

    /// Detaches from a process. Best-effort and idempotent; detaching an
    /// already-detached handle does nothing.
    pub fn detach(&self, handle: &mut ProcessHandle) {
        self.backend.detach(handle);
    }

    /// Captures an immutable snapshot of the attached process's regions.
    pub fn create_snapshot(&self, handle: &ProcessHandle) -> ForensicsResult<Snapshot> {
        SnapshotBuilder::new(self.backend.as_ref(), &self.config.capture).capture(handle)
    }

    /// Compares two snapshots of the same process, `old` taken before `new`.
    pub fn diff_snapshots(
        &self,
        old: &Snapshot,
        new: &Snapshot,
    ) -> ForensicsResult<SnapshotDiff> {
        SnapshotDiff::between(old, new)
    }
}

impl fmt::Debug for ForensicsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForensicsEngine")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish()
    }
}
