//! OS backend abstraction
//!
//! Everything the engine knows about a platform goes through [`OsBackend`]:
//! attach to a process, detach from it, enumerate its mapped regions, read
//! a range of its memory. One backend is selected when the engine context
//! is built and injected as a single trait-object indirection; nothing is
//! re-dispatched per call.

use crate::core::types::{Address, ForensicsError, ForensicsResult, MemoryRegion, ProcessId};
use crate::process::ProcessHandle;
use serde::{Deserialize, Serialize};

#[cfg(target_os = "linux")]
pub mod linux;
pub mod mock;
#[cfg(windows)]
pub mod windows;

#[cfg(target_os = "linux")]
pub use linux::ProcfsBackend;
pub use mock::{MockBackend, MockController};
#[cfg(windows)]
pub use windows::WinapiBackend;

/// Platform capability table.
///
/// Contract, shared by every implementation:
/// - `attach` validates the target and returns a handle carrying a
///   backend-private token; it must not disturb the target.
/// - `detach` is best-effort and idempotent; it never fails observably.
/// - `enumerate_regions` reflects the mapping table at one coherent instant
///   as far as the platform allows, sorted by start address and
///   non-overlapping.
/// - `read` fills the whole buffer or fails; it never truncates silently
///   and never writes to the target.
///
/// A backend handed a token minted by a different backend must report
/// [`ForensicsError::Internal`].
pub trait OsBackend: Send + Sync {
    /// Short identifier used in logs and `Unsupported` errors
    fn name(&self) -> &'static str;

    fn attach(&self, pid: ProcessId) -> ForensicsResult<ProcessHandle>;

    fn detach(&self, handle: &mut ProcessHandle) {
        handle.release();
    }

    fn enumerate_regions(&self, handle: &ProcessHandle) -> ForensicsResult<Vec<MemoryRegion>>;

    fn read(
        &self,
        handle: &ProcessHandle,
        address: Address,
        buf: &mut [u8],
    ) -> ForensicsResult<()>;
}

impl std::fmt::Debug for dyn OsBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsBackend")
            .field("name", &self.name())
            .finish()
    }
}

/// Which backend the engine context should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Platform default: procfs on Linux, winapi on Windows
    #[default]
    Auto,
    Procfs,
    Winapi,
}

/// How the procfs backend reads target memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadStrategy {
    /// `pread` on `/proc/<pid>/mem`
    #[default]
    ProcMem,
    /// `process_vm_readv` syscall
    VmReadv,
}

/// Instantiates the backend a [`BackendKind`] names.
///
/// Fails with `Unsupported` when the requested backend does not exist on
/// the compilation target.
pub fn select_backend(
    kind: BackendKind,
    strategy: ReadStrategy,
) -> ForensicsResult<Box<dyn OsBackend>> {
    match kind {
        BackendKind::Auto => platform_default(strategy),
        BackendKind::Procfs => procfs_backend(strategy),
        BackendKind::Winapi => winapi_backend(),
    }
}

#[cfg(target_os = "linux")]
fn platform_default(strategy: ReadStrategy) -> ForensicsResult<Box<dyn OsBackend>> {
    procfs_backend(strategy)
}

#[cfg(windows)]
fn platform_default(_strategy: ReadStrategy) -> ForensicsResult<Box<dyn OsBackend>> {
    winapi_backend()
}

#[cfg(not(any(target_os = "linux", windows)))]
fn platform_default(_strategy: ReadStrategy) -> ForensicsResult<Box<dyn OsBackend>> {
    Err(ForensicsError::unsupported(
        "auto",
        "no backend implemented for this platform",
    ))
}

#[cfg(target_os = "linux")]
fn procfs_backend(strategy: ReadStrategy) -> ForensicsResult<Box<dyn OsBackend>> {
    Ok(Box::new(linux::ProcfsBackend::new(strategy)))
}

#[cfg(not(target_os = "linux"))]
fn procfs_backend(_strategy: ReadStrategy) -> ForensicsResult<Box<dyn OsBackend>> {
    Err(ForensicsError::unsupported(
        "procfs",
        "the procfs backend requires Linux",
    ))
}

#[cfg(windows)]
fn winapi_backend() -> ForensicsResult<Box<dyn OsBackend>> {
    Ok(Box::new(windows::WinapiBackend::new()))
}

#[cfg(not(windows))]
fn winapi_backend() -> ForensicsResult<Box<dyn OsBackend>> {
    Err(ForensicsError::unsupported(
        "winapi",
        "the winapi backend requires Windows",
    ))
}
