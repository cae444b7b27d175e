//! Deterministic in-memory backend for tests and examples
//!
//! A [`MockBackend`] serves attach, enumerate, and read requests out of a
//! table of synthetic processes. The paired [`MockController`] mutates that
//! table between snapshots, which is how tests stage permission flips,
//! content changes, unmapped regions, and injected failures without touching
//! a live process.

use super::OsBackend;
use crate::core::types::{
    Address, ForensicsError, ForensicsResult, MemoryRegion, Permissions, ProcessId,
};
use crate::process::ProcessHandle;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

struct MockRegion {
    region: MemoryRegion,
    bytes: Vec<u8>,
    readable: bool,
}

#[derive(Default)]
struct MockProcess {
    regions: Vec<MockRegion>,
    fail_enumeration: bool,
    deny_attach: bool,
}

#[derive(Default)]
struct MockState {
    processes: HashMap<ProcessId, MockProcess>,
}

struct MockToken;

/// Backend that reads from synthetic processes held in memory.
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

/// Mutating side of a [`MockBackend`].
///
/// Methods panic on unknown pids or region starts.
pub struct MockController {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Creates an empty backend and the controller that populates it.
    pub fn new() -> (MockBackend, MockController) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (
            MockBackend {
                state: Arc::clone(&state),
            },
            MockController { state },
        )
    }

    fn check_token(&self, handle: &ProcessHandle) -> ForensicsResult<()> {
        let token = handle.token().ok_or_else(|| {
            ForensicsError::InvalidArgument("process handle is detached".to_string())
        })?;
        if token.downcast_ref::<MockToken>().is_none() {
            return Err(ForensicsError::internal(
                "process handle does not belong to the mock backend",
            ));
        }
        Ok(())
    }
}

impl OsBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn attach(&self, pid: ProcessId) -> ForensicsResult<ProcessHandle> {
        if pid == 0 {
            return Err(ForensicsError::InvalidArgument(
                "pid must be non-zero".to_string(),
            ));
        }
        let state = self.state.lock().unwrap();
        let process = state
            .processes
            .get(&pid)
            .ok_or(ForensicsError::ProcessNotFound(pid))?;
        if process.deny_attach {
            return Err(ForensicsError::access_denied(pid, "attach denied"));
        }
        Ok(ProcessHandle::new(pid, Box::new(MockToken)))
    }

    /// Reports regions in insertion order; ordering and overlap handling are
    /// left to the snapshot layer.
    fn enumerate_regions(&self, handle: &ProcessHandle) -> ForensicsResult<Vec<MemoryRegion>> {
        self.check_token(handle)?;
        let state = self.state.lock().unwrap();
        let process = state
            .processes
            .get(&handle.pid())
            .ok_or(ForensicsError::ProcessNotFound(handle.pid()))?;
        if process.fail_enumeration {
            return Err(ForensicsError::internal("region enumeration failed"));
        }
        Ok(process.regions.iter().map(|r| r.region).collect())
    }

    fn read(
        &self,
        handle: &ProcessHandle,
        address: Address,
        buf: &mut [u8],
    ) -> ForensicsResult<()> {
        self.check_token(handle)?;
        if buf.is_empty() {
            return Ok(());
        }
        let state = self.state.lock().unwrap();
        let process = state
            .processes
            .get(&handle.pid())
            .ok_or(ForensicsError::ProcessNotFound(handle.pid()))?;

        let end = address
            .checked_add(buf.len())
            .ok_or_else(|| ForensicsError::unreadable(address, "address range overflows"))?;
        for mock in &process.regions {
            if address >= mock.region.start && end.as_usize() <= mock.region.end.as_usize() {
                if !mock.readable {
                    return Err(ForensicsError::unreadable(address, "region is unreadable"));
                }
                let offset = address.saturating_offset_from(mock.region.start);
                let slice = mock
                    .bytes
                    .get(offset..offset + buf.len())
                    .ok_or_else(|| ForensicsError::unreadable(address, "region bytes exhausted"))?;
                buf.copy_from_slice(slice);
                return Ok(());
            }
        }
        Err(ForensicsError::unreadable(address, "address is not mapped"))
    }
}

impl MockController {
    /// Registers an empty process.
    pub fn insert_process(&self, pid: ProcessId) {
        let mut state = self.state.lock().unwrap();
        state.processes.entry(pid).or_default();
    }

    /// Removes a process; later operations on it report `ProcessNotFound`.
    pub fn remove_process(&self, pid: ProcessId) {
        let mut state = self.state.lock().unwrap();
        state.processes.remove(&pid);
    }

    /// Adds a region starting at `start` whose extent is `bytes.len()`.
    /// The process is created if it does not exist yet. Overlapping or
    /// out-of-order regions are accepted as given.
    pub fn add_region(&self, pid: ProcessId, start: usize, perms: Permissions, bytes: Vec<u8>) {
        let mut state = self.state.lock().unwrap();
        let process = state.processes.entry(pid).or_default();
        let region = MemoryRegion::new(Address::new(start), Address::new(start + bytes.len()), perms);
        process.regions.push(MockRegion {
            region,
            bytes,
            readable: true,
        });
    }

    /// Removes the region starting at `start`.
    pub fn remove_region(&self, pid: ProcessId, start: usize) {
        let mut state = self.state.lock().unwrap();
        let process = state.processes.get_mut(&pid).expect("unknown mock pid");
        let before = process.regions.len();
        process.regions.retain(|r| r.region.start.as_usize() != start);
        assert!(process.regions.len() < before, "no region starts at {start:#x}");
    }

    /// Overwrites bytes inside an existing region.
    pub fn patch(&self, pid: ProcessId, address: usize, bytes: &[u8]) {
        let mut state = self.state.lock().unwrap();
        let process = state.processes.get_mut(&pid).expect("unknown mock pid");
        let target = Address::new(address);
        let mock = process
            .regions
            .iter_mut()
            .find(|r| r.region.contains(target))
            .expect("patch address is not mapped");
        let offset = target.saturating_offset_from(mock.region.start);
        mock.bytes[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Replaces the permissions of the region starting at `start`.
    pub fn set_permissions(&self, pid: ProcessId, start: usize, perms: Permissions) {
        let mut state = self.state.lock().unwrap();
        let process = state.processes.get_mut(&pid).expect("unknown mock pid");
        let mock = process
            .regions
            .iter_mut()
            .find(|r| r.region.start.as_usize() == start)
            .expect("no region at start address");
        mock.region.permissions = perms;
    }

    /// Marks the region starting at `start` so reads of it fail.
    pub fn poison_region(&self, pid: ProcessId, start: usize) {
        let mut state = self.state.lock().unwrap();
        let process = state.processes.get_mut(&pid).expect("unknown mock pid");
        let mock = process
            .regions
            .iter_mut()
            .find(|r| r.region.start.as_usize() == start)
            .expect("no region at start address");
        mock.readable = false;
    }

    /// Makes region enumeration fail for the process.
    pub fn fail_enumeration(&self, pid: ProcessId, fail: bool) {
        let mut state = self.state.lock().unwrap();
        let process = state.processes.get_mut(&pid).expect("unknown mock pid");
        process.fail_enumeration = fail;
    }

    /// Makes attach report `AccessDenied` for the process.
    pub fn deny_attach(&self, pid: ProcessId, deny: bool) {
        let mut state = self.state.lock().unwrap();
        let process = state.processes.entry(pid).or_default();
        process.deny_attach = deny;
    }
}
