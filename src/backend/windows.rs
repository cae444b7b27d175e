//! Windows backend over the Win32 process APIs
//!
//! Attachment opens the target with query and read rights; enumeration
//! walks the address space with `VirtualQueryEx`, keeping committed
//! regions; reads go through `ReadProcessMemory`.

use super::OsBackend;
use crate::core::types::{
    Address, ForensicsError, ForensicsResult, MemoryRegion, Permissions, ProcessId,
};
use crate::process::ProcessHandle;
use std::{io, mem};
use tracing::debug;
use winapi::shared::minwindef::{FALSE, LPCVOID, LPVOID};
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::{ReadProcessMemory, VirtualQueryEx};
use winapi::um::processthreadsapi::OpenProcess;
use winapi::um::winnt::{
    HANDLE, MEMORY_BASIC_INFORMATION, MEM_COMMIT, PAGE_EXECUTE, PAGE_EXECUTE_READ,
    PAGE_EXECUTE_READWRITE, PAGE_EXECUTE_WRITECOPY, PAGE_GUARD, PAGE_READONLY, PAGE_READWRITE,
    PAGE_WRITECOPY, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
};

const ERROR_ACCESS_DENIED: i32 = 5;
const ERROR_INVALID_PARAMETER: i32 = 87;

/// RAII owner of the OS process handle.
struct RawHandle {
    handle: HANDLE,
}

impl RawHandle {
    fn raw(&self) -> HANDLE {
        self.handle
    }
}

impl Drop for RawHandle {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            // Errors on cleanup are ignored.
            unsafe {
                CloseHandle(self.handle);
            }
        }
    }
}

// HANDLEs are process-local tokens, not thread-affine.
unsafe impl Send for RawHandle {}

/// Attachment token: the owned OS handle.
struct WinToken {
    handle: RawHandle,
}

/// Backend reading a target through the Win32 debug APIs.
pub struct WinapiBackend;

impl WinapiBackend {
    pub fn new() -> Self {
        WinapiBackend
    }

    fn token<'a>(&self, handle: &'a ProcessHandle) -> ForensicsResult<&'a WinToken> {
        let token = handle.token().ok_or_else(|| {
            ForensicsError::InvalidArgument("process handle is detached".to_string())
        })?;
        token.downcast_ref::<WinToken>().ok_or_else(|| {
            ForensicsError::internal("process handle does not belong to the winapi backend")
        })
    }
}

impl Default for WinapiBackend {
    fn default() -> Self {
        WinapiBackend::new()
    }
}

impl OsBackend for WinapiBackend {
    fn name(&self) -> &'static str {
        "winapi"
    }

    fn attach(&self, pid: ProcessId) -> ForensicsResult<ProcessHandle> {
        if pid == 0 {
            return Err(ForensicsError::InvalidArgument(
                "pid must be non-zero".to_string(),
            ));
        }
        let raw = unsafe { OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, FALSE, pid) };
        if raw.is_null() {
            return Err(map_attach_error(pid, &io::Error::last_os_error()));
        }
        debug!(pid, "attached via winapi");
        Ok(ProcessHandle::new(
            pid,
            Box::new(WinToken {
                handle: RawHandle { handle: raw },
            }),
        ))
    }

    fn enumerate_regions(&self, handle: &ProcessHandle) -> ForensicsResult<Vec<MemoryRegion>> {
        let token = self.token(handle)?;
        let mut regions = Vec::new();
        let mut current: usize = 0;

        loop {
            let mut mbi: MEMORY_BASIC_INFORMATION = unsafe { mem::zeroed() };
            let len = unsafe {
                VirtualQueryEx(
                    token.handle.raw(),
                    current as LPCVOID,
                    &mut mbi,
                    mem::size_of::<MEMORY_BASIC_INFORMATION>(),
                )
            };
            if len == 0 {
                // Past the last user-mode allocation.
                break;
            }
            let base = mbi.BaseAddress as usize;
            let size = mbi.RegionSize;
            if size == 0 {
                break;
            }
            if mbi.State == MEM_COMMIT {
                let end = match base.checked_add(size) {
                    Some(end) => end,
                    None => break,
                };
                regions.push(MemoryRegion::new(
                    Address::new(base),
                    Address::new(end),
                    permissions_from_protect(mbi.Protect),
                ));
            }
            current = match base.checked_add(size) {
                Some(next) => next,
                None => break,
            };
        }

        debug!(
            pid = handle.pid(),
            count = regions.len(),
            "enumerated committed regions"
        );
        Ok(regions)
    }

    fn read(
        &self,
        handle: &ProcessHandle,
        address: Address,
        buf: &mut [u8],
    ) -> ForensicsResult<()> {
        let token = self.token(handle)?;
        if buf.is_empty() {
            return Ok(());
        }
        let mut bytes_read: usize = 0;
        let ok = unsafe {
            ReadProcessMemory(
                token.handle.raw(),
                address.as_usize() as LPCVOID,
                buf.as_mut_ptr() as LPVOID,
                buf.len(),
                &mut bytes_read,
            )
        };
        if ok == FALSE {
            let err = io::Error::last_os_error();
            return Err(if err.raw_os_error() == Some(ERROR_ACCESS_DENIED) {
                ForensicsError::access_denied(handle.pid(), format!("read at {address}: {err}"))
            } else {
                ForensicsError::unreadable(address, err.to_string())
            });
        }
        if bytes_read != buf.len() {
            return Err(ForensicsError::unreadable(
                address,
                format!("short read: {bytes_read} of {} bytes", buf.len()),
            ));
        }
        Ok(())
    }
}

fn map_attach_error(pid: ProcessId, err: &io::Error) -> ForensicsError {
    match err.raw_os_error() {
        Some(ERROR_ACCESS_DENIED) => ForensicsError::access_denied(pid, err.to_string()),
        Some(ERROR_INVALID_PARAMETER) => ForensicsError::ProcessNotFound(pid),
        _ => ForensicsError::internal(format!("OpenProcess failed for pid {pid}: {err}")),
    }
}

/// Collapses a `PAGE_*` protection mask to the R/W/X set. Guard pages are
/// reported with no access bits: touching one would disturb the target.
fn permissions_from_protect(protect: u32) -> Permissions {
    if protect & PAGE_GUARD != 0 {
        return Permissions::none();
    }

    const READABLE: u32 = PAGE_READONLY
        | PAGE_READWRITE
        | PAGE_WRITECOPY
        | PAGE_EXECUTE_READ
        | PAGE_EXECUTE_READWRITE
        | PAGE_EXECUTE_WRITECOPY;
    const WRITABLE: u32 =
        PAGE_READWRITE | PAGE_WRITECOPY | PAGE_EXECUTE_READWRITE | PAGE_EXECUTE_WRITECOPY;
    const EXECUTABLE: u32 =
        PAGE_EXECUTE | PAGE_EXECUTE_READ | PAGE_EXECUTE_READWRITE | PAGE_EXECUTE_WRITECOPY;

    let mut perms = Vec::new();
    if protect & READABLE != 0 {
        perms.push(Permissions::READ);
    }
    if protect & WRITABLE != 0 {
        perms.push(Permissions::WRITE);
    }
    if protect & EXECUTABLE != 0 {
        perms.push(Permissions::EXECUTE);
    }
    Permissions::combine(&perms)
}
