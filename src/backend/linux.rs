//! Linux backend over procfs
//!
//! Attachment opens `/proc/<pid>/mem` (the kernel performs its ptrace-mode
//! access check at open time, so permission problems surface at attach).
//! Region enumeration parses `/proc/<pid>/maps` in a single pass. Reads go
//! through `pread` on the mem file or `process_vm_readv`, per the
//! configured strategy.

use super::{OsBackend, ReadStrategy};
use crate::core::types::{
    Address, ForensicsError, ForensicsResult, MemoryRegion, Permissions, ProcessId,
};
use crate::process::ProcessHandle;
use std::fs::{self, File};
use std::io;
use std::os::unix::fs::FileExt;
use tracing::debug;

/// Attachment token: the open mem file plus the pid in kernel form.
struct ProcfsToken {
    pid: libc::pid_t,
    mem: File,
}

/// Backend reading a target through the proc filesystem.
pub struct ProcfsBackend {
    strategy: ReadStrategy,
}

impl ProcfsBackend {
    pub fn new(strategy: ReadStrategy) -> Self {
        ProcfsBackend { strategy }
    }

    fn token<'a>(&self, handle: &'a ProcessHandle) -> ForensicsResult<&'a ProcfsToken> {
        let token = handle.token().ok_or_else(|| {
            ForensicsError::InvalidArgument("process handle is detached".to_string())
        })?;
        token.downcast_ref::<ProcfsToken>().ok_or_else(|| {
            ForensicsError::internal("process handle does not belong to the procfs backend")
        })
    }

    fn read_proc_mem(token: &ProcfsToken, address: Address, buf: &mut [u8]) -> ForensicsResult<()> {
        token
            .mem
            .read_exact_at(buf, address.as_usize() as u64)
            .map_err(|e| map_read_error(token.pid as ProcessId, address, &e))
    }

    fn read_vm_readv(token: &ProcfsToken, address: Address, buf: &mut [u8]) -> ForensicsResult<()> {
        if buf.is_empty() {
            return Ok(());
        }
        let local = libc::iovec {
            iov_base: buf.as_mut_ptr() as *mut libc::c_void,
            iov_len: buf.len(),
        };
        let remote = libc::iovec {
            iov_base: address.as_usize() as *mut libc::c_void,
            iov_len: buf.len(),
        };
        let copied = unsafe { libc::process_vm_readv(token.pid, &local, 1, &remote, 1, 0) };
        if copied < 0 {
            let err = io::Error::last_os_error();
            return Err(map_read_error(token.pid as ProcessId, address, &err));
        }
        if copied as usize != buf.len() {
            return Err(ForensicsError::unreadable(
                address,
                format!("short read: {copied} of {} bytes", buf.len()),
            ));
        }
        Ok(())
    }
}

impl Default for ProcfsBackend {
    fn default() -> Self {
        ProcfsBackend::new(ReadStrategy::default())
    }
}

impl OsBackend for ProcfsBackend {
    fn name(&self) -> &'static str {
        "procfs"
    }

    fn attach(&self, pid: ProcessId) -> ForensicsResult<ProcessHandle> {
        let raw_pid = to_pid_t(pid)?;
        let mem = File::open(format!("/proc/{pid}/mem"))
            .map_err(|e| map_attach_error(pid, &e))?;
        debug!(pid, strategy = ?self.strategy, "attached via procfs");
        Ok(ProcessHandle::new(
            pid,
            Box::new(ProcfsToken { pid: raw_pid, mem }),
        ))
    }

    fn enumerate_regions(&self, handle: &ProcessHandle) -> ForensicsResult<Vec<MemoryRegion>> {
        let token = self.token(handle)?;
        let pid = token.pid;
        // One read of the whole file; the mapping table is as coherent as
        // procfs allows.
        let content = fs::read_to_string(format!("/proc/{pid}/maps")).map_err(|e| {
            if e.kind() == io::ErrorKind::PermissionDenied {
                ForensicsError::access_denied(pid as ProcessId, e.to_string())
            } else {
                ForensicsError::internal(format!("failed to read process maps: {e}"))
            }
        })?;
        let regions = parse_maps(&content);
        debug!(pid, count = regions.len(), "enumerated mapped regions");
        Ok(regions)
    }

    fn read(
        &self,
        handle: &ProcessHandle,
        address: Address,
        buf: &mut [u8],
    ) -> ForensicsResult<()> {
        let token = self.token(handle)?;
        match self.strategy {
            ReadStrategy::ProcMem => Self::read_proc_mem(token, address, buf),
            ReadStrategy::VmReadv => Self::read_vm_readv(token, address, buf),
        }
    }
}

fn to_pid_t(pid: ProcessId) -> ForensicsResult<libc::pid_t> {
    if pid == 0 {
        return Err(ForensicsError::InvalidArgument(
            "pid must be non-zero".to_string(),
        ));
    }
    libc::pid_t::try_from(pid)
        .map_err(|_| ForensicsError::InvalidArgument(format!("pid {pid} out of range")))
}

fn map_attach_error(pid: ProcessId, err: &io::Error) -> ForensicsError {
    match err.kind() {
        io::ErrorKind::NotFound => ForensicsError::ProcessNotFound(pid),
        io::ErrorKind::PermissionDenied => ForensicsError::access_denied(pid, err.to_string()),
        _ => ForensicsError::internal(format!("failed to open /proc/{pid}/mem: {err}")),
    }
}

fn map_read_error(pid: ProcessId, address: Address, err: &io::Error) -> ForensicsError {
    if err.kind() == io::ErrorKind::PermissionDenied {
        ForensicsError::access_denied(pid, format!("read at {address} refused: {err}"))
    } else {
        ForensicsError::unreadable(address, err.to_string())
    }
}

/// Parses the text of a maps file. Lines that do not look like mappings
/// are skipped.
fn parse_maps(content: &str) -> Vec<MemoryRegion> {
    content.lines().filter_map(parse_maps_line).collect()
}

fn parse_maps_line(line: &str) -> Option<MemoryRegion> {
    let mut fields = line.split_whitespace();
    let range = fields.next()?;
    let perms = fields.next()?;
    let (start, end) = range.split_once('-')?;
    let start = usize::from_str_radix(start, 16).ok()?;
    let end = usize::from_str_radix(end, 16).ok()?;
    let permissions = perms.parse::<Permissions>().ok()?;
    Some(MemoryRegion::new(
        Address::new(start),
        Address::new(end),
        permissions,
    ))
}
