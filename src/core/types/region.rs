//! Memory region and permission types

use super::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ForensicsError;

/// Access permissions of a mapped region, normalized to the R/W/X set.
///
/// Backends translate their native protection encodings (procfs permission
/// columns, Windows `PAGE_*` masks) into this three-bit form before regions
/// reach the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permissions {
    bits: u8,
}

impl Permissions {
    pub const READ: Permissions = Permissions { bits: 0b001 };
    pub const WRITE: Permissions = Permissions { bits: 0b010 };
    pub const EXECUTE: Permissions = Permissions { bits: 0b100 };

    /// No access bits set
    pub const fn none() -> Self {
        Permissions { bits: 0 }
    }

    /// Read-only permissions
    pub const fn read_only() -> Self {
        Self::READ
    }

    /// Read-write permissions
    pub const fn read_write() -> Self {
        Permissions {
            bits: Self::READ.bits | Self::WRITE.bits,
        }
    }

    /// Read-execute permissions
    pub const fn read_execute() -> Self {
        Permissions {
            bits: Self::READ.bits | Self::EXECUTE.bits,
        }
    }

    /// Combines multiple permission sets
    pub fn combine(perms: &[Permissions]) -> Self {
        let mut bits = 0;
        for p in perms {
            bits |= p.bits;
        }
        Permissions { bits }
    }

    /// Checks if all bits of `other` are present
    pub const fn contains(&self, other: Permissions) -> bool {
        self.bits & other.bits == other.bits
    }

    pub const fn is_readable(&self) -> bool {
        self.contains(Self::READ)
    }

    pub const fn is_writable(&self) -> bool {
        self.contains(Self::WRITE)
    }

    pub const fn is_executable(&self) -> bool {
        self.contains(Self::EXECUTE)
    }

    /// Raw bit value (bit 0 = read, bit 1 = write, bit 2 = execute)
    pub const fn bits(&self) -> u8 {
        self.bits
    }

    fn format_string(&self) -> String {
        if self.bits == 0 {
            return String::from("NONE");
        }
        let mut s = String::new();
        if self.is_readable() {
            s.push('R');
        }
        if self.is_writable() {
            s.push('W');
        }
        if self.is_executable() {
            s.push('X');
        }
        s
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_string())
    }
}

impl FromStr for Permissions {
    type Err = ForensicsError;

    /// Parses both the compact form (`"RW"`) and the procfs permission
    /// column (`"rw-p"`; the dash and share flag are ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("none") {
            return Ok(Permissions::none());
        }
        let mut perms = Permissions::none();
        for c in s.chars() {
            match c {
                'r' | 'R' => perms.bits |= Self::READ.bits,
                'w' | 'W' => perms.bits |= Self::WRITE.bits,
                'x' | 'X' => perms.bits |= Self::EXECUTE.bits,
                '-' | 'p' | 's' => {}
                _ => {
                    return Err(ForensicsError::InvalidArgument(format!(
                        "invalid permission string: {s}"
                    )))
                }
            }
        }
        Ok(perms)
    }
}

/// A contiguous range of a process's address space with uniform permissions.
///
/// `end` is exclusive and always greater than `start` for regions produced
/// by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRegion {
    pub start: Address,
    pub end: Address,
    pub permissions: Permissions,
}

impl MemoryRegion {
    pub fn new(start: Address, end: Address, permissions: Permissions) -> Self {
        MemoryRegion {
            start,
            end,
            permissions,
        }
    }

    /// Extent of the region in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_offset_from(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the two regions occupy the identical `[start, end)` range
    pub fn same_range(&self, other: &MemoryRegion) -> bool {
        self.start == other.start && self.end == other.end
    }

    /// Whether the address ranges intersect in at least one byte
    pub fn overlaps(&self, other: &MemoryRegion) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, address: Address) -> bool {
        address >= self.start && address < self.end
    }

    pub fn is_readable(&self) -> bool {
        self.permissions.is_readable()
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}-{:x} {}", self.start, self.end, self.permissions)
    }
}
