//! Region content fingerprints

use serde::{Deserialize, Serialize};
use std::fmt;

/// Length in bytes of a content digest.
pub const DIGEST_LEN: usize = 32;

/// Content fingerprint of one region at capture time.
///
/// `Content` carries a BLAKE3 digest over the region's bytes plus the number
/// of bytes hashed; `Unreadable` is the sentinel for regions whose bytes
/// could not be captured, structurally distinct from every possible digest.
/// Equal fingerprints are treated as equal content; a digest collision
/// producing a false "unchanged" is an accepted risk of this design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fingerprint {
    Content { digest: [u8; DIGEST_LEN], len: u64 },
    Unreadable,
}

impl Fingerprint {
    /// Fingerprints a byte slice in one shot.
    pub fn compute(bytes: &[u8]) -> Self {
        Fingerprint::Content {
            digest: blake3::hash(bytes).into(),
            len: bytes.len() as u64,
        }
    }

    pub const fn is_unreadable(&self) -> bool {
        matches!(self, Fingerprint::Unreadable)
    }

    /// Number of bytes the digest covers, if any were captured
    pub const fn captured_len(&self) -> Option<u64> {
        match self {
            Fingerprint::Content { len, .. } => Some(*len),
            Fingerprint::Unreadable => None,
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fingerprint::Content { digest, len } => {
                write!(f, "{}:{}", hex::encode(digest), len)
            }
            Fingerprint::Unreadable => write!(f, "unreadable"),
        }
    }
}

/// Streaming fingerprint construction for chunked region reads.
///
/// The snapshot builder feeds region bytes through this in chunks so a
/// full-region buffer never has to exist.
pub struct FingerprintBuilder {
    hasher: blake3::Hasher,
    len: u64,
}

impl FingerprintBuilder {
    pub fn new() -> Self {
        FingerprintBuilder {
            hasher: blake3::Hasher::new(),
            len: 0,
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.len += chunk.len() as u64;
    }

    pub fn finish(self) -> Fingerprint {
        Fingerprint::Content {
            digest: self.hasher.finalize().into(),
            len: self.len,
        }
    }
}

impl Default for FingerprintBuilder {
    fn default() -> Self {
        Self::new()
    }
}
