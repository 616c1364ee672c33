use sha2::{Digest, Sha256};
use std::fmt;

/// Fixed-size fingerprint of a DOM region's serialized markup.
///
/// Only ever compared for equality; two snapshots of the same markup are
/// equal, anything else is treated as "the region re-rendered".
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    pub fn of(markup: &str) -> Self {
        Self(Sha256::digest(markup.as_bytes()).into())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self)
    }
}
