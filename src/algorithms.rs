//! Ready made [`Algorithm`]s for common digests.
//!
//! The tree does not depend on any of them, they are only compiled in with
//! their cargo feature (`sha2`, `blake3`).

use crate::hash::Algorithm;

/// SHA-256 over the raw bytes, nodes hash `left || right`.
#[cfg(feature = "sha2")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Algorithm;

#[cfg(feature = "sha2")]
impl Algorithm<[u8; 32]> for Sha256Algorithm {
    #[inline]
    fn hash(&self, data: &[u8]) -> anyhow::Result<[u8; 32]> {
        use sha2::Digest;
        Ok(sha2::Sha256::digest(data).into())
    }

    #[inline]
    fn node(&self, left: &[u8; 32], right: &[u8; 32]) -> anyhow::Result<[u8; 32]> {
        use sha2::Digest;
        let mut h = sha2::Sha256::new();
        h.update(left);
        h.update(right);
        Ok(h.finalize().into())
    }
}

/// BLAKE3 over the raw bytes, nodes hash `left || right`.
#[cfg(feature = "blake3")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Algorithm;

#[cfg(feature = "blake3")]
impl Algorithm<[u8; 32]> for Blake3Algorithm {
    #[inline]
    fn hash(&self, data: &[u8]) -> anyhow::Result<[u8; 32]> {
        Ok(*blake3::hash(data).as_bytes())
    }

    #[inline]
    fn node(&self, left: &[u8; 32], right: &[u8; 32]) -> anyhow::Result<[u8; 32]> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(left);
        hasher.update(right);
        Ok(*hasher.finalize().as_bytes())
    }
}
