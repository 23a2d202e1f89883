//! Hash infrastructure for items in Merkle Tree.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;

/// Element stored in the merkle tree.
///
/// Elements are fixed width: every hash produced by an [`Algorithm`] for a
/// given tree has the same `byte_len()`.
pub trait Element: Ord + Clone + AsRef<[u8]> + Sync + Send + fmt::Debug {
    /// Returns the length of an element when serialized as a byte slice.
    fn byte_len() -> usize;

    /// Creates the element from its byte form. Panics if the slice is not appropriately sized.
    fn from_slice(bytes: &[u8]) -> Self;
}

impl<const N: usize> Element for [u8; N] {
    fn byte_len() -> usize {
        N
    }

    fn from_slice(bytes: &[u8]) -> Self {
        assert_eq!(bytes.len(), Self::byte_len());
        let mut el = [0u8; N];
        el.copy_from_slice(bytes);
        el
    }
}

/// Hashing algorithm type.
///
/// The algorithm is the only place the tree learns how bytes become hashes,
/// which keeps the engine independent of any particular digest.
///
/// Both operations are fallible. Most digests never fail, but an algorithm
/// backed by an external service or a hardware module might.
///
/// ```
/// use merkle_layers::Algorithm;
///
/// #[derive(Clone, Default)]
/// struct Xor8;
///
/// impl Algorithm<[u8; 8]> for Xor8 {
///     fn hash(&self, data: &[u8]) -> anyhow::Result<[u8; 8]> {
///         let mut h = [0u8; 8];
///         for (i, b) in data.iter().enumerate() {
///             h[i % 8] ^= b;
///         }
///         Ok(h)
///     }
/// }
///
/// let a = Xor8;
/// let l = a.hash(b"left").unwrap();
/// let r = a.hash(b"right").unwrap();
/// // Nodes hash the concatenation of the child hashes.
/// let mut cat = l.to_vec();
/// cat.extend_from_slice(&r);
/// assert_eq!(a.node(&l, &r).unwrap(), a.hash(&cat).unwrap());
/// ```
pub trait Algorithm<T: Element>: Send + Sync {
    /// Returns the hash of `data`. Used for leaves.
    fn hash(&self, data: &[u8]) -> Result<T>;

    /// Returns the hash of an interior node from its two children.
    ///
    /// Defaults to hashing the concatenation `left || right`.
    fn node(&self, left: &T, right: &T) -> Result<T> {
        let mut buf = Vec::with_capacity(2 * T::byte_len());
        buf.extend_from_slice(left.as_ref());
        buf.extend_from_slice(right.as_ref());
        self.hash(&buf)
    }
}

type HashFn<T> = Arc<dyn Fn(&[u8]) -> Result<T> + Send + Sync>;
type CombineFn<T> = Arc<dyn Fn(&T, &T) -> Result<T> + Send + Sync>;

/// [`Algorithm`] assembled from plain functions.
///
/// Useful when the hash function is already available as a closure and a
/// dedicated type would only wrap it.
#[derive(Clone)]
pub struct FnAlgorithm<T> {
    hash: HashFn<T>,
    combine: Option<CombineFn<T>>,
}

impl<T: Element> FnAlgorithm<T> {
    /// Creates an algorithm from a hash function; nodes hash the concatenation
    /// of their children.
    pub fn new<F>(hash: F) -> Self
    where
        F: Fn(&[u8]) -> Result<T> + Send + Sync + 'static,
    {
        FnAlgorithm {
            hash: Arc::new(hash),
            combine: None,
        }
    }

    /// Replaces the default node combination.
    pub fn with_combine<F>(mut self, combine: F) -> Self
    where
        F: Fn(&T, &T) -> Result<T> + Send + Sync + 'static,
    {
        self.combine = Some(Arc::new(combine));
        self
    }
}

impl<T: Element> Algorithm<T> for FnAlgorithm<T> {
    fn hash(&self, data: &[u8]) -> Result<T> {
        (self.hash)(data)
    }

    fn node(&self, left: &T, right: &T) -> Result<T> {
        match &self.combine {
            Some(combine) => combine(left, right),
            None => {
                let mut buf = Vec::with_capacity(2 * T::byte_len());
                buf.extend_from_slice(left.as_ref());
                buf.extend_from_slice(right.as_ref());
                (self.hash)(&buf)
            }
        }
    }
}

impl<T> fmt::Debug for FnAlgorithm<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAlgorithm")
            .field("custom_combine", &self.combine.is_some())
            .finish()
    }
}
