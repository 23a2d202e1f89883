//! Data blocks: anything that can turn itself into bytes.

use std::borrow::Cow;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;

/// A block of data the tree is built from.
///
/// The tree never looks inside a block, it only hashes the bytes returned by
/// [`serialize`](DataBlock::serialize). Serialization must be deterministic:
/// the same block has to produce the same bytes every time, otherwise proofs
/// generated from the tree will not verify against the block.
///
/// ```
/// use std::borrow::Cow;
/// use merkle_layers::DataBlock;
///
/// struct Transaction {
///     id: u64,
///     payload: Vec<u8>,
/// }
///
/// impl DataBlock for Transaction {
///     fn serialize(&self) -> anyhow::Result<Cow<'_, [u8]>> {
///         let mut out = self.id.to_le_bytes().to_vec();
///         out.extend_from_slice(&self.payload);
///         Ok(Cow::Owned(out))
///     }
/// }
/// ```
pub trait DataBlock {
    /// Returns the bytes this block is hashed from.
    fn serialize(&self) -> Result<Cow<'_, [u8]>>;
}

impl DataBlock for [u8] {
    fn serialize(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self))
    }
}

impl<const N: usize> DataBlock for [u8; N] {
    fn serialize(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&self[..]))
    }
}

impl DataBlock for Vec<u8> {
    fn serialize(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self.as_slice()))
    }
}

impl DataBlock for str {
    fn serialize(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }
}

impl DataBlock for String {
    fn serialize(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }
}

macro_rules! impl_int {
    ($($ty:ident)*) => {$(
        impl DataBlock for $ty {
            fn serialize(&self) -> Result<Cow<'_, [u8]>> {
                Ok(Cow::Owned(self.to_le_bytes().to_vec()))
            }
        }
    )*}
}

impl_int! { u8 u16 u32 u64 u128 usize i8 i16 i32 i64 i128 isize }

macro_rules! impl_deref {
    ($($ptr:ty),*) => {$(
        impl<T: ?Sized + DataBlock> DataBlock for $ptr {
            fn serialize(&self) -> Result<Cow<'_, [u8]>> {
                (**self).serialize()
            }
        }
    )*}
}

impl_deref! { &T, &mut T, Box<T>, Rc<T>, Arc<T> }
