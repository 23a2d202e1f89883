#![cfg(test)]

use crate::config::Config;
use crate::hash::*;
use crate::merkle::MerkleTree;
use std::fmt;

pub const SIZE: usize = 0x10;

pub type Item = [u8; SIZE];

/// Folds the input onto 16 bytes with xor. Only good for tests: `node(a, a)`
/// is all zeroes and the result does not depend on the order of siblings.
#[derive(Debug, Copy, Clone, Default)]
pub struct XOR128;

impl XOR128 {
    pub fn new() -> XOR128 {
        XOR128
    }
}

impl Algorithm<Item> for XOR128 {
    #[inline]
    fn hash(&self, data: &[u8]) -> anyhow::Result<Item> {
        let mut h = [0u8; SIZE];
        for (i, x) in data.iter().enumerate() {
            h[i & (SIZE - 1)] ^= *x;
        }
        Ok(h)
    }
}

/// Prints an element as upper case hex, `0x` prefixed in alternate mode.
pub struct Hex<'a>(pub &'a [u8]);

impl fmt::UpperHex for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        for b in self.0 {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

/// Blocks `i * 93` for `i` in `0..leafs`.
pub fn blocks(leafs: usize) -> Vec<usize> {
    (0..leafs).map(|i| i * 93).collect()
}

pub fn get_vec_tree_from_slice(leafs: usize) -> MerkleTree<Item, XOR128> {
    MerkleTree::build(Config::new(XOR128::new()), &blocks(leafs))
        .expect("failed to create tree from slice")
}
