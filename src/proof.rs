use log::trace;
use serde::{Deserialize, Serialize};

use crate::block::DataBlock;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::hash::{Algorithm, Element};
use crate::merkle::{combine, hash_leaf};

/// Where a proof sibling sits relative to the node being climbed.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The sibling is the left child, the running hash the right one.
    Left,
    /// The sibling is the right child, the running hash the left one.
    Right,
}

/// Merkle tree inclusion proof for data element, for which item = Leaf(Hash(Data Item)).
///
/// Layout, from the leaf layer up to just below the root:
///
/// ```text
/// siblings: [ s0   s1   s2  ... ]
/// sides:    [ R    L    R   ... ]
/// ```
///
/// The proof owns copies of the hashes and does not borrow from the tree, so
/// it can outlive it. It carries neither the leaf nor the root: both are
/// supplied by whoever verifies it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Proof<T> {
    siblings: Vec<T>,
    sides: Vec<Side>,
}

impl<T: Element> Proof<T> {
    /// Creates new MT inclusion proof
    pub fn new(siblings: Vec<T>, sides: Vec<Side>) -> Result<Proof<T>> {
        let proof = Proof { siblings, sides };
        proof.check()?;
        Ok(proof)
    }

    fn check(&self) -> Result<()> {
        if self.siblings.len() != self.sides.len() {
            return Err(Error::MalformedProof(format!(
                "{} siblings but {} sides",
                self.siblings.len(),
                self.sides.len()
            )));
        }
        Ok(())
    }

    /// Number of steps, equal to the depth of the tree it came from.
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    /// `true` for the proof of a single leaf tree, whose root is the leaf.
    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Returns the sibling hashes, leaf layer first.
    pub fn siblings(&self) -> &[T] {
        &self.siblings
    }

    /// Returns the side of each sibling.
    pub fn sides(&self) -> &[Side] {
        &self.sides
    }

    /// Iterates over `(sibling, side)` pairs, leaf layer first.
    pub fn steps(&self) -> impl Iterator<Item = (&T, Side)> + '_ {
        self.siblings.iter().zip(self.sides.iter().copied())
    }

    /// Folds `leaf` with the proof, returning the root it leads to.
    pub fn compute_root<A: Algorithm<T>>(&self, config: &Config<A>, leaf: &T) -> Result<T> {
        self.check()?;
        let mut h = leaf.clone();
        for (sibling, side) in self.steps() {
            h = match side {
                Side::Left => combine(config, sibling, &h)?,
                Side::Right => combine(config, &h, sibling)?,
            };
        }
        Ok(h)
    }
}

/// Verifies that `leaf` is included under `root` according to `proof`.
///
/// A proof that does not lead to `root` yields `Ok(false)`. Errors are
/// reserved for proofs that are malformed and for failing hash functions.
/// The depth of the tree is not known here, so a proof of any length is
/// accepted as long as it folds into `root`.
pub fn verify<T, A>(config: &Config<A>, leaf: &T, proof: &Proof<T>, root: &T) -> Result<bool>
where
    T: Element,
    A: Algorithm<T>,
{
    let computed = proof.compute_root(config, leaf)?;
    let ok = &computed == root;
    trace!("verified proof of length {}: {}", proof.len(), ok);
    Ok(ok)
}

/// Verifies that `block` is included under `root`, hashing it into its leaf
/// first the same way a build would.
pub fn verify_block<T, A, B>(config: &Config<A>, block: &B, proof: &Proof<T>, root: &T) -> Result<bool>
where
    T: Element,
    A: Algorithm<T>,
    B: DataBlock + ?Sized,
{
    let leaf = hash_leaf(config, block)?;
    verify(config, &leaf, proof, root)
}
