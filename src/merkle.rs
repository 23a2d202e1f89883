use std::time::Instant;

use log::{debug, trace};

use crate::block::DataBlock;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::hash::{Algorithm, Element};
use crate::pool::WorkerPool;
use crate::proof::{self, Proof, Side};

/// Merkle Tree.
///
/// Every layer is stored as its own vec, from the leaves (layer 0) up to the
/// single element root layer.
///
/// A merkle tree is a tree in which every non-leaf node is the hash of its
/// children nodes. A diagram depicting how it works:
///
/// ```text
///         root = h1234 = h(h12 + h34)
///        /                           \
///  h12 = h(h1 + h2)            h34 = h(h3 + h4)
///   /            \              /            \
/// h1 = h(tx1)  h2 = h(tx2)    h3 = h(tx3)  h4 = h(tx4)
/// ```
///
/// In memory layout:
///
/// ```text
///     [[h1 h2 h3 h4] [h12 h34] [root]]
/// ```
///
/// The number of inputs is not always a power of two. When a layer has an odd
/// number of nodes and [`Config::allow_duplicates`] is set, its last node is
/// paired with itself. The duplicate is only used while hashing, it is never
/// stored, so `len(layer[i + 1]) == ceil(len(layer[i]) / 2)` and
/// `leafs()` is the number of input blocks.
///
/// A tree is immutable once built. [`rebuild`](MerkleTree::rebuild) swaps in
/// a completely new set of layers, or leaves the tree untouched on error.
#[derive(Debug, Clone)]
pub struct MerkleTree<T, A>
where
    T: Element,
    A: Algorithm<T>,
{
    layers: Vec<Vec<T>>,
    config: Config<A>,

    // Cache with the `root` of the tree, the single element of the last layer.
    root: T,
}

impl<T: Element, A: Algorithm<T>> MerkleTree<T, A> {
    /// Builds a tree over `blocks`, in order.
    ///
    /// Blocks are hashed into leaves, then adjacent pairs are combined layer
    /// by layer until a single root is left. With
    /// [`Config::run_in_parallel`] both steps run on a pool of
    /// [`Config::worker_count`] threads and produce exactly the same tree as
    /// a sequential build.
    ///
    /// Nothing is returned on failure: either the whole tree is built or
    /// none of it is observable.
    pub fn build<B: DataBlock + Sync>(config: Config<A>, blocks: &[B]) -> Result<Self> {
        config.validate()?;
        if blocks.is_empty() {
            return Err(Error::EmptyInput);
        }

        let started = Instant::now();
        let pool = if config.run_in_parallel {
            Some(WorkerPool::new(config.worker_count)?)
        } else {
            None
        };
        debug!(
            "building merkle tree over {} blocks ({})",
            blocks.len(),
            match &pool {
                Some(_) => format!("parallel, {} workers", config.worker_count),
                None => String::from("sequential"),
            }
        );

        let leaves = match &pool {
            Some(pool) => pool.hash_leaves(&config, blocks)?,
            None => blocks
                .iter()
                .enumerate()
                .map(|(i, block)| leaf_at(&config, i, block))
                .collect::<Result<Vec<T>>>()?,
        };

        let layers = Self::build_layers(&config, pool.as_ref(), leaves, started)?;
        let root = match layers.last().and_then(|layer| layer.first()) {
            Some(root) => root.clone(),
            None => return Err(Error::EmptyInput),
        };

        debug!(
            "built merkle tree of depth {} in {:?}",
            layers.len() - 1,
            started.elapsed()
        );

        Ok(MerkleTree {
            layers,
            config,
            root,
        })
    }

    fn build_layers(
        config: &Config<A>,
        pool: Option<&WorkerPool>,
        leaves: Vec<T>,
        started: Instant,
    ) -> Result<Vec<Vec<T>>> {
        let mut layers = Vec::with_capacity(tree_depth(leaves.len()) + 1);
        layers.push(leaves);

        let mut level = 0;
        while layers[level].len() > 1 {
            let layer = &layers[level];
            let width = layer.len();

            if let Some(deadline) = config.deadline {
                if started.elapsed() >= deadline {
                    debug!("deadline of {:?} passed before layer {}", deadline, level);
                    return Err(Error::DeadlineExceeded { level });
                }
            }

            if width & 1 == 1 {
                if !config.allow_duplicates {
                    return Err(Error::OddLeafCount { level, width });
                }
                trace!("layer {}: duplicating last of {} nodes", level, width);
            }

            let next = match pool {
                Some(pool) => pool.combine_layer(config, layer)?,
                None => combine_layer(config, layer)?,
            };
            trace!("layer {}: {} -> {} nodes", level, width, next.len());

            layers.push(next);
            level += 1;
        }

        Ok(layers)
    }

    /// Replaces this tree with one built from `blocks` using the same
    /// configuration. On error the current tree is kept as it was.
    pub fn rebuild<B: DataBlock + Sync>(&mut self, blocks: &[B]) -> Result<()>
    where
        A: Clone,
    {
        *self = Self::build(self.config.clone(), blocks)?;
        Ok(())
    }

    /// Generate merkle tree inclusion proof for leaf `i`.
    ///
    /// The proof holds one sibling per layer below the root, so its length is
    /// always [`depth`](MerkleTree::depth). Where the sibling was a padding
    /// duplicate, the duplicated node is recorded like any other sibling.
    pub fn prove(&self, i: usize) -> Result<Proof<T>> {
        if i >= self.leafs() {
            return Err(Error::IndexOutOfRange {
                index: i,
                leafs: self.leafs(),
            });
        }

        let depth = self.depth();
        let mut siblings = Vec::with_capacity(depth);
        let mut sides = Vec::with_capacity(depth);

        let mut j = i;
        for layer in &self.layers[..depth] {
            if j & 1 == 0 {
                // j is left, a missing right sibling is the duplicate of j
                siblings.push(layer.get(j + 1).unwrap_or(&layer[j]).clone());
                sides.push(Side::Right);
            } else {
                // j is right
                siblings.push(layer[j - 1].clone());
                sides.push(Side::Left);
            }
            j >>= 1;
        }

        trace!("generated proof of length {} for leaf {}", depth, i);
        Proof::new(siblings, sides)
    }

    /// Generates the proof of every leaf, in leaf order.
    ///
    /// Runs on the worker pool when the tree was configured to run in
    /// parallel.
    pub fn proofs(&self) -> Result<Vec<Proof<T>>> {
        if self.config.run_in_parallel {
            let pool = WorkerPool::new(self.config.worker_count)?;
            pool.map_indexed(self.leafs(), |i| self.prove(i))
        } else {
            (0..self.leafs()).map(|i| self.prove(i)).collect()
        }
    }

    /// Generates the proof of the first leaf whose hash matches `block`.
    pub fn prove_block<B: DataBlock + ?Sized>(&self, block: &B) -> Result<Proof<T>> {
        let leaf = hash_leaf(&self.config, block)?;
        match self.leaves().iter().position(|l| *l == leaf) {
            Some(i) => self.prove(i),
            None => Err(Error::BlockNotFound),
        }
    }

    /// Verifies that `block` is included in this tree according to `proof`.
    pub fn verify_block<B: DataBlock + ?Sized>(&self, block: &B, proof: &Proof<T>) -> Result<bool> {
        proof::verify_block(&self.config, block, proof, &self.root)
    }

    /// Returns merkle root
    #[inline]
    pub fn root(&self) -> T {
        self.root.clone()
    }

    /// Returns the number of layers above the leaves. A single leaf tree has
    /// depth 0.
    #[inline]
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// Returns original number of elements the tree was built upon.
    #[inline]
    pub fn leafs(&self) -> usize {
        self.layers[0].len()
    }

    /// Returns the leaf hashes in input order.
    pub fn leaves(&self) -> &[T] {
        &self.layers[0]
    }

    /// Returns the leaf hash at `i`, if any.
    pub fn leaf(&self, i: usize) -> Option<&T> {
        self.layers[0].get(i)
    }

    /// Returns all layers, leaves first and root last.
    pub fn layers(&self) -> &[Vec<T>] {
        &self.layers
    }

    /// Returns the layer at `level`, 0 being the leaves.
    pub fn layer(&self, level: usize) -> Option<&[T]> {
        self.layers.get(level).map(Vec::as_slice)
    }

    /// Returns the configuration the tree was built with.
    pub fn config(&self) -> &Config<A> {
        &self.config
    }
}

/// Returns the leaf for `block`: the hash of its bytes, or the bytes
/// themselves when leaf hashing is disabled.
pub fn hash_leaf<T, A, B>(config: &Config<A>, block: &B) -> Result<T>
where
    T: Element,
    A: Algorithm<T>,
    B: DataBlock + ?Sized,
{
    to_leaf(config, None, block)
}

pub(crate) fn leaf_at<T, A, B>(config: &Config<A>, index: usize, block: &B) -> Result<T>
where
    T: Element,
    A: Algorithm<T>,
    B: DataBlock + ?Sized,
{
    to_leaf(config, Some(index), block)
}

fn to_leaf<T, A, B>(config: &Config<A>, index: Option<usize>, block: &B) -> Result<T>
where
    T: Element,
    A: Algorithm<T>,
    B: DataBlock + ?Sized,
{
    let bytes = block
        .serialize()
        .map_err(|source| Error::Serialization { index, source })?;

    if config.disable_leaf_hashing {
        if bytes.len() != T::byte_len() {
            return Err(Error::LeafLength {
                index,
                expected: T::byte_len(),
                actual: bytes.len(),
            });
        }
        return Ok(T::from_slice(&bytes));
    }

    config.algorithm.hash(&bytes).map_err(Error::Hash)
}

/// Combines two sibling hashes into their parent.
///
/// The left child comes first unless [`Config::sort_siblings`] is set, in
/// which case the smaller of the two does.
pub fn combine<T, A>(config: &Config<A>, left: &T, right: &T) -> Result<T>
where
    T: Element,
    A: Algorithm<T>,
{
    let (left, right) = if config.sort_siblings && right < left {
        (right, left)
    } else {
        (left, right)
    };
    config.algorithm.node(left, right).map_err(Error::Hash)
}

/// Parent of pair `i` of `layer`, pairing an odd last node with itself.
#[inline]
pub(crate) fn combine_at<T, A>(config: &Config<A>, layer: &[T], i: usize) -> Result<T>
where
    T: Element,
    A: Algorithm<T>,
{
    let left = &layer[2 * i];
    let right = layer.get(2 * i + 1).unwrap_or(left);
    combine(config, left, right)
}

/// Sequential counterpart of the worker pool's layer combination.
pub(crate) fn combine_layer<T, A>(config: &Config<A>, layer: &[T]) -> Result<Vec<T>>
where
    T: Element,
    A: Algorithm<T>,
{
    (0..(layer.len() + 1) / 2)
        .map(|i| combine_at(config, layer, i))
        .collect()
}

/// Depth of a tree over `leafs` leaves with duplicate padding, i.e. the
/// number of halvings (rounding up) needed to reach a single node.
pub fn tree_depth(leafs: usize) -> usize {
    leafs.next_power_of_two().trailing_zeros() as usize
}
