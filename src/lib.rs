//! Layered _Merkle Tree_ implementation.
//!
//! Merkle tree (MT) built bottom-up from an ordered list of data blocks. Every
//! layer is kept, from the leaves up to the root, so inclusion proofs can be
//! produced for any leaf without rehashing. The tree is specialized to the
//! extent of the hashing algorithm and a fixed width hash element; it does not
//! depend on any particular digest.
//!
//! Odd layers are either padded by pairing their last node with itself or
//! rejected, depending on [`Config::allow_duplicates`]:
//!
//! ```text
//! L0:  h0   h1   h2   h3   h4
//! L1:  h01       h23       h44
//! L2:  h0123               h4444
//! L3:  root
//! ```
//!
//! Construction can be spread over a pool of worker threads. The parallel
//! build writes every node at the position a sequential build would, so both
//! produce the same root bit for bit.
//!
//! # Interface
//!
//! ```text
//! - build (config, blocks) -> tree
//! - root, depth, leafs -> hash, usize, usize
//! - prove (tree, index) -> proof
//! - verify (config, leaf, proof, root) -> bool
//! ```
//!
//! # Quick start
//!
//! ```
//! # #[cfg(feature = "sha2")]
//! # fn main() {
//! use merkle_layers::{verify, Config, MerkleTree, Sha256Algorithm};
//!
//! let blocks = vec![b"tx1".to_vec(), b"tx2".to_vec(), b"tx3".to_vec()];
//! let config = Config::new(Sha256Algorithm).with_parallelism(Some(2));
//!
//! let tree: MerkleTree<[u8; 32], _> = MerkleTree::build(config, &blocks).unwrap();
//! assert_eq!(tree.leafs(), 3);
//! assert_eq!(tree.depth(), 2);
//!
//! let proof = tree.prove(2).unwrap();
//! let leaf = tree.leaf(2).unwrap();
//! assert!(verify(tree.config(), leaf, &proof, &tree.root()).unwrap());
//! # }
//! # #[cfg(not(feature = "sha2"))]
//! # fn main() {}
//! ```

#![deny(
    missing_docs,
    unused_qualifications,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces
)]

/// Hash infrastructure for items in Merkle tree.
pub mod hash;

/// Data blocks the tree is built from.
pub mod block;

/// Build options.
pub mod config;

/// Error type.
pub mod error;

/// Merkle tree inclusion proof and verification.
pub mod proof;

/// Merkle tree construction and queries.
pub mod merkle;

/// Digest implementations behind cargo features.
#[cfg(any(feature = "sha2", feature = "blake3"))]
pub mod algorithms;

mod pool;

#[cfg(test)]
mod test_common;


/// Tests for Merkle Hasher Customization
#[cfg(test)]
mod test_cmh;

pub use block::DataBlock;
pub use config::Config;
pub use error::{Error, Result};
pub use hash::{Algorithm, Element, FnAlgorithm};
pub use merkle::{combine, hash_leaf, tree_depth, MerkleTree};
pub use proof::{verify, verify_block, Proof, Side};

#[cfg(feature = "blake3")]
pub use algorithms::Blake3Algorithm;
#[cfg(feature = "sha2")]
pub use algorithms::Sha256Algorithm;
