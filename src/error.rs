//! Error type shared by tree construction, proof generation and verification.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building a tree or working with proofs.
///
/// Any error returned from a build means no tree was created. A proof that
/// simply does not match a root is not an error, see [`crate::verify`].
#[derive(Debug, Error)]
pub enum Error {
    /// `build` was called without any blocks.
    #[error("cannot build a merkle tree from an empty block list")]
    EmptyInput,

    /// A layer had an odd number of nodes while duplicates are disallowed.
    #[error("layer {level} has an odd number of nodes ({width}) and duplicates are not allowed")]
    OddLeafCount {
        /// Layer index, 0 being the leaves.
        level: usize,
        /// Number of nodes in that layer.
        width: usize,
    },

    /// A block failed to serialize.
    #[error("failed to serialize block{}", position(.index))]
    Serialization {
        /// Position of the block in the input, when built from a list.
        index: Option<usize>,
        /// Error reported by the block.
        #[source]
        source: anyhow::Error,
    },

    /// The hash or combine function failed.
    #[error("hash function failed")]
    Hash(#[source] anyhow::Error),

    /// A raw leaf (leaf hashing disabled) did not have the width of a hash.
    #[error("block{} is {actual} bytes, raw leaves must be {expected} bytes", position(.index))]
    LeafLength {
        /// Position of the block in the input, when built from a list.
        index: Option<usize>,
        /// Width of the hash element.
        expected: usize,
        /// Serialized length of the block.
        actual: usize,
    },

    /// A proof was requested for a leaf that does not exist.
    #[error("{index} is out of bounds (leafs: {leafs})")]
    IndexOutOfRange {
        /// Requested leaf index.
        index: usize,
        /// Number of leaves in the tree.
        leafs: usize,
    },

    /// A proof was requested for a block whose leaf is not part of the tree.
    #[error("block is not part of the tree")]
    BlockNotFound,

    /// A worker of the parallel scheduler panicked.
    #[error("merkle worker panicked: {0}")]
    WorkerPanic(String),

    /// The worker pool could not be started.
    #[error("failed to start worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The configured deadline passed before layer `level` was combined.
    #[error("build deadline exceeded before combining layer {level}")]
    DeadlineExceeded {
        /// First layer that was not combined.
        level: usize,
    },

    /// The configuration can not be used to build a tree.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// A proof whose parts are inconsistent with each other.
    #[error("malformed proof: {0}")]
    MalformedProof(String),
}

fn position(index: &Option<usize>) -> String {
    index.map(|i| format!(" {}", i)).unwrap_or_default()
}
