use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Build options for a [`MerkleTree`](crate::MerkleTree).
///
/// A tree keeps its configuration for its whole lifetime and every proof
/// helper takes one explicitly, there is no global state. The flag fields can
/// be loaded with serde; the algorithm is skipped and recreated with
/// `Default`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, bound(serialize = "", deserialize = "A: Default"))]
pub struct Config<A> {
    /// Pad odd layers by duplicating their last node. When unset, an odd
    /// layer fails the build with [`Error::OddLeafCount`].
    pub allow_duplicates: bool,

    /// Hash leaves and combine layers on a pool of `worker_count` threads.
    pub run_in_parallel: bool,

    /// Number of worker threads used when `run_in_parallel` is set.
    pub worker_count: usize,

    /// Order each sibling pair by byte value before combining. Proofs then
    /// verify regardless of the recorded sides.
    pub sort_siblings: bool,

    /// Use the serialized block as the leaf instead of hashing it. Blocks
    /// must then serialize to exactly one hash width.
    pub disable_leaf_hashing: bool,

    /// Abort the build when this much time has passed since it started.
    /// Checked between layers only.
    pub deadline: Option<Duration>,

    /// Hash and combine functions.
    #[serde(skip)]
    pub algorithm: A,
}

impl<A: Default> Default for Config<A> {
    fn default() -> Self {
        Config::new(A::default())
    }
}

impl<A> Config<A> {
    /// Default options around `algorithm`.
    pub fn new(algorithm: A) -> Self {
        Config {
            allow_duplicates: true,
            run_in_parallel: false,
            worker_count: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            sort_siblings: false,
            disable_leaf_hashing: false,
            deadline: None,
            algorithm,
        }
    }

    /// Sets [`allow_duplicates`](Config::allow_duplicates).
    pub fn with_duplicates(mut self, allow: bool) -> Self {
        self.allow_duplicates = allow;
        self
    }

    /// Runs on `workers` threads. Passing `None` switches back to sequential
    /// construction.
    pub fn with_parallelism(mut self, workers: Option<usize>) -> Self {
        match workers {
            Some(n) => {
                self.run_in_parallel = true;
                self.worker_count = n;
            }
            None => self.run_in_parallel = false,
        }
        self
    }

    /// Sets [`sort_siblings`](Config::sort_siblings).
    pub fn with_sorted_siblings(mut self, sort: bool) -> Self {
        self.sort_siblings = sort;
        self
    }

    /// Sets [`disable_leaf_hashing`](Config::disable_leaf_hashing).
    pub fn with_leaf_hashing(mut self, enabled: bool) -> Self {
        self.disable_leaf_hashing = !enabled;
        self
    }

    /// Sets [`deadline`](Config::deadline).
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Replaces the algorithm, keeping all options.
    pub fn with_algorithm<B>(self, algorithm: B) -> Config<B> {
        Config {
            allow_duplicates: self.allow_duplicates,
            run_in_parallel: self.run_in_parallel,
            worker_count: self.worker_count,
            sort_siblings: self.sort_siblings,
            disable_leaf_hashing: self.disable_leaf_hashing,
            deadline: self.deadline,
            algorithm,
        }
    }

    /// Checks the options can be used for a build.
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(Error::InvalidConfig("worker_count must be at least 1"));
        }
        Ok(())
    }
}
