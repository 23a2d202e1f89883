//! Parallel scheduler used when [`Config::run_in_parallel`] is set.
//!
//! A pool of exactly `worker_count` threads is started for a single call
//! (a build, or a batch of proofs) and dropped when the call returns. Work is
//! split into at most `worker_count` contiguous index ranges and every result
//! lands at the index a sequential pass would write, so the outcome does not
//! depend on which worker finishes first.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use log::trace;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::block::DataBlock;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::hash::{Algorithm, Element};
use crate::merkle::{combine_at, leaf_at};

#[derive(Debug)]
pub(crate) struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
}

impl WorkerPool {
    pub(crate) fn new(workers: usize) -> Result<WorkerPool> {
        if workers == 0 {
            return Err(Error::InvalidConfig("worker_count must be at least 1"));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("merkle-worker-{}", i))
            .build()?;
        Ok(WorkerPool { pool, workers })
    }

    /// Size of each contiguous range when `len` items are spread over the
    /// workers.
    fn chunk_len(&self, len: usize) -> usize {
        std::cmp::max(1, (len + self.workers - 1) / self.workers)
    }

    /// Runs `op` on the pool and waits for it. A panic in any worker is
    /// returned as [`Error::WorkerPanic`] instead of unwinding into the caller.
    pub(crate) fn run<R, F>(&self, op: F) -> Result<R>
    where
        R: Send,
        F: FnOnce() -> Result<R> + Send,
    {
        match panic::catch_unwind(AssertUnwindSafe(|| self.pool.install(op))) {
            Ok(res) => res,
            Err(payload) => Err(Error::WorkerPanic(panic_message(payload.as_ref()))),
        }
    }

    /// Hashes every block into its leaf, keeping input order. When several
    /// blocks fail, the error of the lowest index is returned.
    pub(crate) fn hash_leaves<T, A, B>(&self, config: &Config<A>, blocks: &[B]) -> Result<Vec<T>>
    where
        T: Element,
        A: Algorithm<T>,
        B: DataBlock + Sync,
    {
        let chunk = self.chunk_len(blocks.len());
        trace!("hashing {} leaves in ranges of {}", blocks.len(), chunk);

        let mut out: Vec<Option<Result<T>>> = Vec::with_capacity(blocks.len());
        out.resize_with(blocks.len(), || None);
        self.run(|| {
            out.par_chunks_mut(chunk)
                .zip(blocks.par_chunks(chunk))
                .enumerate()
                .for_each(|(c, (slots, range))| {
                    for (k, (slot, block)) in slots.iter_mut().zip(range).enumerate() {
                        *slot = Some(leaf_at(config, c * chunk + k, block));
                    }
                });
            Ok(())
        })?;

        out.into_iter().flatten().collect()
    }

    /// Combines the pairs of `layer` into the next layer. An odd last node is
    /// paired with itself; the caller decides whether that is allowed. As with
    /// leaves, the error of the lowest failing pair is returned.
    pub(crate) fn combine_layer<T, A>(&self, config: &Config<A>, layer: &[T]) -> Result<Vec<T>>
    where
        T: Element,
        A: Algorithm<T>,
    {
        let width = (layer.len() + 1) / 2;
        let chunk = self.chunk_len(width);
        trace!("combining {} pairs in ranges of {}", width, chunk);

        let mut out: Vec<Option<Result<T>>> = Vec::with_capacity(width);
        out.resize_with(width, || None);
        self.run(|| {
            out.par_chunks_mut(chunk).enumerate().for_each(|(c, slots)| {
                for (k, slot) in slots.iter_mut().enumerate() {
                    *slot = Some(combine_at(config, layer, c * chunk + k));
                }
            });
            Ok(())
        })?;

        let next: Vec<T> = out.into_iter().flatten().collect::<Result<_>>()?;
        debug_assert_eq!(next.len(), width);
        Ok(next)
    }

    /// Runs `f` for every index in `0..len`, results in index order.
    pub(crate) fn map_indexed<R, F>(&self, len: usize, f: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(usize) -> Result<R> + Sync + Send,
    {
        let chunk = self.chunk_len(len);
        self.run(|| {
            (0..len)
                .into_par_iter()
                .with_min_len(chunk)
                .map(&f)
                .collect()
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown panic")
    }
}
