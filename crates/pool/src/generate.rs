//! Parallel execution of pool suppliers on a fixed-size worker pool.

use std::num::NonZeroUsize;

use rayon::prelude::*;
use tracing::{error, info};

use crate::error::{PoolCreationError, PoolError};
use crate::pool::Pool;
use crate::supplier::{PoolSupplier, RightValue};

/// Result of running one supplier.
#[derive(Debug)]
pub enum PoolOutcome<R> {
    /// The pool was created.
    Created(Pool<R>),
    /// The pool failed.
    Failed(PoolCreationError),
}

impl<R> PoolOutcome<R> {
    /// Converts the outcome into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the [`PoolCreationError`] of a failed outcome.
    pub fn into_result(self) -> Result<Pool<R>, PoolCreationError> {
        match self {
            Self::Created(pool) => Ok(pool),
            Self::Failed(e) => Err(e),
        }
    }

    /// Returns `true` if the pool was created.
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

impl<R> From<Result<Pool<R>, PoolCreationError>> for PoolOutcome<R> {
    fn from(result: Result<Pool<R>, PoolCreationError>) -> Self {
        match result {
            Ok(pool) => Self::Created(pool),
            Err(e) => Self::Failed(e),
        }
    }
}

/// Resolves a requested thread count: 0 means available parallelism.
fn thread_count(threads: usize) -> usize {
    if threads > 0 {
        return threads;
    }
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Runs every supplier on a worker pool of `threads` threads and returns
/// one outcome per supplier, in supplier order.
///
/// # Errors
///
/// Returns [`PoolError::ThreadPool`] if the worker pool cannot be built.
pub fn run_suppliers<R: RightValue>(
    suppliers: &[PoolSupplier<R>],
    threads: usize,
) -> Result<Vec<PoolOutcome<R>>, PoolError> {
    let threads = thread_count(threads);
    let workers = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| PoolError::ThreadPool {
            reason: e.to_string(),
        })?;
    let outcomes: Vec<PoolOutcome<R>> =
        workers.install(|| suppliers.par_iter().map(|s| s.get().into()).collect());
    info!(
        threads,
        pools = outcomes.len(),
        failed = outcomes.iter().filter(|o| !o.is_created()).count(),
        "ran pool suppliers"
    );
    Ok(outcomes)
}

/// Runs every supplier and returns all pools, in supplier order.
///
/// # Errors
///
/// Returns [`PoolError::FeatureGroups`] naming every failed pool, or
/// [`PoolError::ThreadPool`] if the worker pool cannot be built.
pub fn generate_pools<R: RightValue>(
    suppliers: &[PoolSupplier<R>],
    threads: usize,
) -> Result<Vec<Pool<R>>, PoolError> {
    let mut pools = Vec::with_capacity(suppliers.len());
    let mut failures = Vec::new();
    for outcome in run_suppliers(suppliers, threads)? {
        match outcome {
            PoolOutcome::Created(pool) => pools.push(pool),
            PoolOutcome::Failed(e) => {
                error!(error = %e, "pool failed");
                failures.push(e);
            }
        }
    }
    if failures.is_empty() {
        Ok(pools)
    } else {
        Err(PoolError::from_failures(failures))
    }
}
