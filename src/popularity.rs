//! # Popularity Index
//!
//! A user's p-index is the largest integer x such that at least x% of the
//! *other* users share at least x% of that user's items. It is computed per
//! user over a [`SparseColMatrix`] of item-by-user memberships.
//!
//! For user i with `owned` items, every user j (i included) is assigned a
//! share percentage `trunc(common(i, j) / owned * 100)`. The percentages are
//! bucketed into a [0, 100] histogram and scanned from 100 downward over the
//! occupied buckets, accumulating a running user count. The first percent x
//! where `(count - 1) / (n - 1) * 100 >= x` is the p-index; the subtraction
//! removes user i's own trivially-100% entry from both sides of the ratio.
//! The scan always terminates: once the lowest occupied bucket has been
//! folded in, the running count covers all n users and the left side is 100.
//!
//! Division and truncation deliberately go through f64, reproducing the
//! numeric path of the original tool bit for bit.
//!
//! The per-user loop only reads the shared matrix, so the computation is
//! parallelized across users with rayon.

use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

use crate::sparse::SparseColMatrix;

/// Failures of the p-index computation on degenerate input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PIndexError {
    #[error("user {user} owns zero items; the share percentage is undefined")]
    ZeroOwnedItems { user: usize },
    #[error("matrix has {users} user column(s); at least two are required")]
    TooFewUsers { users: usize },
    #[error("computation cancelled")]
    Cancelled,
}

/// Observer for reporting incremental progress while computing p-indices.
///
/// Invoked from worker threads, hence `Sync` and `&self` receivers.
/// `should_cancel` is polled once per user; returning `true` stops the run
/// at the next per-user boundary.
pub trait PIndexProgress: Sync {
    fn on_start(&self, total_users: usize) {
        let _ = total_users;
    }
    fn on_user_complete(&self, completed_users: usize, total_users: usize) {
        let _ = (completed_users, total_users);
    }
    fn on_finish(&self) {}
    fn should_cancel(&self) -> bool {
        false
    }
}

#[derive(Default)]
pub struct NoopProgress;

impl PIndexProgress for NoopProgress {}

/// Computes the p-index of a single user column.
pub fn compute_one(matrix: &SparseColMatrix, user: usize) -> Result<u8, PIndexError> {
    let n = matrix.cols();
    if n < 2 {
        return Err(PIndexError::TooFewUsers { users: n });
    }
    let owned = matrix.col_nnz(user);
    if owned == 0 {
        return Err(PIndexError::ZeroOwnedItems { user });
    }

    // Share percentages only take 101 distinct values, so a fixed histogram
    // replaces the original's sorted distinct-value set.
    let mut histogram = [0usize; 101];
    for other in 0..n {
        let common = matrix.intersection_count(user, other);
        let percent = (common as f64 / owned as f64 * 100.0) as usize;
        histogram[percent] += 1;
    }

    let mut count = 0usize;
    for percent in (0..=100usize).rev() {
        if histogram[percent] == 0 {
            continue;
        }
        count += histogram[percent];
        if (count as f64 - 1.0) / (n as f64 - 1.0) * 100.0 >= percent as f64 {
            return Ok(percent as u8);
        }
    }
    unreachable!("the lowest occupied percent bucket always satisfies the threshold")
}

/// Computes the p-index of every user, in column order.
///
/// Users are processed in parallel; each worker reads the immutable matrix
/// and touches no shared state beyond the progress counter.
pub fn compute_all(
    matrix: &SparseColMatrix,
    progress: &dyn PIndexProgress,
) -> Result<Vec<u8>, PIndexError> {
    let n = matrix.cols();
    if n < 2 {
        return Err(PIndexError::TooFewUsers { users: n });
    }

    progress.on_start(n);
    let completed = AtomicUsize::new(0);
    let values = (0..n)
        .into_par_iter()
        .map(|user| {
            if progress.should_cancel() {
                return Err(PIndexError::Cancelled);
            }
            let value = compute_one(matrix, user)?;
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            progress.on_user_complete(done, n);
            Ok(value)
        })
        .collect::<Result<Vec<u8>, PIndexError>>()?;
    progress.on_finish();

    log::info!(
        "computed p-indices for {n} users over {} items ({} nonzeros)",
        matrix.rows(),
        matrix.nnz()
    );
    Ok(values)
}
