//! Squared-error statistics and the threshold sweep used to pick splits.
use nalgebra::{DMatrix, DVector};
use std::cmp::Ordering;

use super::params::SPLIT_WINDOW;
use crate::data::dataset::{from_count, Dataset, RealNumber};

/// Best split found for a node.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitData<T: RealNumber> {
    pub feature_index: usize,
    pub threshold: T,
    /// Squared error of the two partitions, on the same scale as [`node_error`].
    pub error: T,
}

/// Component-wise mean of the output rows.
pub fn column_means<T: RealNumber>(y: &DMatrix<T>) -> DVector<T> {
    let n = from_count::<T>(y.nrows());
    DVector::from_fn(y.ncols(), |j, _| {
        y.column(j).iter().fold(T::zero(), |acc, &value| acc + value / n)
    })
}

/// Squared error of the outputs around `mean`, divided by `rows * dims`.
pub fn node_error<T: RealNumber>(y: &DMatrix<T>, mean: &DVector<T>) -> T {
    let n = from_count::<T>(y.nrows() * y.ncols());
    let two = from_count::<T>(2);
    let mut error = T::zero();
    for row in y.row_iter() {
        for (&value, &m) in row.iter().zip(mean.iter()) {
            error += (value / n) * value - two * (value / n) * m + (m / n) * m;
        }
    }
    error
}

/// Midpoints between neighbouring distinct values, visiting `values` through the
/// ascending permutation `order`.
///
/// Every threshold `t` between `a < b` satisfies `a <= t < b`. When the rounded
/// midpoint of two adjacent floats reaches `b`, the lower value is used instead.
pub fn midpoints<T: RealNumber>(values: &[T], order: &[usize]) -> Vec<T> {
    let mut distinct = order.iter().map(|&i| values[i]).collect::<Vec<_>>();
    distinct.dedup();

    let window = from_count::<T>(SPLIT_WINDOW);
    distinct
        .windows(SPLIT_WINDOW)
        .map(|pair| {
            let mid = pair.iter().fold(T::zero(), |acc, &v| acc + v / window);
            if mid < pair[SPLIT_WINDOW - 1] {
                mid
            } else {
                pair[0]
            }
        })
        .collect()
}

/// Searches the candidate columns for the split with the lowest squared error.
///
/// Rows are visited in ascending order of each column while running sums and sums of
/// squares move from the right partition to the left (`value <= threshold`, the same
/// predicate as [`Dataset::split_on_threshold`]), so each column costs one sort
/// plus a linear sweep. A split is kept only if its error is strictly below both
/// `baseline` and every split seen before it.
pub fn best_split<T: RealNumber>(
    dataset: &Dataset<T>,
    candidates: &[usize],
    baseline: T,
) -> Option<SplitData<T>> {
    let (x, y) = dataset.into_parts();
    let (rows, dims) = y.shape();
    if rows < SPLIT_WINDOW || dims == 0 {
        return None;
    }

    let n = from_count::<T>(rows * dims);
    let mut total = vec![T::zero(); dims];
    let mut total_sq = vec![T::zero(); dims];
    for row in y.row_iter() {
        for (d, &value) in row.iter().enumerate() {
            total[d] += value / n;
            total_sq[d] += value / n * value;
        }
    }

    let mut best: Option<SplitData<T>> = None;
    let mut best_error = baseline;

    for &feature_index in candidates {
        let values = x.column(feature_index).iter().copied().collect::<Vec<_>>();
        let mut order = (0..rows).collect::<Vec<_>>();
        order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

        let mut left_sum = vec![T::zero(); dims];
        let mut left_sq = vec![T::zero(); dims];
        let mut right_sum = total.clone();
        let mut right_sq = total_sq.clone();
        let mut n_left = 0;

        for threshold in midpoints(&values, &order) {
            while n_left < rows - 1 && values[order[n_left]] <= threshold {
                let row = order[n_left];
                for d in 0..dims {
                    let value = y[(row, d)];
                    let scaled = value / n;
                    left_sum[d] += scaled;
                    left_sq[d] += scaled * value;
                    right_sum[d] -= scaled;
                    right_sq[d] -= scaled * value;
                }
                n_left += 1;
            }

            let n_right = rows - n_left;
            if n_left == 0 || n_right == 0 {
                continue;
            }
            let left_weight = n / from_count::<T>(n_left);
            let right_weight = n / from_count::<T>(n_right);
            let error = (0..dims).fold(T::zero(), |acc, d| {
                acc + left_sq[d] - left_weight * left_sum[d] * left_sum[d] + right_sq[d]
                    - right_weight * right_sum[d] * right_sum[d]
            });

            if error < best_error {
                best_error = error;
                best = Some(SplitData {
                    feature_index,
                    threshold,
                    error,
                });
            }
        }
    }
    best
}
