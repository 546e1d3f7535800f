//! Reshaping of time series tables for supervised learning.
use nalgebra::{DMatrix, DVector};

use crate::data::{dataset::RealNumber, table::Table};
use crate::error::RegressionError;

/// Turns a series into a lagged table.
///
/// Row `i` of the result is the concatenation of source rows `i..i + n_in + n_out`,
/// so the leading `n_in * ncols` columns are the history and the trailing
/// `n_out * ncols` columns are the values to forecast. When the series is too short
/// for a single window an empty table is returned.
pub fn series_to_supervised<T: RealNumber>(data: &Table<T>, n_in: usize, n_out: usize) -> Table<T> {
    let window = n_in + n_out;
    let ncols = data.ncols();
    if window == 0 || ncols == 0 || data.nrows() < window {
        return Table::new(0);
    }

    let source = data.as_matrix();
    let nrows = data.nrows() - window + 1;
    Table::from_matrix(DMatrix::from_fn(nrows, window * ncols, |i, j| {
        source[(i + j / ncols, j % ncols)]
    }))
}

/// Splits a table chronologically: the last `n_test` rows form the test set.
///
/// # Errors
///
/// `InvalidConfiguration` if `n_test` exceeds the number of rows.
pub fn train_test_split<T: RealNumber>(
    data: &Table<T>,
    n_test: usize,
) -> Result<(Table<T>, Table<T>), RegressionError> {
    if n_test > data.nrows() {
        return Err(RegressionError::InvalidConfiguration(format!(
            "cannot hold out {} test rows from a table of {} rows",
            n_test,
            data.nrows()
        )));
    }
    let split = data.nrows() - n_test;
    let source = data.as_matrix();
    let train = DMatrix::from_fn(split, data.ncols(), |i, j| source[(i, j)]);
    let test = DMatrix::from_fn(n_test, data.ncols(), |i, j| source[(split + i, j)]);
    Ok((Table::from_matrix(train), Table::from_matrix(test)))
}

/// Separates the trailing `n_observation` columns as output vectors.
///
/// # Errors
///
/// `InvalidConfiguration` if `n_observation` is zero or leaves no column of features.
pub fn split_targets<T: RealNumber>(
    data: &Table<T>,
    n_observation: usize,
) -> Result<(Table<T>, Vec<DVector<T>>), RegressionError> {
    if n_observation == 0 || n_observation >= data.ncols() {
        return Err(RegressionError::InvalidConfiguration(format!(
            "cannot take {} target columns from a table of {} columns",
            n_observation,
            data.ncols()
        )));
    }
    let nfeatures = data.ncols() - n_observation;
    let source = data.as_matrix();

    let features = DMatrix::from_fn(data.nrows(), nfeatures, |i, j| source[(i, j)]);
    let targets = (0..data.nrows())
        .map(|i| DVector::from_fn(n_observation, |j, _| source[(i, nfeatures + j)]))
        .collect();
    Ok((Table::from_matrix(features), targets))
}
