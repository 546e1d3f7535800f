use nalgebra::DVector;

use crate::data::dataset::{from_count, RealNumber};
use crate::error::RegressionError;

fn check_shapes<T: RealNumber>(
    y_true: &[DVector<T>],
    y_pred: &[DVector<T>],
) -> Result<usize, RegressionError> {
    if y_true.len() != y_pred.len() {
        return Err(RegressionError::DimensionMismatch(format!(
            "{} observations but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(RegressionError::DimensionMismatch(
            "cannot score an empty set of predictions".into(),
        ));
    }
    let mut cells = 0;
    for (row, (t, p)) in y_true.iter().zip(y_pred.iter()).enumerate() {
        if t.len() != p.len() {
            return Err(RegressionError::DimensionMismatch(format!(
                "row {} has {} observed values but {} predicted",
                row,
                t.len(),
                p.len()
            )));
        }
        cells += t.len();
    }
    Ok(cells)
}

/// Mean absolute error over every cell of paired output vectors.
///
/// # Errors
///
/// `DimensionMismatch` if the inputs are empty or their shapes differ.
pub fn mean_absolute_error<T: RealNumber>(
    y_true: &[DVector<T>],
    y_pred: &[DVector<T>],
) -> Result<T, RegressionError> {
    let n = from_count::<T>(check_shapes(y_true, y_pred)?);
    let abs_errors_sum = y_true
        .iter()
        .zip(y_pred.iter())
        .flat_map(|(t, p)| t.iter().zip(p.iter()))
        .fold(T::zero(), |acc, (&y_t, &y_p)| acc + (y_p - y_t).abs());

    Ok(abs_errors_sum / n)
}

/// Mean squared error over every cell of paired output vectors.
///
/// # Errors
///
/// `DimensionMismatch` if the inputs are empty or their shapes differ.
pub fn mean_squared_error<T: RealNumber>(
    y_true: &[DVector<T>],
    y_pred: &[DVector<T>],
) -> Result<T, RegressionError> {
    let n = from_count::<T>(check_shapes(y_true, y_pred)?);
    let errors_sq_sum = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| {
            let errors = p - t;
            errors.component_mul(&errors).sum()
        })
        .fold(T::zero(), |acc, x| acc + x);

    Ok(errors_sq_sum / n)
}

/// Scoring helpers available on every regressor.
pub trait RegressionMetrics<T: RealNumber> {
    fn mse(&self, y_true: &[DVector<T>], y_pred: &[DVector<T>]) -> Result<T, RegressionError> {
        mean_squared_error(y_true, y_pred)
    }

    fn mae(&self, y_true: &[DVector<T>], y_pred: &[DVector<T>]) -> Result<T, RegressionError> {
        mean_absolute_error(y_true, y_pred)
    }
}
