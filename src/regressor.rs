use nalgebra::DVector;

use crate::data::{dataset::RealNumber, table::Table};
use crate::error::RegressionError;

/// Common interface of every model: fit once, then predict single rows or tables.
///
/// The trait is object safe, so harnesses such as
/// [`walk_forward_validation`](crate::validation::walk_forward_validation) can take
/// `&mut dyn Regressor<T>`.
pub trait Regressor<T: RealNumber> {
    /// Trains the model on feature rows and their paired output vectors.
    fn fit(&mut self, features: &Table<T>, outputs: &[DVector<T>]) -> Result<(), RegressionError>;

    /// Predicts the output vector of one feature row.
    fn predict_one(&self, features: &[T]) -> Result<DVector<T>, RegressionError>;

    /// Predicts every row of `features`, in row order.
    fn predict(&self, features: &Table<T>) -> Result<Vec<DVector<T>>, RegressionError>;
}
