use nalgebra::{DMatrix, DVector};
use num_traits::{Float, FromPrimitive, Num, ToPrimitive};
use rand::Rng;
use std::fmt::{self, Display};
use std::fmt::{Debug, Formatter};
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

use crate::data::table::Table;
use crate::error::RegressionError;

pub trait DataValue:
    Debug
    + Clone
    + Copy
    + Num
    + FromPrimitive
    + ToPrimitive
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Send
    + Sync
    + Display
    + 'static
{
}

impl<T> DataValue for T where
    T: Debug
        + Clone
        + Copy
        + Num
        + FromPrimitive
        + ToPrimitive
        + AddAssign
        + SubAssign
        + MulAssign
        + DivAssign
        + Send
        + Sync
        + Display
        + 'static
{
}

pub trait Number: DataValue + PartialOrd {}
impl<T> Number for T where T: DataValue + PartialOrd {}

pub trait RealNumber: Number + Float {}
impl<T> RealNumber for T where T: Number + Float {}

/// Converts a count into the value type. Exact for every float width in practice.
pub(crate) fn from_count<T: RealNumber>(count: usize) -> T {
    T::from_usize(count).unwrap_or_else(T::nan)
}

/// Number of rows drawn for a bootstrap sample: `max(1, round(rows * fraction))`.
pub fn bootstrap_size(rows: usize, fraction: f64) -> usize {
    ((rows as f64 * fraction).round() as usize).max(1)
}

/// Copies the listed rows of `matrix`, in the listed order.
pub(crate) fn gather_rows<T: RealNumber>(matrix: &DMatrix<T>, indices: &[usize]) -> DMatrix<T> {
    DMatrix::from_fn(indices.len(), matrix.ncols(), |i, j| matrix[(indices[i], j)])
}

/// Features and their paired output rows, as seen by tree induction.
///
/// Row `i` of `x` always belongs with row `i` of `y`.
#[derive(Clone)]
pub struct Dataset<T: RealNumber> {
    pub x: DMatrix<T>,
    pub y: DMatrix<T>,
}

impl<T: RealNumber> Debug for Dataset<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset {{\n    x: [\n")?;
        for i in 0..self.x.nrows() {
            write!(f, "        [")?;
            for j in 0..self.x.ncols() {
                write!(f, "{:?}, ", self.x[(i, j)])?;
            }
            writeln!(f, "],")?;
        }

        write!(f, "    ],\n    y: [\n")?;
        for i in 0..self.y.nrows() {
            write!(f, "        [")?;
            for j in 0..self.y.ncols() {
                write!(f, "{:?}, ", self.y[(i, j)])?;
            }
            writeln!(f, "],")?;
        }
        write!(f, "    ]\n}}")
    }
}

impl<T: RealNumber> Dataset<T> {
    /// Pairs a feature matrix with an output matrix of the same height.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the row counts differ.
    pub fn new(x: DMatrix<T>, y: DMatrix<T>) -> Result<Self, RegressionError> {
        if x.nrows() != y.nrows() {
            return Err(RegressionError::DimensionMismatch(format!(
                "{} feature rows but {} output rows",
                x.nrows(),
                y.nrows()
            )));
        }
        Ok(Self { x, y })
    }

    /// Builds the training view of a feature table and its output vectors.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `outputs` is empty, if its length differs from the
    /// table's row count, or if the output vectors do not all share one non-zero length.
    pub fn from_table(features: &Table<T>, outputs: &[DVector<T>]) -> Result<Self, RegressionError> {
        let Some(first) = outputs.first() else {
            return Err(RegressionError::DimensionMismatch(
                "cannot fit on an empty output set".into(),
            ));
        };
        if features.nrows() != outputs.len() {
            return Err(RegressionError::DimensionMismatch(format!(
                "{} feature rows but {} output rows",
                features.nrows(),
                outputs.len()
            )));
        }
        let dims = first.len();
        if dims == 0 {
            return Err(RegressionError::DimensionMismatch(
                "output rows must hold at least one value".into(),
            ));
        }
        if let Some((row, output)) = outputs.iter().enumerate().find(|(_, o)| o.len() != dims) {
            return Err(RegressionError::DimensionMismatch(format!(
                "output row {} has {} values, expected {}",
                row,
                output.len(),
                dims
            )));
        }

        let y = DMatrix::from_fn(outputs.len(), dims, |i, j| outputs[i][j]);
        Ok(Self {
            x: features.as_matrix().clone(),
            y,
        })
    }

    pub fn into_parts(&self) -> (&DMatrix<T>, &DMatrix<T>) {
        (&self.x, &self.y)
    }

    pub fn is_not_empty(&self) -> bool {
        self.y.nrows() > 0
    }

    pub fn nrows(&self) -> usize {
        self.y.nrows()
    }

    pub fn nfeatures(&self) -> usize {
        self.x.ncols()
    }

    pub fn output_dim(&self) -> usize {
        self.y.ncols()
    }

    /// Partitions rows into `value <= threshold` (left) and `value > threshold` (right).
    pub fn split_on_threshold(&self, feature_index: usize, threshold: T) -> (Self, Self) {
        let (left, right): (Vec<usize>, Vec<usize>) =
            (0..self.nrows()).partition(|&row| self.x[(row, feature_index)] <= threshold);

        (self.select(&left), self.select(&right))
    }

    /// Draws `sample_size` rows uniformly with replacement.
    pub fn bootstrap<R: Rng>(&self, sample_size: usize, rng: &mut R) -> Self {
        let nrows = self.nrows();
        if nrows == 0 {
            return self.select(&[]);
        }
        let indices = (0..sample_size)
            .map(|_| rng.gen_range(0..nrows))
            .collect::<Vec<_>>();
        self.select(&indices)
    }

    fn select(&self, indices: &[usize]) -> Self {
        Self {
            x: gather_rows(&self.x, indices),
            y: gather_rows(&self.y, indices),
        }
    }
}
