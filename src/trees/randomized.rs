//! Decision tree regressor that searches a random subset of the features at each node.
use nalgebra::{DMatrix, DVector};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fmt::{self, Display, Formatter};

use super::{
    base::DecisionTreeBase, node::TreeNode, params::RandomizedTreeParams, sampling::RandomSubset,
};
use crate::{
    data::{
        dataset::{Dataset, RealNumber},
        table::Table,
    },
    error::RegressionError,
    metrics::errors::RegressionMetrics,
    regressor::Regressor,
};

/// Randomized decision tree regressor, the building block of the random forest.
///
/// Induction is the same as for [`DecisionTreeRegressor`](super::regressor::DecisionTreeRegressor),
/// but every node only considers `round(features_fraction * n_features)` columns (at
/// least one) drawn uniformly without replacement.
///
/// Randomness comes from the generator passed to [`RandomizedTreeRegressor::fit_with_rng`];
/// [`Regressor::fit`] builds a `StdRng` from the configured seed, or from system
/// entropy when no seed is set.
#[derive(Clone, Debug)]
pub struct RandomizedTreeRegressor<T: RealNumber> {
    base: DecisionTreeBase<T>,
    features_fraction: f64,
    seed: Option<u64>,
}

impl<T: RealNumber> Default for RandomizedTreeRegressor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealNumber> RegressionMetrics<T> for RandomizedTreeRegressor<T> {}

impl<T: RealNumber> RandomizedTreeRegressor<T> {
    pub fn new() -> Self {
        Self::build(&RandomizedTreeParams::new())
    }

    /// Creates a tree with custom parameters.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `features_fraction` is not in `(0, 1]` or
    /// `min_samples_split` is less than 2.
    pub fn with_params(
        features_fraction: f64,
        min_samples_split: usize,
        max_depth: usize,
    ) -> Result<Self, RegressionError> {
        let mut params = RandomizedTreeParams::new();
        params.set_features_fraction(features_fraction)?;
        params.set_min_samples_split(min_samples_split)?;
        params.set_max_depth(max_depth);
        Ok(Self::build(&params))
    }

    /// Creates a tree from a parameter set.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if any parameter is out of range.
    pub fn from_params(params: &RandomizedTreeParams) -> Result<Self, RegressionError> {
        params.validate()?;
        Ok(Self::build(params))
    }

    fn build(params: &RandomizedTreeParams) -> Self {
        Self {
            base: DecisionTreeBase::new(params.base_params().clone()),
            features_fraction: params.features_fraction(),
            seed: None,
        }
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn features_fraction(&self) -> f64 {
        self.features_fraction
    }

    pub fn max_depth(&self) -> usize {
        self.base.tree_params.max_depth()
    }

    pub fn min_samples_split(&self) -> usize {
        self.base.tree_params.min_samples_split()
    }

    pub fn root(&self) -> Option<&TreeNode<T>> {
        self.base.root.as_deref()
    }

    pub fn output_dim(&self) -> usize {
        self.base.output_dim()
    }

    pub fn node_count(&self) -> usize {
        self.base.node_count()
    }

    pub fn leaf_count(&self) -> usize {
        self.base.leaf_count()
    }

    pub fn depth(&self) -> usize {
        self.base.depth()
    }

    /// Fits on a table using a caller-owned random source.
    pub fn fit_with_rng<R: Rng>(
        &mut self,
        features: &Table<T>,
        outputs: &[DVector<T>],
        rng: &mut R,
    ) -> Result<(), RegressionError> {
        let dataset = Dataset::from_table(features, outputs)?;
        self.fit_dataset(&dataset, rng)
    }

    /// Builds the tree from an already validated dataset.
    pub fn fit_dataset<R: Rng>(
        &mut self,
        dataset: &Dataset<T>,
        rng: &mut R,
    ) -> Result<(), RegressionError> {
        let mut sampler = RandomSubset::new(self.features_fraction, rng);
        self.base.fit(dataset, &mut sampler)
    }

    pub(crate) fn predict_matrix(&self, features: &DMatrix<T>) -> Result<DMatrix<T>, RegressionError> {
        self.base.predict_matrix(features)
    }

    pub fn print_tree(&self) {
        print!("{}", self);
    }
}

impl<T: RealNumber> Regressor<T> for RandomizedTreeRegressor<T> {
    fn fit(&mut self, features: &Table<T>, outputs: &[DVector<T>]) -> Result<(), RegressionError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.fit_with_rng(features, outputs, &mut rng)
    }

    fn predict_one(&self, features: &[T]) -> Result<DVector<T>, RegressionError> {
        self.base.make_prediction(features)
    }

    fn predict(&self, features: &Table<T>) -> Result<Vec<DVector<T>>, RegressionError> {
        self.base.predict(features.as_matrix())
    }
}

impl<T: RealNumber> Display for RandomizedTreeRegressor<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)
    }
}
