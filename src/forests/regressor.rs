use nalgebra::{DMatrix, DVector};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use std::fmt::{self, Display, Formatter};
use tracing::{debug, info, instrument};

use super::params::ForestParams;
use crate::{
    data::{
        dataset::{bootstrap_size, from_count, Dataset, RealNumber},
        table::Table,
    },
    error::RegressionError,
    metrics::errors::RegressionMetrics,
    regressor::Regressor,
    trees::randomized::RandomizedTreeRegressor,
};

/// Bagging ensemble of [`RandomizedTreeRegressor`]s.
///
/// Every tree is grown on its own bootstrap sample of the training rows and the
/// ensemble answers the component-wise mean of the tree predictions. Trees are fitted
/// and queried in parallel on the rayon pool.
///
/// The master seed, when set, makes fits reproducible: it drives the per-tree seeds,
/// which in turn drive each tree's bootstrap draw and feature subsets.
#[derive(Clone, Debug)]
pub struct RandomForestRegressor<T: RealNumber> {
    trees: Vec<RandomizedTreeRegressor<T>>,
    params: ForestParams,
    output_dim: usize,
    seed: Option<u64>,
}

impl<T: RealNumber> Default for RandomForestRegressor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealNumber> RegressionMetrics<T> for RandomForestRegressor<T> {}

impl<T: RealNumber> RandomForestRegressor<T> {
    pub fn new() -> Self {
        Self::build(ForestParams::new())
    }

    /// Creates a forest with custom parameters.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `num_trees` is 0, a fraction is outside `(0, 1]`, or
    /// `min_samples_split` is less than 2.
    pub fn with_params(
        num_trees: usize,
        features_fraction: f64,
        row_fraction: f64,
        min_samples_split: usize,
        max_depth: usize,
    ) -> Result<Self, RegressionError> {
        let mut params = ForestParams::new();
        params.set_num_trees(num_trees)?;
        params.set_features_fraction(features_fraction)?;
        params.set_row_fraction(row_fraction)?;
        params.set_min_samples_split(min_samples_split)?;
        params.set_max_depth(max_depth);
        Ok(Self::build(params))
    }

    /// Creates a forest from a parameter set.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if any parameter is out of range.
    pub fn from_params(params: ForestParams) -> Result<Self, RegressionError> {
        params.validate()?;
        Ok(Self::build(params))
    }

    fn build(params: ForestParams) -> Self {
        Self {
            trees: Vec::with_capacity(params.num_trees()),
            params,
            output_dim: 0,
            seed: None,
        }
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Fitted member trees, empty before the first fit.
    pub fn trees(&self) -> &[RandomizedTreeRegressor<T>] {
        &self.trees
    }

    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    /// Grows every tree on its own bootstrap sample of `dataset`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the forest was fitted before with a different output length.
    #[instrument(skip_all, fields(n_trees = self.params.num_trees(), n_samples = dataset.nrows()))]
    pub fn fit_dataset(&mut self, dataset: &Dataset<T>) -> Result<(), RegressionError> {
        if self.output_dim != 0 && self.output_dim != dataset.output_dim() {
            return Err(RegressionError::DimensionMismatch(format!(
                "model predicts {} outputs, got rows of {}",
                self.output_dim,
                dataset.output_dim()
            )));
        }

        let sample_size = bootstrap_size(dataset.nrows(), self.params.row_fraction());
        info!(
            n_features = dataset.nfeatures(),
            output_dim = dataset.output_dim(),
            sample_size,
            features_fraction = self.params.features_fraction(),
            "training random forest"
        );

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let seeds = (0..self.params.num_trees())
            .map(|_| rng.gen::<u64>())
            .collect::<Vec<_>>();

        let tree_params = self.params.tree_params();
        let trees = seeds
            .into_par_iter()
            .enumerate()
            .map(|(index, tree_seed)| {
                let mut tree_rng = StdRng::seed_from_u64(tree_seed);
                let sample = dataset.bootstrap(sample_size, &mut tree_rng);
                let mut tree = RandomizedTreeRegressor::from_params(tree_params)?;
                tree.set_seed(Some(tree_seed));
                tree.fit_dataset(&sample, &mut tree_rng)?;
                debug!(tree = index, n_nodes = tree.node_count(), "tree fitted");
                Ok::<_, RegressionError>(tree)
            })
            .collect::<Result<Vec<_>, RegressionError>>()?;

        self.trees = trees;
        self.output_dim = dataset.output_dim();
        info!(
            n_nodes = self.trees.iter().map(|tree| tree.node_count()).sum::<usize>(),
            "random forest trained"
        );
        Ok(())
    }

    /// Averages the member predictions for every row of `features`.
    ///
    /// Each rayon job sums its trees into a private `rows x output_dim` buffer and the
    /// buffers are added together once every tree has been visited.
    pub fn predict_matrix(&self, features: &DMatrix<T>) -> Result<DMatrix<T>, RegressionError> {
        let rows = features.nrows();
        if self.output_dim == 0 || self.trees.is_empty() {
            return Ok(DMatrix::zeros(rows, 1));
        }

        let dims = self.output_dim;
        let scale = T::one() / from_count::<T>(self.trees.len());
        self.trees
            .par_iter()
            .map(|tree| tree.predict_matrix(features))
            .try_fold(
                || DMatrix::zeros(rows, dims),
                |partial, prediction| prediction.map(|p| partial + p * scale),
            )
            .try_reduce(|| DMatrix::zeros(rows, dims), |a, b| Ok(a + b))
    }

    /// Writes every tree of the ensemble to stdout.
    pub fn print_trees(&self) {
        print!("{}", self);
    }
}

impl<T: RealNumber> Regressor<T> for RandomForestRegressor<T> {
    fn fit(&mut self, features: &Table<T>, outputs: &[DVector<T>]) -> Result<(), RegressionError> {
        let dataset = Dataset::from_table(features, outputs)?;
        self.fit_dataset(&dataset)
    }

    fn predict_one(&self, features: &[T]) -> Result<DVector<T>, RegressionError> {
        if self.output_dim == 0 || self.trees.is_empty() {
            return Ok(DVector::zeros(1));
        }

        let scale = T::one() / from_count::<T>(self.trees.len());
        let mut prediction = DVector::zeros(self.output_dim);
        for tree in &self.trees {
            prediction += tree.predict_one(features)? * scale;
        }
        Ok(prediction)
    }

    fn predict(&self, features: &Table<T>) -> Result<Vec<DVector<T>>, RegressionError> {
        let predictions = self.predict_matrix(features.as_matrix())?;
        Ok(predictions
            .row_iter()
            .map(|row| row.transpose())
            .collect())
    }
}

impl<T: RealNumber> Display for RandomForestRegressor<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.trees.is_empty() {
            return writeln!(f, "Forest wasn't built yet.");
        }
        for (index, tree) in self.trees.iter().enumerate() {
            writeln!(f, "------ ")?;
            writeln!(f, "Tree number: {}", index + 1)?;
            write!(f, "{}", tree)?;
        }
        Ok(())
    }
}
