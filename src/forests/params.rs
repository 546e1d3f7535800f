use crate::error::RegressionError;
use crate::trees::params::{check_fraction, RandomizedTreeParams};

fn check_num_trees(num_trees: usize) -> Result<(), RegressionError> {
    if num_trees < 1 {
        return Err(RegressionError::InvalidConfiguration(
            "The number of trees must be greater than 0.".into(),
        ));
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub struct ForestParams {
    num_trees: usize,
    row_fraction: f64,
    tree_params: RandomizedTreeParams,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ForestParams {
    pub fn new() -> Self {
        Self {
            num_trees: 30,
            row_fraction: 1.0,
            tree_params: RandomizedTreeParams::new(),
        }
    }

    pub fn set_num_trees(&mut self, num_trees: usize) -> Result<(), RegressionError> {
        check_num_trees(num_trees)?;
        self.num_trees = num_trees;
        Ok(())
    }

    /// Replaces the parameters handed to every member tree.
    pub fn set_tree_params(&mut self, tree_params: RandomizedTreeParams) -> Result<(), RegressionError> {
        tree_params.validate()?;
        self.tree_params = tree_params;
        Ok(())
    }

    /// Re-checks every bound enforced by the setters.
    pub fn validate(&self) -> Result<(), RegressionError> {
        check_num_trees(self.num_trees)?;
        check_fraction("row_fraction", self.row_fraction)?;
        self.tree_params.validate()
    }

    /// Sets the share of the training rows drawn, with replacement, for every tree.
    pub fn set_row_fraction(&mut self, row_fraction: f64) -> Result<(), RegressionError> {
        check_fraction("row_fraction", row_fraction)?;
        self.row_fraction = row_fraction;
        Ok(())
    }

    pub fn set_features_fraction(&mut self, features_fraction: f64) -> Result<(), RegressionError> {
        self.tree_params.set_features_fraction(features_fraction)
    }

    pub fn set_min_samples_split(&mut self, min_samples_split: usize) -> Result<(), RegressionError> {
        self.tree_params.set_min_samples_split(min_samples_split)
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.tree_params.set_max_depth(max_depth)
    }

    pub fn num_trees(&self) -> usize {
        self.num_trees
    }

    pub fn row_fraction(&self) -> f64 {
        self.row_fraction
    }

    pub fn features_fraction(&self) -> f64 {
        self.tree_params.features_fraction()
    }

    pub fn tree_params(&self) -> &RandomizedTreeParams {
        &self.tree_params
    }
}
