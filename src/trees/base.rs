// Base Decision Tree
use nalgebra::{DMatrix, DVector};
use std::fmt::{self, Display, Formatter};
use tracing::debug;

use super::node::{NodeRole, TreeNode};
use super::params::TreeParams;
use super::sampling::FeatureSampler;
use super::split::{best_split, column_means, node_error};
use crate::data::dataset::{Dataset, RealNumber};
use crate::error::RegressionError;

/// Induction and traversal shared by every tree variant.
///
/// Variants differ only in the [`FeatureSampler`] handed to [`DecisionTreeBase::fit`].
#[derive(Clone, Debug)]
pub struct DecisionTreeBase<T: RealNumber> {
    pub root: Option<Box<TreeNode<T>>>,
    pub tree_params: TreeParams,
    n_features: usize,
    output_dim: usize,
}

impl<T: RealNumber> DecisionTreeBase<T> {
    pub fn new(tree_params: TreeParams) -> Self {
        Self {
            root: None,
            tree_params,
            n_features: 0,
            output_dim: 0,
        }
    }

    /// Number of feature columns seen during fit.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Length of the predicted vectors, 0 before the first fit.
    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.node_count())
    }

    pub fn leaf_count(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.leaf_count())
    }

    /// Depth of the deepest node, 0 for a single leaf or an unfitted tree.
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.max_depth())
    }

    /// Grows the tree from the root over `dataset`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the tree was fitted before with a different output length.
    pub fn fit<S: FeatureSampler>(
        &mut self,
        dataset: &Dataset<T>,
        sampler: &mut S,
    ) -> Result<(), RegressionError> {
        if self.output_dim != 0 && self.output_dim != dataset.output_dim() {
            return Err(RegressionError::DimensionMismatch(format!(
                "model predicts {} outputs, got rows of {}",
                self.output_dim,
                dataset.output_dim()
            )));
        }

        let root = self.build_tree(dataset, 0, NodeRole::Root, sampler);
        debug!(
            n_samples = dataset.nrows(),
            n_features = dataset.nfeatures(),
            n_nodes = root.node_count(),
            depth = root.max_depth(),
            "decision tree built"
        );

        self.n_features = dataset.nfeatures();
        self.output_dim = dataset.output_dim();
        self.root = Some(Box::new(root));
        Ok(())
    }

    fn build_tree<S: FeatureSampler>(
        &self,
        dataset: &Dataset<T>,
        depth: usize,
        role: NodeRole,
        sampler: &mut S,
    ) -> TreeNode<T> {
        let (_, y) = dataset.into_parts();
        let value = column_means(y);
        let error = node_error(y, &value);
        let mut node = TreeNode::new(depth, role, dataset.nrows(), error, value);

        if depth >= self.tree_params.max_depth()
            || dataset.nrows() < self.tree_params.min_samples_split()
        {
            return node;
        }

        let candidates = sampler.candidates(dataset.nfeatures());
        let Some(split) = best_split(dataset, &candidates, error) else {
            return node;
        };

        let (left, right) = dataset.split_on_threshold(split.feature_index, split.threshold);
        node.feature_index = Some(split.feature_index);
        node.threshold = Some(split.threshold);
        if left.is_not_empty() {
            node.left = Some(Box::new(self.build_tree(&left, depth + 1, NodeRole::Left, sampler)));
        }
        if right.is_not_empty() {
            node.right = Some(Box::new(self.build_tree(
                &right,
                depth + 1,
                NodeRole::Right,
                sampler,
            )));
        }
        node
    }

    /// Predicts one row. An unfitted tree answers the single-value zero vector.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` if the row is shorter than the number of fitted features.
    pub fn make_prediction(&self, features: &[T]) -> Result<DVector<T>, RegressionError> {
        let Some(root) = self.root.as_deref() else {
            return Ok(DVector::zeros(1));
        };
        self.check_width(features.len())?;
        Ok(root.descend(|index| features[index]).value.clone())
    }

    /// Predicts every row of a matrix into a `rows x output_dim` matrix.
    pub fn predict_matrix(&self, features: &DMatrix<T>) -> Result<DMatrix<T>, RegressionError> {
        let Some(root) = self.root.as_deref() else {
            return Ok(DMatrix::zeros(features.nrows(), 1));
        };
        self.check_width(features.ncols())?;

        let mut predictions = DMatrix::zeros(features.nrows(), self.output_dim);
        for (i, row) in features.row_iter().enumerate() {
            let leaf = root.descend(|index| row[index]);
            for (j, &value) in leaf.value.iter().enumerate() {
                predictions[(i, j)] = value;
            }
        }
        Ok(predictions)
    }

    pub fn predict(&self, features: &DMatrix<T>) -> Result<Vec<DVector<T>>, RegressionError> {
        let predictions = self.predict_matrix(features)?;
        Ok(predictions
            .row_iter()
            .map(|row| row.transpose())
            .collect())
    }

    fn check_width(&self, width: usize) -> Result<(), RegressionError> {
        if width < self.n_features {
            return Err(RegressionError::IndexOutOfRange {
                what: "feature",
                index: width,
                len: self.n_features,
            });
        }
        Ok(())
    }
}

impl<T: RealNumber> Display for DecisionTreeBase<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => write!(f, "{root}"),
            None => writeln!(f, "Tree wasn't built yet."),
        }
    }
}
