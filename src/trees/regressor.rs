//! Decision Tree Regressor
use super::{
    base::DecisionTreeBase, node::TreeNode, params::TreeParams, sampling::AllFeatures,
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
use nalgebra::DVector;
use std::fmt::{self, Display, Formatter};

/// Decision Tree Regressor
///
/// Every node searches all feature columns for the threshold that minimises the squared
/// error summed over all output dimensions.
#[derive(Clone, Debug)]
pub struct DecisionTreeRegressor<T: RealNumber> {
    base: DecisionTreeBase<T>,
}

impl<T: RealNumber> Default for DecisionTreeRegressor<T> {
    /// Creates a new instance of the decision tree regressor with default parameters.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealNumber> RegressionMetrics<T> for DecisionTreeRegressor<T> {}

impl<T: RealNumber> DecisionTreeRegressor<T> {
    /// Creates a new instance of the decision tree regressor with default parameters.
    pub fn new() -> Self {
        Self {
            base: DecisionTreeBase::new(TreeParams::new()),
        }
    }

    /// Creates a new instance of the decision tree regressor with custom parameters.
    ///
    /// # Arguments
    ///
    /// * `min_samples_split` - The minimum number of samples required to split an internal node.
    /// * `max_depth` - The maximum depth of the tree.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if the minimum number of samples to split is less than 2.
    pub fn with_params(min_samples_split: usize, max_depth: usize) -> Result<Self, RegressionError> {
        let mut tree = Self::new();
        tree.set_min_samples_split(min_samples_split)?;
        tree.set_max_depth(max_depth);
        Ok(tree)
    }

    /// Sets the minimum number of samples required to split an internal node.
    pub fn set_min_samples_split(&mut self, min_samples_split: usize) -> Result<(), RegressionError> {
        self.base.tree_params.set_min_samples_split(min_samples_split)
    }

    /// Sets the maximum depth of the tree.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.base.tree_params.set_max_depth(max_depth)
    }

    pub fn max_depth(&self) -> usize {
        self.base.tree_params.max_depth()
    }

    pub fn min_samples_split(&self) -> usize {
        self.base.tree_params.min_samples_split()
    }

    /// The root node, once the tree was fitted.
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

    /// Builds the tree from an already validated dataset.
    pub fn fit_dataset(&mut self, dataset: &Dataset<T>) -> Result<(), RegressionError> {
        self.base.fit(dataset, &mut AllFeatures)
    }

    pub fn print_tree(&self) {
        print!("{}", self);
    }
}

impl<T: RealNumber> Regressor<T> for DecisionTreeRegressor<T> {
    fn fit(&mut self, features: &Table<T>, outputs: &[DVector<T>]) -> Result<(), RegressionError> {
        let dataset = Dataset::from_table(features, outputs)?;
        self.fit_dataset(&dataset)
    }

    fn predict_one(&self, features: &[T]) -> Result<DVector<T>, RegressionError> {
        self.base.make_prediction(features)
    }

    fn predict(&self, features: &Table<T>) -> Result<Vec<DVector<T>>, RegressionError> {
        self.base.predict(features.as_matrix())
    }
}

impl<T: RealNumber> Display for DecisionTreeRegressor<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trees::node::NodeRole;
    use approx::assert_abs_diff_eq;

    fn outputs(values: &[f64]) -> Vec<DVector<f64>> {
        values.iter().map(|&v| DVector::from_vec(vec![v])).collect()
    }

    fn check_node(node: &TreeNode<f64>, max_depth: usize) {
        assert!(node.depth <= max_depth);
        match node.feature_index {
            None => {
                assert!(node.left.is_none() && node.right.is_none());
                assert!(node.threshold.is_none());
            }
            Some(_) => {
                assert!(node.left.is_some() || node.right.is_some());
                let children_error = node
                    .children()
                    .map(|child| child.error * child.samples as f64)
                    .sum::<f64>();
                assert!(children_error <= node.error * node.samples as f64 + 1e-6);
                let children_samples = node.children().map(|c| c.samples).sum::<usize>();
                assert_eq!(children_samples, node.samples);
                for child in node.children() {
                    assert_eq!(child.depth, node.depth + 1);
                    check_node(child, max_depth);
                }
            }
        }
    }

    #[test]
    fn test_stump_on_line() {
        let x = Table::from_row_slice(4, 1, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let y = outputs(&[10.0, 20.0, 30.0, 40.0]);
        let mut tree = DecisionTreeRegressor::with_params(2, 1).unwrap();
        tree.fit(&x, &y).unwrap();

        let root = tree.root().unwrap();
        assert_eq!(root.role, NodeRole::Root);
        assert_eq!(root.feature_index, Some(0));
        assert_abs_diff_eq!(root.threshold.unwrap(), 2.5, epsilon = 1e-12);

        let left = root.left.as_deref().unwrap();
        let right = root.right.as_deref().unwrap();
        assert!(left.is_leaf() && right.is_leaf());
        assert_abs_diff_eq!(left.value[0], 15.0, epsilon = 1e-9);
        assert_abs_diff_eq!(right.value[0], 35.0, epsilon = 1e-9);

        assert_abs_diff_eq!(tree.predict_one(&[2.2]).unwrap()[0], 15.0, epsilon = 1e-9);
        assert_abs_diff_eq!(tree.predict_one(&[3.7]).unwrap()[0], 35.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invariants_on_multi_output_data() {
        let rows = 40;
        let values = (0..rows)
            .flat_map(|i| {
                let t = i as f64;
                [t, (t * 0.7).sin(), (t % 5.0)]
            })
            .collect::<Vec<_>>();
        let x = Table::from_row_slice(rows, 3, &values).unwrap();
        let y = (0..rows)
            .map(|i| {
                let t = i as f64;
                DVector::from_vec(vec![t * 2.0 + (t % 5.0), (t * 0.7).sin() * 10.0])
            })
            .collect::<Vec<_>>();

        let mut tree = DecisionTreeRegressor::with_params(3, 4).unwrap();
        tree.fit(&x, &y).unwrap();
        let root = tree.root().unwrap();
        check_node(root, 4);
        assert_eq!(root.samples, rows);

        let predictions = tree.predict(&x).unwrap();
        assert_eq!(predictions.len(), rows);
        assert!(predictions.iter().all(|p| p.len() == 2));
    }

    #[test]
    fn test_min_samples_split_stops_growth() {
        let x = Table::from_row_slice(4, 1, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let y = outputs(&[10.0, 20.0, 30.0, 40.0]);
        let mut tree = DecisionTreeRegressor::with_params(5, 10).unwrap();
        tree.fit(&x, &y).unwrap();
        assert!(tree.root().unwrap().is_leaf());
        assert_abs_diff_eq!(tree.predict_one(&[1.0]).unwrap()[0], 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_max_depth_zero_is_single_leaf() {
        let x = Table::from_row_slice(4, 1, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let y = outputs(&[10.0, 20.0, 30.0, 40.0]);
        let mut tree = DecisionTreeRegressor::with_params(2, 0).unwrap();
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.root().unwrap().node_count(), 1);
    }

    #[test]
    fn test_deep_tree_fits_training_data() {
        let x = Table::from_row_slice(6, 1, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let y = outputs(&[1.0, 4.0, 9.0, 16.0, 25.0, 36.0]);
        let mut tree = DecisionTreeRegressor::with_params(2, 10).unwrap();
        tree.fit(&x, &y).unwrap();
        for (row, expected) in [1.0, 4.0, 9.0, 16.0, 25.0, 36.0].iter().enumerate() {
            let prediction = tree.predict_one(&[row as f64 + 1.0]).unwrap();
            assert_abs_diff_eq!(prediction[0], *expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_fit_with_empty_outputs() {
        let x = Table::<f64>::new(1);
        let mut tree = DecisionTreeRegressor::new();
        assert!(matches!(
            tree.fit(&x, &[]),
            Err(RegressionError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_refit_with_other_output_shape() {
        let x = Table::from_row_slice(2, 1, &[1.0, 2.0]).unwrap();
        let mut tree = DecisionTreeRegressor::with_params(2, 2).unwrap();
        tree.fit(&x, &outputs(&[1.0, 2.0])).unwrap();
        let wide = vec![DVector::from_vec(vec![1.0, 1.0]), DVector::from_vec(vec![2.0, 2.0])];
        assert!(matches!(
            tree.fit(&x, &wide),
            Err(RegressionError::DimensionMismatch(_))
        ));
        assert!(tree.fit(&x, &outputs(&[3.0, 4.0])).is_ok());
    }

    #[test]
    fn test_predict_short_row() {
        let x = Table::from_row_slice(3, 2, &[1.0, 0.0, 2.0, 0.0, 3.0, 1.0]).unwrap();
        let mut tree = DecisionTreeRegressor::with_params(2, 2).unwrap();
        tree.fit(&x, &outputs(&[1.0, 2.0, 3.0])).unwrap();
        assert!(matches!(
            tree.predict_one(&[1.0]),
            Err(RegressionError::IndexOutOfRange { what: "feature", .. })
        ));
        let narrow = Table::from_row_slice(1, 1, &[1.0]).unwrap();
        assert!(tree.predict(&narrow).is_err());
    }

    #[test]
    fn test_unfitted_tree_predicts_zero() {
        let tree = DecisionTreeRegressor::<f64>::new();
        assert_eq!(tree.predict_one(&[1.0]).unwrap(), DVector::from_vec(vec![0.0]));
        assert!(tree.root().is_none());
    }

    #[test]
    fn test_invalid_min_samples_split() {
        assert!(matches!(
            DecisionTreeRegressor::<f64>::with_params(1, 3),
            Err(RegressionError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_print_format() {
        let x = Table::from_row_slice(4, 1, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut tree = DecisionTreeRegressor::with_params(2, 1).unwrap();
        tree.fit(&x, &outputs(&[10.0, 20.0, 30.0, 40.0])).unwrap();
        let dump = tree.to_string();
        assert!(dump.starts_with("Root\n"));
        assert!(dump.contains("Right_node (leaf)"));
        assert!(dump.contains("Count of observations in node: 2"));
    }

    #[test]
    fn test_adjacent_floats_split_into_two_leaves() {
        let a = 1.0 + f64::EPSILON;
        let b = 1.0 + 2.0 * f64::EPSILON;
        let x = Table::from_row_slice(2, 1, &[a, b]).unwrap();
        let mut tree = DecisionTreeRegressor::with_params(2, 3).unwrap();
        tree.fit(&x, &outputs(&[0.0, 10.0])).unwrap();

        let root = tree.root().unwrap();
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.depth(), 1);
        assert_eq!(root.left.as_deref().unwrap().samples, 1);
        assert_eq!(root.right.as_deref().unwrap().samples, 1);
        assert_abs_diff_eq!(tree.predict_one(&[a]).unwrap()[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(tree.predict_one(&[b]).unwrap()[0], 10.0, epsilon = 1e-12);
    }
}
