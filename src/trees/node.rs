use nalgebra::DVector;
use std::fmt::{self, Display, Formatter};

use crate::data::dataset::RealNumber;

/// Position of a node relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeRole {
    Root,
    Left,
    Right,
}

/// Decision tree node
///
/// A node owns its children. It is a leaf exactly when `feature_index` is `None`.
#[derive(Clone, Debug)]
pub struct TreeNode<T: RealNumber> {
    pub depth: usize,
    pub role: NodeRole,
    pub samples: usize,
    /// Mean-centred squared error of the node's outputs, divided by `samples * dims`.
    pub error: T,
    /// Mean output vector, the node's prediction.
    pub value: DVector<T>,
    pub feature_index: Option<usize>,
    pub threshold: Option<T>,
    pub left: Option<Box<TreeNode<T>>>,
    pub right: Option<Box<TreeNode<T>>>,
}

impl<T: RealNumber> TreeNode<T> {
    pub fn new(depth: usize, role: NodeRole, samples: usize, error: T, value: DVector<T>) -> Self {
        Self {
            depth,
            role,
            samples,
            error,
            value,
            feature_index: None,
            threshold: None,
            left: None,
            right: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_index.is_none()
    }

    /// Follows the split decisions for a row down to the node that answers it.
    ///
    /// `feature` reads the row's value at a column; callers guarantee the column exists.
    pub fn descend(&self, feature: impl Fn(usize) -> T) -> &TreeNode<T> {
        let mut node = self;
        while let (Some(index), Some(threshold)) = (node.feature_index, node.threshold) {
            let next = if feature(index) > threshold {
                node.right.as_deref()
            } else {
                node.left.as_deref()
            };
            match next {
                Some(child) => node = child,
                None => break,
            }
        }
        node
    }

    pub fn children(&self) -> impl Iterator<Item = &TreeNode<T>> {
        self.left.as_deref().into_iter().chain(self.right.as_deref())
    }

    pub fn node_count(&self) -> usize {
        1 + self.children().map(TreeNode::node_count).sum::<usize>()
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            return 1;
        }
        self.children().map(TreeNode::leaf_count).sum()
    }

    /// Depth of the deepest node below (and including) this one.
    pub fn max_depth(&self) -> usize {
        self.children()
            .map(TreeNode::max_depth)
            .max()
            .unwrap_or(self.depth)
    }

    fn fmt_info(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let indent = " ".repeat(self.depth * 8);
        let side = match self.role {
            NodeRole::Root => "Root",
            NodeRole::Left => "Left_node",
            NodeRole::Right => "Right_node",
        };
        match (self.feature_index, self.threshold) {
            (Some(feature), Some(threshold)) => {
                writeln!(f, "{indent}{side}")?;
                writeln!(f, "{indent}  | Best value to split {threshold}")?;
                writeln!(f, "{indent}  | Best feature to split {feature}")?;
            }
            _ => writeln!(f, "{indent}{side} (leaf)")?,
        }
        writeln!(f, "{indent}  | MSE of the node: {}", self.error)?;
        writeln!(f, "{indent}  | Count of observations in node: {}", self.samples)?;
        let prediction = self
            .value
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "{indent}  | Prediction of node: {prediction}")
    }
}

impl<T: RealNumber> Display for TreeNode<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.fmt_info(f)?;
        for child in self.children() {
            write!(f, "{child}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> TreeNode<f64> {
        let mut root = TreeNode::new(0, NodeRole::Root, 4, 125.0, DVector::from_vec(vec![25.0]));
        root.feature_index = Some(0);
        root.threshold = Some(2.5);
        root.left = Some(Box::new(TreeNode::new(
            1,
            NodeRole::Left,
            2,
            25.0,
            DVector::from_vec(vec![15.0]),
        )));
        root.right = Some(Box::new(TreeNode::new(
            1,
            NodeRole::Right,
            2,
            25.0,
            DVector::from_vec(vec![35.0]),
        )));
        root
    }

    #[test]
    fn test_descend() {
        let root = stump();
        assert_eq!(root.descend(|_| 2.5).value[0], 15.0);
        assert_eq!(root.descend(|_| 2.6).value[0], 35.0);
    }

    #[test]
    fn test_descend_missing_child_stops() {
        let mut root = stump();
        root.right = None;
        assert_eq!(root.descend(|_| 10.0).value[0], 25.0);
    }

    #[test]
    fn test_counts() {
        let root = stump();
        assert_eq!(root.node_count(), 3);
        assert_eq!(root.leaf_count(), 2);
        assert_eq!(root.max_depth(), 1);
        assert!(!root.is_leaf());
        assert!(root.children().all(TreeNode::is_leaf));
    }

    #[test]
    fn test_display() {
        let dump = format!("{}", stump());
        assert!(dump.starts_with("Root\n"));
        assert!(dump.contains("        Left_node (leaf)\n"));
        assert!(dump.contains("  | Best value to split 2.5"));
        assert!(dump.contains("  | Prediction of node: 35"));
    }
}
