/// Induction and traversal shared by the tree variants
pub mod base;
/// Tree nodes and their text dump
pub mod node;
/// Tree hyperparameters
pub mod params;
/// Decision tree with per-node feature subsampling
pub mod randomized;
/// Decision tree regressor
pub mod regressor;
/// Candidate feature policies
pub mod sampling;
/// Squared-error split search
pub mod split;
