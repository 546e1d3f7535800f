/// Value traits and the paired feature/output view used by tree induction
pub mod dataset;
/// Sliding-window reshaping and chronological splits
pub mod series;
/// Growable feature matrix
pub mod table;
