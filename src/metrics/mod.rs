/// Regression error measures
pub mod errors;
