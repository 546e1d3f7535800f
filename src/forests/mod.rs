/// Forest hyperparameters
pub mod params;
/// Random forest regressor
pub mod regressor;
