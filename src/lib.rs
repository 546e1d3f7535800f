//! # Rusty-forest
//!
//! `rusty-forest` provides multi-output regression trees and a bagging random forest
//! built on them, together with the table and time-series utilities needed to
//! evaluate them with walk-forward validation.
//!
//! ## Getting Started
//!
//! To use `rusty-forest`, add the following to your `Cargo.toml` file:
//!
//! ```toml
//! [dependencies]
//! rusty-forest = "*"
//! ```
//!
//! ## Example Usage
//!
//! As a quick example, here's how you can train a seeded random forest and predict one row:
//!
//! ```rust
//! use rusty_forest::data::table::Table;
//! use rusty_forest::forests::regressor::RandomForestRegressor;
//! use rusty_forest::regressor::Regressor;
//! use nalgebra::DVector;
//!
//! let x = Table::from_row_slice(4, 1, &[1.0, 2.0, 3.0, 4.0]).unwrap();
//! let y = vec![
//!     DVector::from_vec(vec![10.0]),
//!     DVector::from_vec(vec![20.0]),
//!     DVector::from_vec(vec![30.0]),
//!     DVector::from_vec(vec![40.0]),
//! ];
//!
//! let mut model = RandomForestRegressor::with_params(10, 1.0, 1.0, 2, 3).unwrap();
//! model.set_seed(Some(42));
//!
//! model.fit(&x, &y).unwrap();
//!
//! let prediction = model.predict_one(&[3.7]).unwrap();
//! assert_eq!(prediction.len(), 1);
//! ```

/// Tables, value traits and series reshaping
pub mod data;
/// Error type shared by the crate
pub mod error;
/// Random Forests
pub mod forests;
/// Functions for evaluating model performance
pub mod metrics;
/// The common regressor interface
pub mod regressor;
/// Decision trees
pub mod trees;
/// Walk-forward validation
pub mod validation;

pub use error::RegressionError;
