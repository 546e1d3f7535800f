//! Walk-forward evaluation of a regressor on a supervised series table.
use nalgebra::DVector;
use std::fmt::{self, Display, Formatter};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

use crate::data::{
    dataset::RealNumber,
    series::{split_targets, train_test_split},
    table::Table,
};
use crate::error::RegressionError;
use crate::metrics::errors::mean_absolute_error;
use crate::regressor::Regressor;

/// One forecast of the walk: the held-out outputs and the model's answer.
#[derive(Clone, Debug, PartialEq)]
pub struct ForecastStep<T: RealNumber> {
    pub expected: DVector<T>,
    pub predicted: DVector<T>,
    pub fit_time: Duration,
}

fn join<T: RealNumber>(values: &DVector<T>) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl<T: RealNumber> Display for ForecastStep<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ">expected={}, predicted={}",
            join(&self.expected),
            join(&self.predicted)
        )
    }
}

#[derive(Clone, Debug)]
pub struct WalkForwardReport<T: RealNumber> {
    pub steps: Vec<ForecastStep<T>>,
    /// Mean absolute error over every forecast cell.
    pub mae: T,
    pub total_fit_time: Duration,
}

impl<T: RealNumber> WalkForwardReport<T> {
    pub fn mean_fit_time(&self) -> Duration {
        match u32::try_from(self.steps.len()) {
            Ok(n) if n > 0 => self.total_fit_time / n,
            _ => Duration::ZERO,
        }
    }
}

/// Walk-forward validation over the last `n_test` rows of `data`.
///
/// Each row of `data` holds features followed by `n_observation` output values. For
/// every test row in order, the regressor is refitted on all rows before it, asked
/// for that row's outputs, and the row then joins the training set.
///
/// # Errors
///
/// `InvalidConfiguration` if `n_test` is zero or exceeds the row count, or if
/// `n_observation` leaves no feature column. Fit and predict errors are propagated.
#[instrument(skip_all, fields(n_rows = data.nrows(), n_test, n_observation))]
pub fn walk_forward_validation<T, R>(
    regressor: &mut R,
    data: &Table<T>,
    n_test: usize,
    n_observation: usize,
) -> Result<WalkForwardReport<T>, RegressionError>
where
    T: RealNumber,
    R: Regressor<T> + ?Sized,
{
    if n_test == 0 {
        return Err(RegressionError::InvalidConfiguration(
            "walk-forward validation needs at least one test row".into(),
        ));
    }
    let (mut train, test) = train_test_split(data, n_test)?;
    let (test_features, test_targets) = split_targets(&test, n_observation)?;

    let mut steps = Vec::with_capacity(n_test);
    let mut total_fit_time = Duration::ZERO;
    for (i, expected) in test_targets.into_iter().enumerate() {
        let (features, outputs) = split_targets(&train, n_observation)?;

        let start = Instant::now();
        regressor.fit(&features, &outputs)?;
        let fit_time = start.elapsed();
        total_fit_time += fit_time;

        let predicted = regressor.predict_one(&test_features.row(i)?)?;
        let step = ForecastStep {
            expected,
            predicted,
            fit_time,
        };
        debug!(step = i, train_rows = train.nrows(), ?fit_time, "{}", step);
        steps.push(step);

        train.push_row(&test.row(i)?)?;
    }

    let (expected, predicted): (Vec<_>, Vec<_>) = steps
        .iter()
        .map(|step| (step.expected.clone(), step.predicted.clone()))
        .unzip();
    let mae = mean_absolute_error(&expected, &predicted)?;
    info!(%mae, ?total_fit_time, "walk-forward validation finished");

    Ok(WalkForwardReport {
        steps,
        mae,
        total_fit_time,
    })
}
