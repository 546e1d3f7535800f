use approx::assert_abs_diff_eq;
use nalgebra::DVector;
use rusty_forest::data::series::{series_to_supervised, split_targets};
use rusty_forest::data::table::Table;
use rusty_forest::forests::regressor::RandomForestRegressor;
use rusty_forest::metrics::errors::mean_absolute_error;
use rusty_forest::regressor::Regressor;
use rusty_forest::trees::randomized::RandomizedTreeRegressor;
use rusty_forest::trees::regressor::DecisionTreeRegressor;
use rusty_forest::validation::walk_forward_validation;

fn seasonal_csv(days: usize) -> String {
    let mut csv = String::from("Date,Temp\n");
    for day in 0..days {
        let temp = 10.0 + 5.0 * (day as f64 * std::f64::consts::TAU / 7.0).sin();
        csv.push_str(&format!("1981-01-{:02},{:.3}\n", day % 28 + 1, temp));
    }
    csv
}

#[test]
fn walk_forward_forest_on_csv_series() {
    let series = Table::<f64>::from_reader(seasonal_csv(80).as_bytes(), &["Date"]).unwrap();
    assert_eq!(series.ncols(), 1);
    assert_eq!(series.nrows(), 80);

    let data = series_to_supervised(&series, 7, 1);
    assert_eq!(data.ncols(), 8);

    let mut forest = RandomForestRegressor::with_params(20, 0.67, 1.0, 3, 5).unwrap();
    forest.set_seed(Some(1981));
    let report = walk_forward_validation(&mut forest, &data, 6, 1).unwrap();

    assert_eq!(report.steps.len(), 6);
    // A weekly cycle is fully visible in seven lags.
    assert!(report.mae < 1.0, "mae = {}", report.mae);
    assert!(report.steps.iter().all(|step| step.predicted.len() == 1));
}

#[test]
fn every_model_through_the_common_interface() {
    let series = Table::<f64>::from_reader(seasonal_csv(50).as_bytes(), &["Date"]).unwrap();
    let data = series_to_supervised(&series, 7, 1);
    let (features, outputs) = split_targets(&data, 1).unwrap();

    let mut forest = RandomForestRegressor::with_params(5, 1.0, 1.0, 2, 6).unwrap();
    forest.set_seed(Some(3));
    let mut randomized = RandomizedTreeRegressor::with_params(0.5, 2, 6).unwrap();
    randomized.set_seed(Some(3));
    let mut models: Vec<Box<dyn Regressor<f64>>> = vec![
        Box::new(DecisionTreeRegressor::with_params(2, 6).unwrap()),
        Box::new(randomized),
        Box::new(forest),
    ];

    for model in models.iter_mut() {
        model.fit(&features, &outputs).unwrap();
        let predictions = model.predict(&features).unwrap();
        assert_eq!(predictions.len(), outputs.len());
        let single = model.predict_one(&features.row(4).unwrap()).unwrap();
        assert_abs_diff_eq!(single[0], predictions[4][0], epsilon = 1e-9);

        let mae = mean_absolute_error(&outputs, &predictions).unwrap();
        assert!(mae < 2.0, "training mae = {}", mae);
    }
}

#[test]
fn multi_output_forest() {
    let rows = 40;
    let values = (0..rows).map(|i| i as f64).collect::<Vec<_>>();
    let features = Table::from_row_slice(rows, 1, &values).unwrap();
    let outputs = (0..rows)
        .map(|i| DVector::from_vec(vec![i as f64 * 2.0, -(i as f64)]))
        .collect::<Vec<_>>();

    let mut forest = RandomForestRegressor::with_params(10, 1.0, 1.0, 2, 8).unwrap();
    forest.set_seed(Some(5));
    forest.fit(&features, &outputs).unwrap();

    let prediction = forest.predict_one(&[20.0]).unwrap();
    assert_eq!(prediction.len(), 2);
    assert!((prediction[0] - 40.0).abs() < 6.0);
    assert!((prediction[1] + 20.0).abs() < 3.0);
}
