use clap::{Parser, ValueEnum};
use rusty_forest::data::series::series_to_supervised;
use rusty_forest::data::table::Table;
use rusty_forest::forests::params::ForestParams;
use rusty_forest::forests::regressor::RandomForestRegressor;
use rusty_forest::regressor::Regressor;
use rusty_forest::trees::params::RandomizedTreeParams;
use rusty_forest::trees::randomized::RandomizedTreeRegressor;
use rusty_forest::trees::regressor::DecisionTreeRegressor;
use rusty_forest::validation::walk_forward_validation;
use std::error::Error;
use std::fmt::Display;
use std::path::PathBuf;
use tracing::info;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Model {
    /// Plain decision tree searching every feature
    Tree,
    /// Decision tree searching a random subset of features at each node
    Randomized,
    /// Bagging ensemble of randomized trees
    Forest,
}

/// Walk-forward forecast of a CSV time series with regression trees.
#[derive(Parser, Debug)]
#[command(name = "forecast", version, about)]
struct Cli {
    /// CSV file with a header row, one observation per line
    data: PathBuf,

    /// Header names of columns to drop, e.g. a date column
    #[arg(long, value_delimiter = ',', default_value = "Date")]
    ignore: Vec<String>,

    #[arg(long, value_enum, default_value_t = Model::Forest)]
    model: Model,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 30)]
    trees: usize,

    /// Share of the features searched at every node, in (0, 1]
    #[arg(long, default_value_t = 1.0)]
    features_fraction: f64,

    /// Share of the rows bootstrapped for every tree, in (0, 1]
    #[arg(long, default_value_t = 1.0)]
    row_fraction: f64,

    #[arg(long, default_value_t = 20)]
    min_samples_split: usize,

    #[arg(long, default_value_t = 5)]
    max_depth: usize,

    /// Lagged observations used as features
    #[arg(long, default_value_t = 7)]
    n_in: usize,

    /// Observations to forecast per row
    #[arg(long, default_value_t = 1)]
    n_out: usize,

    /// Trailing rows held out for walk-forward validation
    #[arg(long, default_value_t = 12)]
    n_test: usize,

    /// RNG seed for reproducibility (system entropy when absent)
    #[arg(long)]
    seed: Option<u64>,

    /// Print the fitted model after validation
    #[arg(long)]
    print_trees: bool,

    /// Enable verbose (debug-level) logging
    #[arg(long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,
}

fn evaluate<R>(model: &mut R, data: &Table<f64>, cli: &Cli, n_observation: usize) -> Result<(), Box<dyn Error>>
where
    R: Regressor<f64> + Display,
{
    let report = walk_forward_validation(model, data, cli.n_test, n_observation)?;
    for step in &report.steps {
        println!("{}", step);
    }
    info!(
        total_fit_time = ?report.total_fit_time,
        mean_fit_time = ?report.mean_fit_time(),
        "fit timings"
    );
    println!("MAE: {}", report.mae);

    if cli.print_trees {
        print!("{}", model);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
        info!(threads, "thread pool configured");
    }

    let ignored = cli.ignore.iter().map(String::as_str).collect::<Vec<_>>();
    let series = Table::<f64>::from_path(&cli.data, &ignored)?;
    info!(rows = series.nrows(), columns = series.ncols(), "series loaded");

    let n_observation = cli.n_out * series.ncols();
    let data = series_to_supervised(&series, cli.n_in, cli.n_out);
    if data.is_empty() {
        return Err(format!(
            "series of {} rows is too short for windows of {} rows",
            series.nrows(),
            cli.n_in + cli.n_out
        )
        .into());
    }

    let mut tree_params = RandomizedTreeParams::new();
    tree_params.set_features_fraction(cli.features_fraction)?;
    tree_params.set_min_samples_split(cli.min_samples_split)?;
    tree_params.set_max_depth(cli.max_depth);

    match cli.model {
        Model::Tree => {
            let mut model = DecisionTreeRegressor::with_params(cli.min_samples_split, cli.max_depth)?;
            evaluate(&mut model, &data, &cli, n_observation)
        }
        Model::Randomized => {
            let mut model = RandomizedTreeRegressor::from_params(&tree_params)?;
            model.set_seed(cli.seed);
            evaluate(&mut model, &data, &cli, n_observation)
        }
        Model::Forest => {
            let mut params = ForestParams::new();
            params.set_num_trees(cli.trees)?;
            params.set_row_fraction(cli.row_fraction)?;
            params.set_tree_params(tree_params)?;
            let mut model = RandomForestRegressor::from_params(params)?;
            model.set_seed(cli.seed);
            evaluate(&mut model, &data, &cli, n_observation)
        }
    }
}
