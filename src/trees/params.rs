use crate::error::RegressionError;

/// Smallest number of rows a threshold window needs: two distinct values.
pub const SPLIT_WINDOW: usize = 2;

pub(crate) fn check_fraction(name: &str, fraction: f64) -> Result<(), RegressionError> {
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(RegressionError::InvalidConfiguration(format!(
            "{} must be in the interval (0.0, 1.0], got {}",
            name, fraction
        )));
    }
    Ok(())
}

fn check_min_samples_split(min_samples_split: usize) -> Result<(), RegressionError> {
    if min_samples_split < SPLIT_WINDOW {
        return Err(RegressionError::InvalidConfiguration(format!(
            "min_samples_split must be greater than or equal to {}, got {}",
            SPLIT_WINDOW, min_samples_split
        )));
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub struct TreeParams {
    min_samples_split: usize,
    max_depth: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeParams {
    pub fn new() -> Self {
        Self {
            min_samples_split: 20,
            max_depth: 5,
        }
    }

    pub fn set_min_samples_split(&mut self, min_samples_split: usize) -> Result<(), RegressionError> {
        check_min_samples_split(min_samples_split)?;
        self.min_samples_split = min_samples_split;
        Ok(())
    }

    /// Re-checks every bound enforced by the setters.
    pub fn validate(&self) -> Result<(), RegressionError> {
        check_min_samples_split(self.min_samples_split)
    }

    /// Sets the depth at which nodes stop splitting. A depth of 0 yields a single leaf.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

#[derive(Clone, Debug)]
pub struct RandomizedTreeParams {
    base_params: TreeParams,
    features_fraction: f64,
}

impl Default for RandomizedTreeParams {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomizedTreeParams {
    pub fn new() -> Self {
        Self {
            base_params: TreeParams::new(),
            features_fraction: 1.0,
        }
    }

    pub fn set_min_samples_split(&mut self, min_samples_split: usize) -> Result<(), RegressionError> {
        self.base_params.set_min_samples_split(min_samples_split)
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.base_params.set_max_depth(max_depth)
    }

    pub fn set_features_fraction(&mut self, features_fraction: f64) -> Result<(), RegressionError> {
        check_fraction("features_fraction", features_fraction)?;
        self.features_fraction = features_fraction;
        Ok(())
    }

    pub fn min_samples_split(&self) -> usize {
        self.base_params.min_samples_split
    }

    pub fn max_depth(&self) -> usize {
        self.base_params.max_depth
    }

    pub fn features_fraction(&self) -> f64 {
        self.features_fraction
    }

    pub fn base_params(&self) -> &TreeParams {
        &self.base_params
    }

    /// Re-checks every bound enforced by the setters.
    pub fn validate(&self) -> Result<(), RegressionError> {
        self.base_params.validate()?;
        check_fraction("features_fraction", self.features_fraction)
    }
}
