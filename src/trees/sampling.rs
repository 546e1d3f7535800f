use rand::{seq::index, Rng};

/// Chooses which columns a node may split on.
pub trait FeatureSampler {
    /// Column indices to search, in ascending order.
    fn candidates(&mut self, n_features: usize) -> Vec<usize>;
}

/// Every column is a candidate at every node.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllFeatures;

impl FeatureSampler for AllFeatures {
    fn candidates(&mut self, n_features: usize) -> Vec<usize> {
        (0..n_features).collect()
    }
}

/// A fresh uniform subset of the columns, drawn without replacement at each node.
pub struct RandomSubset<'a, R: Rng> {
    fraction: f64,
    rng: &'a mut R,
}

impl<'a, R: Rng> RandomSubset<'a, R> {
    pub fn new(fraction: f64, rng: &'a mut R) -> Self {
        Self { fraction, rng }
    }
}

/// Number of columns in a subset: `round(fraction * n_features)`, at least one.
pub fn subset_size(n_features: usize, fraction: f64) -> usize {
    ((n_features as f64 * fraction).round() as usize).clamp(1, n_features.max(1))
}

impl<R: Rng> FeatureSampler for RandomSubset<'_, R> {
    fn candidates(&mut self, n_features: usize) -> Vec<usize> {
        if n_features == 0 {
            return Vec::new();
        }
        let amount = subset_size(n_features, self.fraction);
        let mut picked = index::sample(&mut *self.rng, n_features, amount).into_vec();
        picked.sort_unstable();
        picked
    }
}
