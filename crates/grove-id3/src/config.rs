//! Configuration builder for bootstrap forest training.

use std::borrow::Borrow;

use crate::error::Id3Error;
use crate::example::Example;
use crate::result::ForestResult;

/// Whether to compute out-of-bag evaluation during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OobMode {
    /// Compute OOB accuracy.
    Enabled,
    /// Skip OOB evaluation.
    Disabled,
}

/// Configuration for bootstrap forest training.
///
/// Construct via [`ForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter       | Default     |
/// |-----------------|-------------|
/// | `max_depth`     | `None`      |
/// | `default_value` | `None`      |
/// | `seed`          | 42          |
/// | `oob_mode`      | `Disabled`  |
#[derive(Debug, Clone)]
pub struct ForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) sample_size: usize,
    pub(crate) max_depth: Option<usize>,
    pub(crate) default_value: Option<String>,
    pub(crate) seed: u64,
    pub(crate) oob_mode: OobMode,
}

impl ForestConfig {
    /// Create a config training `n_trees` trees on `sample_size` draws each.
    ///
    /// # Errors
    ///
    /// | Variant                          | When                  |
    /// |----------------------------------|-----------------------|
    /// | [`Id3Error::InvalidTreeCount`]   | `n_trees` is zero     |
    /// | [`Id3Error::InvalidSampleSize`]  | `sample_size` is zero |
    pub fn new(n_trees: usize, sample_size: usize) -> Result<Self, Id3Error> {
        if n_trees == 0 {
            return Err(Id3Error::InvalidTreeCount { n_trees });
        }
        if sample_size == 0 {
            return Err(Id3Error::InvalidSampleSize { sample_size });
        }
        Ok(Self {
            n_trees,
            sample_size,
            max_depth: None,
            default_value: None,
            seed: 42,
            oob_mode: OobMode::Disabled,
        })
    }

    // --- Setters ---

    /// Set the maximum depth of every member tree. `None` means unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the default value recorded on every member tree.
    #[must_use]
    pub fn with_default_value(mut self, default_value: Option<String>) -> Self {
        self.default_value = default_value;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the OOB evaluation mode.
    #[must_use]
    pub fn with_oob_mode(mut self, oob_mode: OobMode) -> Self {
        self.oob_mode = oob_mode;
        self
    }

    // --- Getters ---

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the number of examples drawn (with replacement) per tree.
    #[must_use]
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the recorded default value, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the OOB evaluation mode.
    #[must_use]
    pub fn oob_mode(&self) -> OobMode {
        self.oob_mode
    }

    /// Train a forest on `examples`.
    ///
    /// Every tree may split on the attributes of the first example, minus `Class`.
    ///
    /// # Errors
    ///
    /// | Variant                               | When                                       |
    /// |---------------------------------------|--------------------------------------------|
    /// | [`Id3Error::EmptyDataset`]            | `examples` is empty                        |
    /// | [`Id3Error::MissingClass`]            | an example has no `Class` value            |
    /// | [`Id3Error::InvalidMaxDepth`]         | `max_depth` is `Some(0)`                   |
    /// | [`Id3Error::OobEvaluationFailed`]     | OOB enabled but every example was in-bag   |
    pub fn fit<E>(&self, examples: &[E]) -> Result<ForestResult, Id3Error>
    where
        E: Borrow<Example> + Sync,
    {
        crate::forest::train(self, examples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ForestConfig::new(20, 30).unwrap();
        assert_eq!(config.n_trees(), 20);
        assert_eq!(config.sample_size(), 30);
        assert_eq!(config.seed(), 42);
        assert_eq!(config.oob_mode(), OobMode::Disabled);
        assert_eq!(config.max_depth(), None);
        assert_eq!(config.default_value(), None);
    }

    #[test]
    fn zero_trees_rejected() {
        let err = ForestConfig::new(0, 10).unwrap_err();
        assert!(matches!(err, Id3Error::InvalidTreeCount { n_trees: 0 }));
    }

    #[test]
    fn zero_sample_size_rejected() {
        let err = ForestConfig::new(5, 0).unwrap_err();
        assert!(matches!(err, Id3Error::InvalidSampleSize { sample_size: 0 }));
    }

    #[test]
    fn setters_chain() {
        let config = ForestConfig::new(3, 4)
            .unwrap()
            .with_seed(7)
            .with_max_depth(Some(2))
            .with_default_value(Some("democrat".into()))
            .with_oob_mode(OobMode::Enabled);
        assert_eq!(config.seed(), 7);
        assert_eq!(config.max_depth(), Some(2));
        assert_eq!(config.default_value(), Some("democrat"));
        assert_eq!(config.oob_mode(), OobMode::Enabled);
    }
}
