//! Holdout splits and pruned-vs-unpruned learning curves.

use std::borrow::Borrow;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::error::Id3Error;
use crate::example::Example;
use crate::tree::build_tree;

/// A shuffled train / validation / test partition of borrowed examples.
#[derive(Debug, Clone)]
pub struct HoldoutSplit<'a> {
    /// Examples used for induction.
    pub train: Vec<&'a Example>,
    /// Examples used as the pruning oracle.
    pub validation: Vec<&'a Example>,
    /// Everything left over.
    pub test: Vec<&'a Example>,
}

/// Shuffle `examples` and cut off `n_train` training and `n_valid` validation examples.
///
/// The remaining examples form the test set, which may be empty.
///
/// # Errors
///
/// Returns [`Id3Error::SplitTooLarge`] if `n_train + n_valid` exceeds `examples.len()`.
pub fn holdout_split<'a, E: Borrow<Example>>(
    examples: &'a [E],
    n_train: usize,
    n_valid: usize,
    rng: &mut impl Rng,
) -> Result<HoldoutSplit<'a>, Id3Error> {
    let requested = n_train + n_valid;
    if requested > examples.len() {
        return Err(Id3Error::SplitTooLarge {
            requested,
            available: examples.len(),
        });
    }

    let mut shuffled: Vec<&'a Example> = examples
        .iter()
        .map(<E as Borrow<Example>>::borrow)
        .collect();
    shuffled.shuffle(rng);

    let test = shuffled.split_off(requested);
    let validation = shuffled.split_off(n_train);
    Ok(HoldoutSplit {
        train: shuffled,
        validation,
        test,
    })
}

/// Half of the examples left after training, rounding an odd remainder up.
pub(crate) fn validation_size(n_examples: usize, training_size: usize) -> usize {
    n_examples.saturating_sub(training_size).div_ceil(2)
}

/// Mean test accuracy for one training size of a [`PruningCurve`].
#[derive(Debug, Clone, PartialEq)]
pub struct CurvePoint {
    /// Number of training examples used for induction.
    pub training_size: usize,
    /// Mean test accuracy of trees built on train and pruned on validation.
    pub pruned_accuracy: f64,
    /// Mean test accuracy of unpruned trees built on train and validation combined.
    pub unpruned_accuracy: f64,
}

/// Learning curve comparing reduced-error pruning against spending the
/// validation examples on induction instead.
///
/// For each training size `t`, every repetition shuffles the dataset, takes `t`
/// training examples, half of the remainder (rounded up) as validation and the
/// rest as test.
///
/// # Defaults
///
/// | Parameter     | Default |
/// |---------------|---------|
/// | `seed`        | 42      |
#[derive(Debug, Clone)]
pub struct PruningCurve {
    training_sizes: Vec<usize>,
    repetitions: usize,
    seed: u64,
}

impl PruningCurve {
    /// Create a curve over `training_sizes`, averaging `repetitions` runs each.
    ///
    /// # Errors
    ///
    /// Returns [`Id3Error::InvalidRepetitions`] if `repetitions` is zero.
    pub fn new(training_sizes: Vec<usize>, repetitions: usize) -> Result<Self, Id3Error> {
        if repetitions == 0 {
            return Err(Id3Error::InvalidRepetitions { repetitions });
        }
        Ok(Self {
            training_sizes,
            repetitions,
            seed: 42,
        })
    }

    /// Set the random seed for shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the training sizes, in evaluation order.
    #[must_use]
    pub fn training_sizes(&self) -> &[usize] {
        &self.training_sizes
    }

    /// Return the number of repetitions per training size.
    #[must_use]
    pub fn repetitions(&self) -> usize {
        self.repetitions
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run the experiment and return one point per training size.
    ///
    /// Repetitions run in parallel; each draws its shuffle from a seed taken
    /// from a master stream, so results do not depend on thread count.
    ///
    /// # Errors
    ///
    /// | Variant                       | When                                          |
    /// |-------------------------------|-----------------------------------------------|
    /// | [`Id3Error::EmptyDataset`]    | `examples` is empty or a training size is 0   |
    /// | [`Id3Error::SplitTooLarge`]   | a training size exceeds `examples.len()`      |
    /// | [`Id3Error::MissingClass`]    | a training example has no `Class` value       |
    #[instrument(
        skip_all,
        fields(n_sizes = self.training_sizes.len(), repetitions = self.repetitions)
    )]
    pub fn run<E>(&self, examples: &[E]) -> Result<Vec<CurvePoint>, Id3Error>
    where
        E: Borrow<Example> + Sync,
    {
        if examples.is_empty() {
            return Err(Id3Error::EmptyDataset);
        }

        let mut master_rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut points = Vec::with_capacity(self.training_sizes.len());

        for &training_size in &self.training_sizes {
            let n_valid = validation_size(examples.len(), training_size);
            let seeds: Vec<u64> = (0..self.repetitions)
                .map(|_| master_rng.r#gen())
                .collect();

            let runs: Vec<(f64, f64)> = seeds
                .into_par_iter()
                .map(|seed| -> Result<(f64, f64), Id3Error> {
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);
                    let split = holdout_split(examples, training_size, n_valid, &mut rng)?;

                    let mut pruned = build_tree(&split.train, None)?;
                    pruned.prune(&split.validation);

                    let combined: Vec<&Example> = split
                        .train
                        .iter()
                        .chain(&split.validation)
                        .copied()
                        .collect();
                    let unpruned = build_tree(&combined, None)?;

                    Ok((pruned.accuracy(&split.test), unpruned.accuracy(&split.test)))
                })
                .collect::<Result<_, Id3Error>>()?;

            let n = runs.len() as f64;
            let (pruned_sum, unpruned_sum) = runs
                .iter()
                .fold((0.0, 0.0), |(p, u), &(rp, ru)| (p + rp, u + ru));
            let point = CurvePoint {
                training_size,
                pruned_accuracy: pruned_sum / n,
                unpruned_accuracy: unpruned_sum / n,
            };
            debug!(
                training_size,
                pruned_accuracy = point.pruned_accuracy,
                unpruned_accuracy = point.unpruned_accuracy,
                "curve point"
            );
            points.push(point);
        }

        info!(n_points = points.len(), "pruning curve complete");
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ex(pairs: &[(&str, &str)]) -> Example {
        pairs.iter().copied().collect()
    }

    /// Class follows `a`; `b` is noise.
    fn make_data(n: usize) -> Vec<Example> {
        (0..n)
            .map(|i| {
                let a = if i % 2 == 0 { "on" } else { "off" };
                let b = ["x", "y", "z"][i % 3];
                let class = if i % 2 == 0 { "yes" } else { "no" };
                ex(&[("a", a), ("b", b), ("Class", class)])
            })
            .collect()
    }

    // --- holdout_split ---

    #[test]
    fn split_sizes_and_disjointness() {
        let examples = make_data(20);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let split = holdout_split(&examples, 10, 5, &mut rng).unwrap();
        assert_eq!(split.train.len(), 10);
        assert_eq!(split.validation.len(), 5);
        assert_eq!(split.test.len(), 5);

        let mut all: Vec<*const Example> = split
            .train
            .iter()
            .chain(&split.validation)
            .chain(&split.test)
            .map(|e| *e as *const Example)
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 20);
    }

    #[test]
    fn split_is_deterministic_for_a_seed() {
        let examples = make_data(12);
        let a = holdout_split(&examples, 6, 3, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        let b = holdout_split(&examples, 6, 3, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        assert_eq!(a.train, b.train);
        assert_eq!(a.validation, b.validation);
    }

    #[test]
    fn split_too_large_rejected() {
        let examples = make_data(4);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = holdout_split(&examples, 3, 2, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            Id3Error::SplitTooLarge {
                requested: 5,
                available: 4
            }
        ));
    }

    // --- PruningCurve ---

    #[test]
    fn validation_takes_the_larger_half_of_the_remainder() {
        assert_eq!(validation_size(435, 10), 213);
        assert_eq!(validation_size(40, 30), 5);
        assert_eq!(validation_size(11, 10), 1);
        assert_eq!(validation_size(10, 10), 0);
        assert_eq!(validation_size(10, 11), 0);
    }

    #[test]
    fn builder_getters() {
        let curve = PruningCurve::new(vec![10, 20, 30], 7).unwrap();
        assert_eq!(curve.seed(), 42);
        let curve = curve.with_seed(9);
        assert_eq!(curve.training_sizes(), &[10, 20, 30]);
        assert_eq!(curve.repetitions(), 7);
        assert_eq!(curve.seed(), 9);
    }

    #[test]
    fn zero_repetitions_rejected() {
        let err = PruningCurve::new(vec![5], 0).unwrap_err();
        assert!(matches!(err, Id3Error::InvalidRepetitions { repetitions: 0 }));
    }

    #[test]
    fn one_point_per_size() {
        let examples = make_data(40);
        let points = PruningCurve::new(vec![10, 20], 4)
            .unwrap()
            .with_seed(3)
            .run(&examples)
            .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].training_size, 10);
        assert_eq!(points[1].training_size, 20);
        for point in &points {
            assert!((0.0..=1.0).contains(&point.pruned_accuracy));
            assert!((0.0..=1.0).contains(&point.unpruned_accuracy));
        }
    }

    #[test]
    fn noise_free_curve_is_perfect() {
        // Any 35 of these examples still let `a` separate the classes perfectly.
        let examples = make_data(40);
        let points = PruningCurve::new(vec![30], 3).unwrap().run(&examples).unwrap();
        assert!((points[0].unpruned_accuracy - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn curve_is_deterministic_for_a_seed() {
        let examples = make_data(30);
        let curve = PruningCurve::new(vec![8, 12], 5).unwrap().with_seed(11);
        assert_eq!(curve.run(&examples).unwrap(), curve.run(&examples).unwrap());
    }

    #[test]
    fn oversized_training_size_rejected() {
        let examples = make_data(10);
        let err = PruningCurve::new(vec![11], 1)
            .unwrap()
            .run(&examples)
            .unwrap_err();
        assert!(matches!(err, Id3Error::SplitTooLarge { .. }));
    }

    #[test]
    fn empty_dataset_rejected() {
        let none: Vec<Example> = vec![];
        let err = PruningCurve::new(vec![1], 1).unwrap().run(&none).unwrap_err();
        assert!(matches!(err, Id3Error::EmptyDataset));
    }
}
