//! Bootstrap forest training with parallel tree construction.

use std::borrow::Borrow;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::{ForestConfig, OobMode};
use crate::error::Id3Error;
use crate::example::{AttributeList, Example};
use crate::oob::compute_oob;
use crate::result::{ForestResult, TrainingMetadata};
use crate::tree::{DecisionTree, Id3Config};

/// A fitted bootstrap forest.
///
/// Holds at least one tree; trees keep their training order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) attributes: AttributeList,
}

impl RandomForest {
    /// Return the member trees in training order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the attributes member trees were allowed to split on.
    #[must_use]
    pub fn attributes(&self) -> &AttributeList {
        &self.attributes
    }
}

/// Train `n_trees` trees on bootstrap samples of `sample_size` examples each.
///
/// Uses the default seed; see [`ForestConfig`] for the full set of options.
///
/// # Errors
///
/// See [`ForestConfig::new`] and [`ForestConfig::fit`].
pub fn build_forest<E>(
    examples: &[E],
    n_trees: usize,
    sample_size: usize,
) -> Result<RandomForest, Id3Error>
where
    E: Borrow<Example> + Sync,
{
    Ok(ForestConfig::new(n_trees, sample_size)?
        .fit(examples)?
        .into_forest())
}

/// Draw `draw_count` indices with replacement and return them with the out-of-bag indices.
fn bootstrap_sample(
    n_examples: usize,
    draw_count: usize,
    rng: &mut impl Rng,
) -> (Vec<usize>, Vec<usize>) {
    let mut in_bag = vec![false; n_examples];
    let mut bootstrap_indices = Vec::with_capacity(draw_count);
    for _ in 0..draw_count {
        let idx = rng.gen_range(0..n_examples);
        bootstrap_indices.push(idx);
        in_bag[idx] = true;
    }
    let oob_indices: Vec<usize> = (0..n_examples).filter(|&i| !in_bag[i]).collect();
    (bootstrap_indices, oob_indices)
}

/// Train the forest ensemble.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_examples = examples.len()))]
pub(crate) fn train<E>(config: &ForestConfig, examples: &[E]) -> Result<ForestResult, Id3Error>
where
    E: Borrow<Example> + Sync,
{
    // --- Validate inputs ---
    let first = examples.first().ok_or(Id3Error::EmptyDataset)?;
    if let Some(example_index) = examples
        .iter()
        .position(|e| <E as Borrow<Example>>::borrow(e).class().is_none())
    {
        return Err(Id3Error::MissingClass { example_index });
    }
    if let Some(d) = config.max_depth
        && d == 0
    {
        return Err(Id3Error::InvalidMaxDepth { max_depth: 0 });
    }

    let n_examples = examples.len();
    let attributes = AttributeList::from_example(<E as Borrow<Example>>::borrow(first));

    info!(
        n_trees = config.n_trees,
        n_examples,
        n_attributes = attributes.len(),
        sample_size = config.sample_size,
        "training forest"
    );

    // Generate per-tree seeds from master RNG.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    let tree_config = Id3Config::new()
        .with_max_depth(config.max_depth)
        .with_default_value(config.default_value.clone());
    let sample_size = config.sample_size;

    // Parallel tree training; collect keeps seed order.
    let tree_results: Vec<(DecisionTree, Vec<usize>)> = tree_seeds
        .into_par_iter()
        .map(|seed| -> Result<(DecisionTree, Vec<usize>), Id3Error> {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (bootstrap_indices, oob_indices) =
                bootstrap_sample(n_examples, sample_size, &mut rng);

            let sample: Vec<&Example> = bootstrap_indices
                .iter()
                .map(|&i| <E as Borrow<Example>>::borrow(&examples[i]))
                .collect();
            let tree = tree_config.fit_with_attributes(&sample, &attributes)?;
            Ok((tree, oob_indices))
        })
        .collect::<Result<_, Id3Error>>()?;

    let mut trees = Vec::with_capacity(config.n_trees);
    let mut oob_indices_per_tree = Vec::with_capacity(config.n_trees);
    for (tree, oob) in tree_results {
        trees.push(tree);
        oob_indices_per_tree.push(oob);
    }

    debug!(n_trees_trained = trees.len(), "tree training complete");

    let oob_score = if config.oob_mode == OobMode::Enabled {
        Some(compute_oob(&trees, examples, &oob_indices_per_tree)?)
    } else {
        None
    };

    let forest = RandomForest {
        trees,
        attributes,
    };

    let metadata = TrainingMetadata {
        n_trees: config.n_trees,
        n_examples,
        n_attributes: forest.attributes.len(),
        sample_size,
    };

    info!(
        oob_accuracy = oob_score.as_ref().map(|s| s.accuracy),
        "forest training complete"
    );

    Ok(ForestResult::new(forest, oob_score, oob_indices_per_tree, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ex(pairs: &[(&str, &str)]) -> Example {
        pairs.iter().copied().collect()
    }

    /// Three-class data decided by `shape`; `color` is noise.
    fn make_separable_data() -> Vec<Example> {
        let shapes = [("round", "apple"), ("long", "banana"), ("tiny", "grape")];
        let colors = ["red", "green", "yellow", "purple"];
        let mut examples = Vec::new();
        for i in 0..36 {
            let (shape, class) = shapes[i % 3];
            let color = colors[i % 4];
            examples.push(ex(&[("color", color), ("shape", shape), ("Class", class)]));
        }
        examples
    }

    #[test]
    fn bootstrap_draws_requested_count_with_replacement() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (bag, oob) = bootstrap_sample(5, 50, &mut rng);
        assert_eq!(bag.len(), 50);
        assert!(bag.iter().all(|&i| i < 5));
        assert!(oob.iter().all(|i| !bag.contains(i)));
    }

    #[test]
    fn oob_indices_are_complement_of_bag() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let (bag, oob) = bootstrap_sample(20, 10, &mut rng);
        for i in 0..20 {
            assert_ne!(bag.contains(&i), oob.contains(&i), "index {i}");
        }
    }

    #[test]
    fn forest_has_requested_tree_count() {
        let forest = build_forest(&make_separable_data(), 7, 20).unwrap();
        assert_eq!(forest.n_trees(), 7);
        assert_eq!(
            forest.attributes().as_slice(),
            &["color".to_string(), "shape".to_string()]
        );
    }

    #[test]
    fn three_class_separable_accuracy() {
        let examples = make_separable_data();
        let forest = build_forest(&examples, 25, 36).unwrap();
        let accuracy = forest.accuracy(&examples);
        assert!(accuracy > 0.9, "accuracy = {accuracy}");
    }

    #[test]
    fn single_tree_forest_matches_its_tree() {
        let examples = make_separable_data();
        let forest = build_forest(&examples, 1, 12).unwrap();
        let tree = &forest.trees()[0];
        let probes = [
            ex(&[("color", "red"), ("shape", "round")]),
            ex(&[("color", "blue"), ("shape", "long")]),
            ex(&[("shape", "square")]),
            Example::new(),
        ];
        for probe in probes.iter().chain(examples.iter()) {
            assert_eq!(forest.predict(probe), tree.classify(probe));
        }
    }

    #[test]
    fn deterministic_with_same_seed() {
        let examples = make_separable_data();
        let fit = |seed| {
            ForestConfig::new(10, 15)
                .unwrap()
                .with_seed(seed)
                .fit(&examples)
                .unwrap()
                .into_forest()
        };
        assert_eq!(fit(99), fit(99));
    }

    #[test]
    fn trees_see_independent_samples() {
        let examples = make_separable_data();
        let forest = build_forest(&examples, 10, 4).unwrap();
        let distinct = forest
            .trees()
            .iter()
            .filter(|t| **t != forest.trees()[0])
            .count();
        assert!(distinct > 0);
    }

    #[test]
    fn predict_batch_matches_individual() {
        let examples = make_separable_data();
        let forest = build_forest(&examples, 5, 20).unwrap();
        let batch = forest.predict_batch(&examples);
        for (i, example) in examples.iter().enumerate() {
            assert_eq!(batch[i], forest.predict(example));
        }
    }

    #[test]
    fn predict_batch_accepts_borrowed_examples() {
        let examples = make_separable_data();
        let forest = build_forest(&examples, 5, 20).unwrap();
        let borrowed: Vec<&Example> = examples.iter().rev().collect();
        let batch = forest.predict_batch(&borrowed);
        assert_eq!(batch.len(), examples.len());
        for (prediction, example) in batch.iter().zip(&borrowed) {
            assert_eq!(*prediction, forest.predict(example));
        }
    }

    #[test]
    fn oob_score_computed() {
        let examples = make_separable_data();
        let result = ForestConfig::new(30, 36)
            .unwrap()
            .with_oob_mode(OobMode::Enabled)
            .fit(&examples)
            .unwrap();
        let oob = result.oob_score().expect("OOB should be computed");
        assert!(oob.n_oob_samples > 0);
        assert!(oob.accuracy > 0.8, "oob accuracy = {}", oob.accuracy);

        let per_tree = result.oob_indices_per_tree();
        assert_eq!(per_tree.len(), 30);
        assert!(per_tree.iter().flatten().all(|&i| i < examples.len()));
        let n_covered = (0..examples.len())
            .filter(|i| per_tree.iter().any(|oob| oob.contains(i)))
            .count();
        assert_eq!(n_covered, oob.n_oob_samples);
    }

    #[test]
    fn empty_dataset_error() {
        let none: Vec<Example> = vec![];
        let err = build_forest(&none, 3, 3).unwrap_err();
        assert!(matches!(err, Id3Error::EmptyDataset));
    }

    #[test]
    fn missing_class_error() {
        let examples = vec![ex(&[("a", "1"), ("Class", "x")]), ex(&[("a", "2")])];
        let err = build_forest(&examples, 3, 3).unwrap_err();
        assert!(matches!(err, Id3Error::MissingClass { example_index: 1 }));
    }
}
