//! Out-of-bag (OOB) evaluation for the bootstrap forest.

use std::borrow::Borrow;

use crate::error::Id3Error;
use crate::example::Example;
use crate::predict::VoteTally;
use crate::tree::DecisionTree;

/// Out-of-bag evaluation result.
#[derive(Debug, Clone)]
pub struct OobScore {
    /// OOB accuracy (fraction of correctly predicted OOB examples).
    pub accuracy: f64,
    /// Number of examples left out of at least one bootstrap sample.
    pub n_oob_samples: usize,
}

/// Compute out-of-bag predictions and accuracy.
///
/// Each example is predicted by majority vote of only the trees whose
/// bootstrap sample did not contain it. Examples with no OOB tree are skipped.
pub(crate) fn compute_oob<E: Borrow<Example>>(
    trees: &[DecisionTree],
    examples: &[E],
    oob_indices_per_tree: &[Vec<usize>],
) -> Result<OobScore, Id3Error> {
    let mut oob_votes: Vec<VoteTally<'_>> = vec![VoteTally::new(); examples.len()];

    for (tree, oob_indices) in trees.iter().zip(oob_indices_per_tree) {
        for &example_idx in oob_indices {
            let example: &Example = examples[example_idx].borrow();
            oob_votes[example_idx].add(tree.classify(example));
        }
    }

    let mut n_oob_samples = 0usize;
    let mut correct = 0usize;
    for (votes, example) in oob_votes.iter().zip(examples) {
        let Some(predicted) = votes.winner() else {
            continue;
        };
        n_oob_samples += 1;
        let example: &Example = example.borrow();
        if example.class() == Some(predicted) {
            correct += 1;
        }
    }

    if n_oob_samples == 0 {
        return Err(Id3Error::OobEvaluationFailed {
            reason: "no example has any OOB tree".to_string(),
        });
    }

    Ok(OobScore {
        accuracy: correct as f64 / n_oob_samples as f64,
        n_oob_samples,
    })
}
