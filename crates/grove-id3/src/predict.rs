//! Classification and accuracy for single trees and the forest ensemble.

use std::borrow::Borrow;

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::example::Example;
use crate::forest::RandomForest;
use crate::node::NodeIndex;
use crate::tree::DecisionTree;

/// Fraction of `examples` whose `Class` equals `predict(example)`.
///
/// Returns 0.0 for an empty slice. Examples without a `Class` count as misses.
pub(crate) fn accuracy_with<'a, E, F>(examples: &[E], mut predict: F) -> f64
where
    E: Borrow<Example>,
    F: FnMut(&Example) -> &'a str,
{
    if examples.is_empty() {
        return 0.0;
    }
    let mut correct = 0usize;
    for example in examples {
        let example: &Example = example.borrow();
        if example.class() == Some(predict(example)) {
            correct += 1;
        }
    }
    correct as f64 / examples.len() as f64
}

/// Running majority vote over class labels.
///
/// The winner only changes when a label's count becomes strictly greater than
/// the current winner's, so among tied labels the first to reach the maximum
/// count wins.
#[derive(Debug, Clone, Default)]
pub struct VoteTally<'a> {
    counts: Vec<(&'a str, usize)>,
    winner: Option<(&'a str, usize)>,
}

impl<'a> VoteTally<'a> {
    /// Create an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one vote for `label`.
    pub fn add(&mut self, label: &'a str) {
        let count = match self.counts.iter_mut().find(|(l, _)| *l == label) {
            Some(slot) => {
                slot.1 += 1;
                slot.1
            }
            None => {
                self.counts.push((label, 1));
                1
            }
        };
        if self.winner.is_none_or(|(_, best)| count > best) {
            self.winner = Some((label, count));
        }
    }

    /// Return the current winning label, or `None` before the first vote.
    #[must_use]
    pub fn winner(&self) -> Option<&'a str> {
        self.winner.map(|(label, _)| label)
    }

    /// Return the number of votes cast for `label`.
    #[must_use]
    pub fn count(&self, label: &str) -> usize {
        self.counts
            .iter()
            .find(|(l, _)| *l == label)
            .map_or(0, |(_, c)| *c)
    }

    /// Return the total number of votes cast.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }
}

impl DecisionTree {
    /// Classify a single example.
    ///
    /// Descends from the root while the current node has children. If the
    /// example lacks the node's attribute, or carries a value no training
    /// example had at that node, the current node's label is returned.
    #[must_use]
    pub fn classify(&self, example: &Example) -> &str {
        let mut idx = NodeIndex::new(0);
        loop {
            let node = &self.nodes[idx.index()];
            let next = node
                .feature()
                .and_then(|feature| example.get(feature))
                .and_then(|value| node.child(value));
            match next {
                Some(child) => idx = child,
                None => return node.label(),
            }
        }
    }

    /// Fraction of `examples` classified as their `Class` value.
    ///
    /// Returns 0.0 when `examples` is empty.
    #[must_use]
    pub fn accuracy<E: Borrow<Example>>(&self, examples: &[E]) -> f64 {
        accuracy_with(examples, |example| self.classify(example))
    }
}

impl RandomForest {
    /// Predict the class of a single example by majority vote.
    ///
    /// Trees vote in forest order; ties go to the label that first reached
    /// the winning count.
    #[must_use]
    pub fn predict(&self, example: &Example) -> &str {
        self.votes(example).winner().unwrap_or_default()
    }

    /// Return the full vote tally for a single example.
    #[must_use]
    pub fn votes(&self, example: &Example) -> VoteTally<'_> {
        let mut tally = VoteTally::new();
        for tree in &self.trees {
            tally.add(tree.classify(example));
        }
        tally
    }

    /// Predict classes for a batch of examples in parallel.
    #[must_use]
    pub fn predict_batch<E>(&self, examples: &[E]) -> Vec<&str>
    where
        E: Borrow<Example> + Sync,
    {
        examples
            .into_par_iter()
            .map(|example| self.predict(<E as Borrow<Example>>::borrow(example)))
            .collect()
    }

    /// Fraction of `examples` predicted as their `Class` value.
    ///
    /// Returns 0.0 when `examples` is empty.
    #[must_use]
    pub fn accuracy<E: Borrow<Example>>(&self, examples: &[E]) -> f64 {
        accuracy_with(examples, |example| self.predict(example))
    }
}
