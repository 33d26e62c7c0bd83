//! Entropy and information gain over categorical examples.

use std::borrow::Borrow;

use crate::example::Example;

/// Gains closer to zero than this are reported as exactly zero.
///
/// Splits that leave every group with the parent's class distribution would
/// otherwise leak rounding noise of order 1e-16 and look like improvements.
pub const GAIN_TOLERANCE: f64 = 1e-12;

/// Class label occurrence counts, in the order labels were first observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassCounts {
    counts: Vec<(String, usize)>,
}

impl ClassCounts {
    /// Create an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the `Class` value of every example.
    ///
    /// Examples without a `Class` value are not counted.
    #[must_use]
    pub fn from_examples<E: Borrow<Example>>(examples: &[E]) -> Self {
        let mut counts = Self::new();
        for example in examples {
            let example: &Example = example.borrow();
            if let Some(class) = example.class() {
                counts.add(class);
            }
        }
        counts
    }

    /// Record one occurrence of `class`.
    pub fn add(&mut self, class: &str) {
        match self.counts.iter_mut().find(|(label, _)| label == class) {
            Some(slot) => slot.1 += 1,
            None => self.counts.push((class.to_string(), 1)),
        }
    }

    /// Return the number of occurrences of `class`.
    #[must_use]
    pub fn get(&self, class: &str) -> usize {
        self.counts
            .iter()
            .find(|(label, _)| label == class)
            .map_or(0, |(_, count)| *count)
    }

    /// Return the most frequent class.
    ///
    /// Ties go to the class observed first. `None` when nothing was counted.
    #[must_use]
    pub fn majority(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (label, count) in &self.counts {
            if best.is_none_or(|(_, best_count)| *count > best_count) {
                best = Some((label, *count));
            }
        }
        best.map(|(label, _)| label)
    }

    /// Return the number of distinct classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.counts.len()
    }

    /// Return the total number of counted examples.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// Return `true` if nothing has been counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate `(class, count)` pairs in first-observed order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(label, count)| (label.as_str(), *count))
    }
}

/// Shannon entropy in bits: `-Σ(p_i · log2(p_i))`.
///
/// `p_i = count_i / n_examples`; classes with a zero count contribute nothing.
/// Returns 0.0 when `n_examples` is zero.
#[must_use]
pub fn entropy(n_examples: usize, class_counts: &ClassCounts) -> f64 {
    if n_examples == 0 {
        return 0.0;
    }
    let n = n_examples as f64;
    -class_counts
        .iter()
        .filter(|&(_, count)| count > 0)
        .map(|(_, count)| {
            let p = count as f64 / n;
            p * p.log2()
        })
        .sum::<f64>()
}

/// Reduction in entropy from splitting `examples` on `attribute`.
///
/// `class_counts` must be the tally of `examples`. Examples lacking the
/// attribute are grouped under [`MISSING_VALUE`](crate::MISSING_VALUE).
/// The result is never negative; values within [`GAIN_TOLERANCE`] of zero
/// are reported as 0.0.
#[must_use]
pub fn information_gain<E: Borrow<Example>>(
    examples: &[E],
    attribute: &str,
    class_counts: &ClassCounts,
) -> f64 {
    let n_examples = examples.len();
    if n_examples == 0 {
        return 0.0;
    }
    let parent_entropy = entropy(n_examples, class_counts);

    let n = n_examples as f64;
    let weighted_child_entropy: f64 = partition(examples, attribute)
        .iter()
        .map(|(_, subset)| {
            let subset_counts = ClassCounts::from_examples(subset);
            (subset.len() as f64 / n) * entropy(subset.len(), &subset_counts)
        })
        .sum();

    let gain = parent_entropy - weighted_child_entropy;
    if gain < GAIN_TOLERANCE { 0.0 } else { gain }
}

/// Group examples by their value of `attribute`, in first-observed value order.
pub(crate) fn partition<'a, E: Borrow<Example>>(
    examples: &'a [E],
    attribute: &str,
) -> Vec<(&'a str, Vec<&'a Example>)> {
    let mut groups: Vec<(&'a str, Vec<&'a Example>)> = Vec::new();
    for example in examples {
        let example: &'a Example = example.borrow();
        let value = example.value_or_missing(attribute);
        match groups.iter_mut().find(|(v, _)| *v == value) {
            Some((_, subset)) => subset.push(example),
            None => groups.push((value, vec![example])),
        }
    }
    groups
}
