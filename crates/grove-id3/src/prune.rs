//! Reduced-error pruning against a held-out validation set.

use std::borrow::Borrow;

use tracing::{debug, instrument, trace};

use crate::example::Example;
use crate::node::{Branch, Node, NodeIndex};
use crate::tree::DecisionTree;

impl DecisionTree {
    /// Prune the tree in place using `validation` as the accuracy oracle.
    ///
    /// Visits split nodes bottom-up. Each one is trial-collapsed into a leaf
    /// carrying its majority label, and the collapse is kept unless whole-tree
    /// validation accuracy drops. Equal accuracy keeps the smaller tree, so
    /// validation accuracy never decreases. Subtrees removed by kept collapses
    /// are dropped from the arena before returning.
    ///
    /// Every trial re-scores the full validation set from the root, costing
    /// `O(|validation| × depth)` per split node.
    #[instrument(skip_all, fields(n_nodes = self.n_nodes(), n_validation = validation.len()))]
    pub fn prune<E: Borrow<Example>>(&mut self, validation: &[E]) {
        let n_nodes_before = self.n_nodes();
        let n_collapsed = self.prune_node(NodeIndex::new(0), validation);
        self.compact();
        debug!(
            n_nodes_before,
            n_nodes_after = self.n_nodes(),
            n_collapsed,
            "pruning complete"
        );
    }

    /// Post-order walk. Returns how many collapses were kept at or below `idx`.
    fn prune_node<E: Borrow<Example>>(&mut self, idx: NodeIndex, validation: &[E]) -> usize {
        let children: Vec<NodeIndex> = self.nodes[idx.index()]
            .branches()
            .iter()
            .map(|branch| branch.child)
            .collect();
        if children.is_empty() {
            return 0;
        }

        let mut n_collapsed = 0;
        for child in children {
            n_collapsed += self.prune_node(child, validation);
        }

        let original_accuracy = self.accuracy(validation);

        // The snapshot owns the split (feature and branches); descendants stay
        // in the arena untouched, so restoring it is exact.
        let leaf = self.nodes[idx.index()].to_leaf();
        let snapshot = std::mem::replace(&mut self.nodes[idx.index()], leaf);

        let pruned_accuracy = self.accuracy(validation);

        if pruned_accuracy < original_accuracy {
            self.nodes[idx.index()] = snapshot;
            n_collapsed
        } else {
            trace!(
                node = %idx,
                original_accuracy,
                pruned_accuracy,
                "collapsed subtree"
            );
            n_collapsed + 1
        }
    }

    /// Rebuild the arena with only the nodes reachable from the root, in preorder.
    fn compact(&mut self) {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        self.copy_reachable(NodeIndex::new(0), &mut nodes);
        self.nodes = nodes;
    }

    fn copy_reachable(&self, idx: NodeIndex, out: &mut Vec<Node>) -> NodeIndex {
        let new_idx = NodeIndex::new(out.len());
        match &self.nodes[idx.index()] {
            leaf @ Node::Leaf { .. } => out.push(leaf.clone()),
            Node::Split {
                feature,
                label,
                branches,
            } => {
                out.push(Node::Leaf {
                    label: label.clone(),
                });
                let branches = branches
                    .iter()
                    .map(|branch| Branch {
                        value: branch.value.clone(),
                        child: self.copy_reachable(branch.child, out),
                    })
                    .collect();
                out[new_idx.index()] = Node::Split {
                    feature: feature.clone(),
                    label: label.clone(),
                    branches,
                };
            }
        }
        new_idx
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::tree::build_tree;

    fn ex(pairs: &[(&str, &str)]) -> Example {
        pairs.iter().copied().collect()
    }

    /// Root splits on A (useful); the A=p branch splits on B (noise).
    fn noisy_training() -> Vec<Example> {
        vec![
            ex(&[("A", "p"), ("B", "1"), ("Class", "n")]),
            ex(&[("A", "p"), ("B", "2"), ("Class", "y")]),
            ex(&[("A", "p"), ("B", "1"), ("Class", "n")]),
            ex(&[("A", "q"), ("B", "1"), ("Class", "y")]),
            ex(&[("A", "q"), ("B", "2"), ("Class", "y")]),
            ex(&[("A", "q"), ("B", "1"), ("Class", "y")]),
        ]
    }

    fn validation() -> Vec<Example> {
        vec![
            ex(&[("A", "p"), ("B", "1"), ("Class", "n")]),
            ex(&[("A", "p"), ("B", "2"), ("Class", "n")]),
            ex(&[("A", "q"), ("B", "1"), ("Class", "y")]),
            ex(&[("A", "q"), ("B", "2"), ("Class", "y")]),
        ]
    }

    #[test]
    fn harmful_split_collapses_and_useful_split_stays() {
        let mut tree = build_tree(&noisy_training(), None).unwrap();
        assert_eq!(tree.n_nodes(), 5);
        let p = tree.node(tree.root().child("p").unwrap()).unwrap();
        assert_eq!(p.feature(), Some("B"));

        tree.prune(&validation());

        assert_eq!(tree.root().feature(), Some("A"));
        assert_eq!(tree.n_nodes(), 3);
        let p = tree.node(tree.root().child("p").unwrap()).unwrap();
        assert!(p.is_leaf());
        assert_eq!(p.label(), "n");
        assert!((tree.accuracy(&validation()) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ties_favour_the_pruned_tree() {
        let mut tree = build_tree(&noisy_training(), None).unwrap();
        let none: Vec<Example> = vec![];
        tree.prune(&none);
        assert_eq!(tree.n_nodes(), 1);
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().label(), "y");
    }

    #[test]
    fn leaf_tree_is_untouched() {
        let examples = vec![ex(&[("A", "x"), ("Class", "yes")])];
        let mut tree = build_tree(&examples, None).unwrap();
        let before = tree.clone();
        tree.prune(&validation());
        assert_eq!(tree, before);
    }

    #[test]
    fn split_that_helps_everywhere_is_kept() {
        let examples = noisy_training();
        let mut tree = build_tree(&examples, None).unwrap();
        let before = tree.clone();
        tree.prune(&examples);
        assert_eq!(tree, before);
    }

    #[test]
    fn compaction_leaves_only_reachable_nodes() {
        let mut tree = build_tree(&noisy_training(), None).unwrap();
        tree.prune(&validation());
        let mut reachable = 0;
        let mut stack = vec![NodeIndex::new(0)];
        while let Some(idx) = stack.pop() {
            reachable += 1;
            let node = tree.node(idx).expect("branch points inside the arena");
            stack.extend(node.branches().iter().map(|b| b.child));
        }
        assert_eq!(reachable, tree.n_nodes());
    }

    #[test]
    fn pruning_never_lowers_validation_accuracy() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut draw = |n: usize| -> Vec<Example> {
            (0..n)
                .map(|_| {
                    let a: u8 = rng.gen_range(0..3);
                    let b: u8 = rng.gen_range(0..3);
                    let c: u8 = rng.gen_range(0..2);
                    let noisy = rng.gen_bool(0.2);
                    let class = if (a == 0) ^ noisy { "pos" } else { "neg" };
                    let (a, b, c) = (a.to_string(), b.to_string(), c.to_string());
                    ex(&[("a", a.as_str()), ("b", b.as_str()), ("c", c.as_str()), ("Class", class)])
                })
                .collect()
        };

        for _ in 0..10 {
            let train = draw(60);
            let valid = draw(30);
            let mut tree = build_tree(&train, None).unwrap();
            let before = tree.accuracy(&valid);
            let n_before = tree.n_nodes();
            tree.prune(&valid);
            assert!(tree.accuracy(&valid) >= before);
            assert!(tree.n_nodes() <= n_before);
        }
    }
}
