use std::borrow::Borrow;
use std::fmt;

use tracing::{debug, instrument};

use crate::{
    Id3Error,
    example::{AttributeList, Example},
    metric::{ClassCounts, information_gain, partition},
    node::{Branch, Node, NodeIndex},
};

/// Configuration for a single ID3 decision tree.
///
/// Construct via [`Id3Config::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter       | Default            |
/// |-----------------|--------------------|
/// | `max_depth`     | `None` (unlimited) |
/// | `default_value` | `None`             |
#[derive(Debug, Clone, Default)]
pub struct Id3Config {
    pub(crate) max_depth: Option<usize>,
    pub(crate) default_value: Option<String>,
}

impl Id3Config {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum tree depth.
    ///
    /// `None` grows until every path is pure or out of informative
    /// attributes. `Some(d)` stops splitting at depth `d` (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Record a default value for missing attributes.
    ///
    /// The value is carried on the fitted tree for callers that want it; induction
    /// and classification never substitute it.
    #[must_use]
    pub fn with_default_value(mut self, default_value: Option<String>) -> Self {
        self.default_value = default_value;
        self
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

    /// Train a tree, splitting on every attribute of the first example except `Class`.
    ///
    /// # Errors
    ///
    /// See [`Id3Config::fit_with_attributes`].
    pub fn fit<E: Borrow<Example>>(&self, examples: &[E]) -> Result<DecisionTree, Id3Error> {
        let first = examples.first().ok_or(Id3Error::EmptyDataset)?;
        let attributes = AttributeList::from_example(<E as Borrow<Example>>::borrow(first));
        self.fit_with_attributes(examples, &attributes)
    }

    /// Train a tree that may only split on `attributes`, tried in list order.
    ///
    /// # Errors
    ///
    /// | Variant                         | When                                  |
    /// |---------------------------------|---------------------------------------|
    /// | [`Id3Error::EmptyDataset`]      | `examples` is empty                   |
    /// | [`Id3Error::MissingClass`]      | an example has no `Class` value       |
    /// | [`Id3Error::InvalidMaxDepth`]   | `max_depth` is `Some(0)`              |
    #[instrument(
        skip(self, examples, attributes),
        fields(n_examples = examples.len(), n_attributes = attributes.len())
    )]
    pub fn fit_with_attributes<E: Borrow<Example>>(
        &self,
        examples: &[E],
        attributes: &AttributeList,
    ) -> Result<DecisionTree, Id3Error> {
        if examples.is_empty() {
            return Err(Id3Error::EmptyDataset);
        }
        if let Some(example_index) = examples
            .iter()
            .position(|e| <E as Borrow<Example>>::borrow(e).class().is_none())
        {
            return Err(Id3Error::MissingClass { example_index });
        }
        if let Some(d) = self.max_depth
            && d == 0
        {
            return Err(Id3Error::InvalidMaxDepth { max_depth: 0 });
        }

        let refs: Vec<&Example> = examples.iter().map(<E as Borrow<Example>>::borrow).collect();
        let mut arena: Vec<Node> = Vec::new();
        let root = build_node(&refs, attributes, self.max_depth, 0, &mut arena);

        let tree = DecisionTree {
            nodes: arena,
            attributes: attributes.clone(),
            default_value: self.default_value.clone(),
        };
        debug!(
            root_index = root.index(),
            n_nodes = tree.n_nodes(),
            depth = tree.depth(),
            "decision tree built"
        );
        Ok(tree)
    }
}

/// Train a tree on `examples`, deriving the attribute list from the first example.
///
/// `default_value` is recorded on the tree but has no effect on induction.
///
/// # Errors
///
/// See [`Id3Config::fit_with_attributes`].
pub fn build_tree<E: Borrow<Example>>(
    examples: &[E],
    default_value: Option<&str>,
) -> Result<DecisionTree, Id3Error> {
    Id3Config::new()
        .with_default_value(default_value.map(String::from))
        .fit(examples)
}

fn push_node(arena: &mut Vec<Node>, node: Node) -> NodeIndex {
    let idx = arena.len();
    arena.push(node);
    NodeIndex::new(idx)
}

/// Recursively induce the subtree for `examples`.
///
/// Returns the [`NodeIndex`] of the node just created in `arena`.
fn build_node(
    examples: &[&Example],
    attributes: &AttributeList,
    max_depth: Option<usize>,
    depth: usize,
    arena: &mut Vec<Node>,
) -> NodeIndex {
    let class_counts = ClassCounts::from_examples(examples);
    let label = class_counts.majority().unwrap_or_default().to_string();

    if class_counts.n_classes() <= 1 || max_depth.is_some_and(|max_d| depth >= max_d) {
        return push_node(arena, Node::Leaf { label });
    }

    // Strict improvement over 0: a zero-gain attribute is never chosen and the
    // earliest of several equal gains wins.
    let mut best_gain = 0.0f64;
    let mut best: Option<&str> = None;
    for attribute in attributes.iter() {
        let gain = information_gain(examples, attribute, &class_counts);
        if gain > best_gain {
            best_gain = gain;
            best = Some(attribute);
        }
    }

    let Some(feature) = best else {
        return push_node(arena, Node::Leaf { label });
    };
    let remaining = attributes.without(feature);

    // Arena pattern: reserve index, recurse, then overwrite with the split.
    let node_idx = push_node(arena, Node::Leaf { label: label.clone() });

    let mut branches = Vec::new();
    for (value, subset) in partition(examples, feature) {
        let child = if subset.is_empty() || attributes.is_empty() {
            push_node(arena, Node::Leaf { label: label.clone() })
        } else {
            build_node(&subset, &remaining, max_depth, depth + 1, arena)
        };
        branches.push(Branch {
            value: value.to_string(),
            child,
        });
    }

    arena[node_idx.index()] = Node::Split {
        feature: feature.to_string(),
        label,
        branches,
    };
    node_idx
}

/// A fitted ID3 decision tree.
///
/// Stored as an arena-based `Vec<Node>` rooted at index 0. Cloning a tree is
/// a full structural copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) attributes: AttributeList,
    pub(crate) default_value: Option<String>,
}

impl DecisionTree {
    /// Return the root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Return the node at `idx`, if it exists.
    #[must_use]
    pub fn node(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx.index())
    }

    /// Return the attribute list the tree was trained with.
    #[must_use]
    pub fn attributes(&self) -> &AttributeList {
        &self.attributes
    }

    /// Return the default value recorded at training time.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((NodeIndex::new(0), 0usize));

        while let Some((idx, d)) = queue.pop_front() {
            max_depth = max_depth.max(d);
            for branch in self.nodes[idx.index()].branches() {
                queue.push_back((branch.child, d + 1));
            }
        }

        max_depth
    }

    fn write_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        idx: NodeIndex,
        value: Option<&str>,
        level: usize,
    ) -> fmt::Result {
        let node = &self.nodes[idx.index()];
        write!(f, "{:indent$}", "", indent = level * 2)?;
        if let Some(value) = value {
            write!(f, "{value}: ")?;
        }
        match node.feature() {
            Some(feature) => writeln!(f, "{feature},{}", node.label())?,
            None => writeln!(f, "{}", node.label())?,
        }
        for branch in node.branches() {
            self.write_node(f, branch.child, Some(&branch.value), level + 1)?;
        }
        Ok(())
    }
}

/// Indented outline: `feature,label` for splits, the label alone for
/// leaves, each child prefixed by the attribute value leading to it.
impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, NodeIndex::new(0), None, 0)
    }
}
