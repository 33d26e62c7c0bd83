use std::fmt;

/// Index into a `Vec<Node>` arena, identifying a specific node in a decision tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Create a new node index from a zero-based arena position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An outgoing edge of a split node: attribute value to child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Attribute value observed during training.
    pub value: String,
    /// Node reached by examples carrying `value`.
    pub child: NodeIndex,
}

/// A node in a decision tree arena.
///
/// Leaf-ness is structural: a node is a leaf exactly when it is the `Leaf`
/// variant, and every `Split` carries at least one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An interior node testing one attribute.
    Split {
        /// Attribute this node tests.
        feature: String,
        /// Majority class of the training examples that reached this node.
        label: String,
        /// Children keyed by attribute value, in first-observed order.
        branches: Vec<Branch>,
    },
    /// A terminal node.
    Leaf {
        /// Class predicted for every example ending here.
        label: String,
    },
}

impl Node {
    /// Return the majority label recorded at construction time.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Node::Split { label, .. } | Node::Leaf { label } => label,
        }
    }

    /// Return the attribute tested here, or `None` for a leaf.
    #[must_use]
    pub fn feature(&self) -> Option<&str> {
        match self {
            Node::Split { feature, .. } => Some(feature),
            Node::Leaf { .. } => None,
        }
    }

    /// Return the outgoing branches; empty for a leaf.
    #[must_use]
    pub fn branches(&self) -> &[Branch] {
        match self {
            Node::Split { branches, .. } => branches,
            Node::Leaf { .. } => &[],
        }
    }

    /// Return the child reached by `value`, if that value was seen in training.
    #[must_use]
    pub fn child(&self, value: &str) -> Option<NodeIndex> {
        self.branches()
            .iter()
            .find(|branch| branch.value == value)
            .map(|branch| branch.child)
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Return a leaf carrying this node's label.
    pub(crate) fn to_leaf(&self) -> Node {
        Node::Leaf {
            label: self.label().to_string(),
        }
    }
}
