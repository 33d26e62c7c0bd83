//! ID3 decision trees over categorical data: induce, classify, prune, bag.
//!
//! Examples are insertion-ordered attribute → value records with the label
//! stored under the reserved [`CLASS_KEY`]. Trees are grown by information
//! gain, can be simplified with reduced-error pruning against a validation
//! set, and can be combined into a bootstrap forest trained in parallel via
//! rayon with optional out-of-bag evaluation.

mod config;
mod error;
mod eval;
mod example;
mod forest;
mod metric;
mod node;
mod oob;
mod predict;
mod prune;
mod result;
mod tree;

pub use config::{ForestConfig, OobMode};
pub use error::Id3Error;
pub use eval::{CurvePoint, HoldoutSplit, PruningCurve, holdout_split};
pub use example::{AttributeList, CLASS_KEY, Example, MISSING_VALUE};
pub use forest::{RandomForest, build_forest};
pub use metric::{ClassCounts, GAIN_TOLERANCE, entropy, information_gain};
pub use node::{Branch, Node, NodeIndex};
pub use oob::OobScore;
pub use predict::VoteTally;
pub use result::{ForestResult, TrainingMetadata};
pub use tree::{DecisionTree, Id3Config, build_tree};
