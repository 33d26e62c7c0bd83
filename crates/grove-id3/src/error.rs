/// Errors from tree induction, forest training and experiment setup.
///
/// Classification, accuracy and pruning never fail: unseen values and missing
/// attributes fall back to the deepest reachable label instead.
#[derive(Debug, thiserror::Error)]
pub enum Id3Error {
    /// Returned when the training set has zero examples.
    #[error("training dataset has zero examples")]
    EmptyDataset,

    /// Returned when an example has no value for the reserved `Class` key.
    #[error("example {example_index} has no `Class` value")]
    MissingClass {
        /// The zero-based index of the offending example.
        example_index: usize,
    },

    /// Returned when an attribute list names the reserved `Class` key.
    #[error("attribute list must not contain the reserved name `{name}`")]
    ReservedAttribute {
        /// The reserved name that was supplied.
        name: String,
    },

    /// Returned when an attribute list names the same attribute twice.
    #[error("attribute `{name}` appears more than once in the attribute list")]
    DuplicateAttribute {
        /// The duplicated attribute name.
        name: String,
    },

    /// Returned when max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid max_depth value provided.
        max_depth: usize,
    },

    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when the bootstrap sample size is zero.
    #[error("sample_size must be at least 1, got {sample_size}")]
    InvalidSampleSize {
        /// The invalid sample_size value provided.
        sample_size: usize,
    },

    /// Returned when OOB evaluation fails (every example landed in every bag).
    #[error("OOB evaluation failed: {reason}")]
    OobEvaluationFailed {
        /// Human-readable description of why OOB evaluation failed.
        reason: String,
    },

    /// Returned when a learning-curve run requests zero repetitions.
    #[error("repetitions must be at least 1, got {repetitions}")]
    InvalidRepetitions {
        /// The invalid repetition count.
        repetitions: usize,
    },

    /// Returned when a holdout split asks for more examples than exist.
    #[error("cannot take {requested} training/validation examples from {available}")]
    SplitTooLarge {
        /// Number of examples the split needs.
        requested: usize,
        /// Number of examples available.
        available: usize,
    },
}
