use std::borrow::Borrow;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

use grove_id3::{
    DecisionTree, Example, ForestConfig, Id3Config, OobMode, PruningCurve, holdout_split,
};
use grove_io::ExampleReader;

#[derive(Parser)]
#[command(name = "grove")]
#[command(about = "ID3 decision trees with reduced-error pruning and bootstrap forests")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Shared dataset and induction parameters.
#[derive(Args, Debug, Clone)]
struct TreeArgs {
    /// Header column holding the class label
    #[arg(long, default_value = "Class")]
    class_column: String,

    /// Maximum tree depth (unlimited if not set)
    #[arg(long)]
    max_depth: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Build a tree, prune it on a validation file, and report accuracy before and after
    Evaluate {
        /// Path to the training CSV file
        #[arg(long)]
        train: PathBuf,

        /// Path to the validation CSV file used for pruning
        #[arg(long)]
        valid: PathBuf,

        /// Path to the test CSV file
        #[arg(long)]
        test: PathBuf,

        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Compare a bootstrap forest against a single tree on a shuffled 1/2, 1/4, 1/4 split
    Forest {
        /// Path to the input CSV file
        #[arg(long)]
        data: PathBuf,

        /// Number of trees in the forest
        #[arg(long, default_value_t = 20)]
        n_trees: usize,

        /// Examples drawn with replacement per tree
        #[arg(long, default_value_t = 30)]
        sample_size: usize,

        /// Compute out-of-bag accuracy on the training set
        #[arg(long, default_value_t = false)]
        oob: bool,

        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Learning curve of pruned trees against unpruned trees on train + validation
    Curve {
        /// Path to the input CSV file
        #[arg(long)]
        data: PathBuf,

        /// Smallest training size
        #[arg(long, default_value_t = 10)]
        min_size: usize,

        /// Largest training size
        #[arg(long, default_value_t = 300)]
        max_size: usize,

        /// Increment between training sizes
        #[arg(long, default_value_t = 10)]
        step: usize,

        /// Repetitions averaged per training size
        #[arg(long, default_value_t = 100)]
        repetitions: usize,

        /// Header column holding the class label
        #[arg(long, default_value = "Class")]
        class_column: String,
    },

    /// Print the outline of the tree induced from a CSV file
    Show {
        /// Path to the training CSV file
        #[arg(long)]
        data: PathBuf,

        /// Optional validation CSV file to prune against before printing
        #[arg(long)]
        valid: Option<PathBuf>,

        #[command(flatten)]
        tree: TreeArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct AccuracyOutput {
    train: f64,
    valid: f64,
    test: f64,
}

#[derive(Serialize)]
struct EvaluateOutput {
    n_train: usize,
    n_valid: usize,
    n_test: usize,
    n_nodes_before: usize,
    n_nodes_after: usize,
    before_pruning: AccuracyOutput,
    after_pruning: AccuracyOutput,
}

#[derive(Serialize)]
struct ForestOutput {
    n_examples: usize,
    n_trees: usize,
    sample_size: usize,
    oob_accuracy: Option<f64>,
    forest: AccuracyOutput,
    single_tree: AccuracyOutput,
}

#[derive(Serialize)]
struct CurveOutput {
    n_examples: usize,
    repetitions: usize,
    points: Vec<CurvePointOutput>,
}

#[derive(Serialize)]
struct CurvePointOutput {
    training_size: usize,
    pruned_accuracy: f64,
    unpruned_accuracy: f64,
}

fn read_examples(path: &Path, class_column: &str) -> Result<Vec<Example>> {
    let examples = ExampleReader::new(path)
        .with_class_column(class_column)
        .read()
        .with_context(|| format!("failed to read {}", path.display()))?;
    info!(path = %path.display(), n_examples = examples.len(), "dataset loaded");
    Ok(examples)
}

fn tree_accuracy<E, V, T>(
    tree: &DecisionTree,
    train: &[E],
    valid: &[V],
    test: &[T],
) -> AccuracyOutput
where
    E: Borrow<Example>,
    V: Borrow<Example>,
    T: Borrow<Example>,
{
    AccuracyOutput {
        train: tree.accuracy(train),
        valid: tree.accuracy(valid),
        test: tree.accuracy(test),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Evaluate {
            train,
            valid,
            test,
            tree: tree_args,
        } => {
            let train = read_examples(&train, &tree_args.class_column)?;
            let valid = read_examples(&valid, &tree_args.class_column)?;
            let test = read_examples(&test, &tree_args.class_column)?;

            let mut tree = Id3Config::new()
                .with_max_depth(tree_args.max_depth)
                .fit(&train)
                .context("tree induction failed")?;
            let before_pruning = tree_accuracy(&tree, &train, &valid, &test);
            let n_nodes_before = tree.n_nodes();

            tree.prune(&valid);
            let after_pruning = tree_accuracy(&tree, &train, &valid, &test);
            info!(
                n_nodes_before,
                n_nodes_after = tree.n_nodes(),
                "pruning complete"
            );

            let output = EvaluateOutput {
                n_train: train.len(),
                n_valid: valid.len(),
                n_test: test.len(),
                n_nodes_before,
                n_nodes_after: tree.n_nodes(),
                before_pruning,
                after_pruning,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Forest {
            data,
            n_trees,
            sample_size,
            oob,
            tree: tree_args,
        } => {
            let examples = read_examples(&data, &tree_args.class_column)?;

            // Shuffled 1/2, 1/4, 1/4 split.
            let n = examples.len();
            let n_train = n / 2;
            let n_valid = 3 * n / 4 - n_train;
            let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
            let split = holdout_split(&examples, n_train, n_valid, &mut rng)?;

            let oob_mode = if oob {
                OobMode::Enabled
            } else {
                OobMode::Disabled
            };
            let result = ForestConfig::new(n_trees, sample_size)?
                .with_max_depth(tree_args.max_depth)
                .with_seed(cli.seed)
                .with_oob_mode(oob_mode)
                .fit(&split.train)
                .context("forest training failed")?;
            let oob_accuracy = result.oob_score().map(|s| s.accuracy);
            let forest = result.into_forest();

            let single_tree = Id3Config::new()
                .with_max_depth(tree_args.max_depth)
                .fit(&split.train)
                .context("tree induction failed")?;

            let output = ForestOutput {
                n_examples: n,
                n_trees,
                sample_size,
                oob_accuracy,
                forest: AccuracyOutput {
                    train: forest.accuracy(&split.train),
                    valid: forest.accuracy(&split.validation),
                    test: forest.accuracy(&split.test),
                },
                single_tree: tree_accuracy(
                    &single_tree,
                    &split.train,
                    &split.validation,
                    &split.test,
                ),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Curve {
            data,
            min_size,
            max_size,
            step,
            repetitions,
            class_column,
        } => {
            if step == 0 {
                anyhow::bail!("--step must be at least 1");
            }
            let examples = read_examples(&data, &class_column)?;

            let sizes: Vec<usize> = (min_size..=max_size).step_by(step).collect();
            let points = PruningCurve::new(sizes, repetitions)?
                .with_seed(cli.seed)
                .run(&examples)
                .context("pruning curve failed")?;

            let output = CurveOutput {
                n_examples: examples.len(),
                repetitions,
                points: points
                    .into_iter()
                    .map(|p| CurvePointOutput {
                        training_size: p.training_size,
                        pruned_accuracy: p.pruned_accuracy,
                        unpruned_accuracy: p.unpruned_accuracy,
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Show {
            data,
            valid,
            tree: tree_args,
        } => {
            let examples = read_examples(&data, &tree_args.class_column)?;
            let mut tree = Id3Config::new()
                .with_max_depth(tree_args.max_depth)
                .fit(&examples)
                .context("tree induction failed")?;

            if let Some(valid) = valid {
                let valid = read_examples(&valid, &tree_args.class_column)?;
                tree.prune(&valid);
            }

            info!(
                n_nodes = tree.n_nodes(),
                n_leaves = tree.n_leaves(),
                depth = tree.depth(),
                "tree induced"
            );
            print!("{tree}");
        }
    }

    Ok(())
}
