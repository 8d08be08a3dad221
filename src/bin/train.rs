use backprop::data::{self, DataSet, DataSets};
use backprop::feed_forward::{Hyperparameters, Network, Policy};
use backprop::trainer::{Logging, StopCondition, Trainer};

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PolicyArg {
    Naive,
    Trick,
}

impl From<PolicyArg> for Policy {
    fn from(arg: PolicyArg) -> Policy {
        match arg {
            PolicyArg::Naive => Policy::Naive,
            PolicyArg::Trick => Policy::Trick,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "train")]
#[command(about = "Train a multi-layer perceptron with gradient descent")]
struct Args {
    /// Initialization and update policy
    #[arg(long, value_enum, default_value = "trick")]
    policy: PolicyArg,

    /// Hidden layer sizes, comma separated
    #[arg(long, value_delimiter = ',', default_value = "3")]
    hidden: Vec<usize>,

    /// Learning rate
    #[arg(long, default_value = "0.1")]
    eta: f64,

    /// Momentum coefficient (trick policy only)
    #[arg(long, default_value = "0.0")]
    mu: f64,

    /// L1 regularization coefficient
    #[arg(long, default_value = "0.0")]
    l1: f64,

    /// L2 regularization coefficient
    #[arg(long, default_value = "0.0")]
    l2: f64,

    /// Number of update steps
    #[arg(long, default_value = "100")]
    iterations: usize,

    /// Log the training loss every this many steps (0 disables)
    #[arg(long, default_value = "10")]
    log_every: usize,

    /// Seed for weight initialization and synthetic data
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Directory holding the uncompressed MNIST IDX files. Synthetic
    /// Gaussian blobs are used when omitted.
    #[arg(long)]
    mnist: Option<PathBuf>,

    /// Restrict MNIST to two digits, e.g. `--binary 3,8`
    #[arg(long, value_delimiter = ',')]
    binary: Option<Vec<usize>>,
}

fn synthetic(seed: u64) -> Result<DataSets, backprop::Error> {
    let centers = vec![vec![1.5, 1.5, 1.5, 1.5], vec![-1.5, -1.5, -1.5, -1.5]];
    let mut rng = StdRng::seed_from_u64(seed);
    let (train, validation) =
        data::gaussian_blobs(&centers, 200, 0.75, &mut rng)?.split_every(data::VALIDATION_STRIDE)?;
    let test = data::gaussian_blobs(&centers, 100, 0.75, &mut rng)?;
    Ok(DataSets {
        train,
        validation,
        test,
    })
}

fn score(
    set_name: &str,
    network: &mut Network,
    data_set: &DataSet,
    classes: usize,
) -> Result<(), backprop::Error> {
    let evaluation = network.evaluate(data_set.images().clone(), data_set.one_hot(classes)?)?;
    println!(
        "{} set results: accuracy {:.4}, loss {:.4} over {} examples",
        set_name,
        evaluation.accuracy,
        evaluation.loss,
        data_set.size()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let (data_sets, classes) = match args.mnist {
        Some(ref dir) => {
            let full = data::read_data_sets(dir)?;
            match args.binary.as_deref() {
                Some(&[positive, negative]) => (full.binary(positive, negative), 2),
                Some(_) => return Err("--binary takes exactly two digits".into()),
                None => (full, 10),
            }
        }
        None => (synthetic(args.seed)?, 2),
    };

    let mut sizes = vec![data_sets.train.dim()];
    sizes.extend(args.hidden.iter().cloned().filter(|&size| size > 0));
    sizes.push(classes);

    let mut network = Network::new(args.policy.into(), &sizes, args.seed)?;
    network.initialize()?;

    let hyperparameters = Hyperparameters::new(args.eta)
        .momentum(args.mu)
        .l1(args.l1)
        .l2(args.l2);
    let report = Trainer::new(hyperparameters)
        .logging(Logging::Iterations(args.log_every))
        .stop_condition(StopCondition::Iterations(args.iterations))
        .train(
            &mut network,
            data_sets.train.images().clone(),
            data_sets.train.one_hot(classes)?,
        )?;

    println!(
        "Trained {:?} network {:?} for {} iterations",
        network.policy(),
        sizes,
        report.iterations
    );
    println!(
        "Training set results: accuracy {:.4}, loss {:.4} over {} examples",
        report.accuracy,
        report.loss,
        data_sets.train.size()
    );
    score("Validation", &mut network, &data_sets.validation, classes)?;
    score("Test", &mut network, &data_sets.test, classes)?;
    Ok(())
}
