use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use fmc_nn::dataset::{self, Dataset, FASHION_MNIST_CLASSES};
use fmc_nn::network::ModelMetadata;
use fmc_nn::{train_loop, Activation, LossFunction, Network, NetworkSpec, TrainConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Feed-forward classifier for Fashion-MNIST style CSV datasets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a fresh network and save its parameters
    Train(TrainArgs),
    /// Load a saved network and report its test accuracy
    Test(TestArgs),
}

#[derive(Args, Debug)]
struct DataArgs {
    /// Training CSV (label first, then pixel values)
    #[arg(long, default_value = "res/datasets/fashion-mnist_train.csv")]
    train_csv: PathBuf,

    /// Testing CSV
    #[arg(long, default_value = "res/datasets/fashion-mnist_test.csv")]
    test_csv: PathBuf,

    /// Parameter file to write (train) or read (test); the architecture is
    /// stored next to it as `<model>.json`
    #[arg(short, long, default_value = "model/fmc.model")]
    model: PathBuf,

    /// Read at most this many rows from each CSV
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args, Debug)]
struct TrainArgs {
    #[command(flatten)]
    data: DataArgs,

    #[arg(short, long, default_value_t = 10)]
    epochs: usize,

    #[arg(short, long, default_value_t = 0.005)]
    learning_rate: f64,

    /// Hidden layer sizes, comma-separated
    #[arg(long, value_delimiter = ',', default_value = "128,128")]
    hidden: Vec<usize>,

    /// Number of output classes
    #[arg(long, default_value_t = 10)]
    classes: usize,

    #[arg(long, value_enum, default_value_t = ActivationArg::Sigmoid)]
    activation: ActivationArg,

    /// Seed for weight initialization; omitted means entropy
    #[arg(long)]
    seed: Option<u64>,

    /// Measure test accuracy every this many epochs (0 = only at the end)
    #[arg(long, default_value_t = 0)]
    validate_every: usize,
}

#[derive(Args, Debug)]
struct TestArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Print this many test samples with their predictions
    #[arg(long, default_value_t = 0)]
    show: usize,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ActivationArg {
    Sigmoid,
    Relu,
    Tanh,
}

impl From<ActivationArg> for Activation {
    fn from(arg: ActivationArg) -> Self {
        match arg {
            ActivationArg::Sigmoid => Activation::Sigmoid,
            ActivationArg::Relu => Activation::ReLU,
            ActivationArg::Tanh => Activation::Tanh,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Train(args) => train(args),
        Command::Test(args) => test(args),
    }
}

fn load_datasets(data: &DataArgs) -> Result<(Dataset, Dataset)> {
    let (mut training, mut testing) =
        Dataset::<f64>::load_pair(&data.train_csv, &data.test_csv, data.limit)
            .context("failed to load datasets")?;
    training.normalize();
    testing.normalize();
    Ok((training, testing))
}

fn spec_path(model: &Path) -> PathBuf {
    let mut name: OsString = model.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

fn train(args: TrainArgs) -> Result<()> {
    let (training, testing) = load_datasets(&args.data)?;
    let Some(features) = training.feature_count() else {
        bail!("training set {} has no samples", args.data.train_csv.display());
    };

    let mut sizes = vec![features];
    sizes.extend(args.hidden.iter().copied());
    sizes.push(args.classes);

    let mut spec = NetworkSpec::uniform(
        "fmc",
        &sizes,
        args.activation.into(),
        LossFunction::SquareError,
        args.learning_rate,
    );
    spec.seed = args.seed;
    spec.metadata = Some(ModelMetadata {
        description: Some(format!("trained on {}", args.data.train_csv.display())),
        output_labels: (args.classes == FASHION_MNIST_CLASSES.len())
            .then(|| FASHION_MNIST_CLASSES.iter().map(|s| s.to_string()).collect()),
        trained_epochs: Some(args.epochs),
    });

    training.validate(features, args.classes).context("training set does not fit the network")?;
    testing.validate(features, args.classes).context("testing set does not fit the network")?;

    let mut network: Network = Network::from_spec(&spec);
    network.compile()?;
    log::info!("compiled network with layer sizes {:?}", sizes);

    let config = TrainConfig {
        epochs: args.epochs,
        log_every: 1,
        validate_every: args.validate_every,
    };
    let history = train_loop(&mut network, &training, Some(&testing), &config)?;

    if let Some(dir) = args.data.model.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }
    network.save(&args.data.model)?;
    spec.save_json(spec_path(&args.data.model))?;
    log::info!("saved model to {}", args.data.model.display());

    if let Some(acc) = history.last().and_then(|s| s.val_accuracy) {
        println!("Accuracy: {acc:.2}%");
    }
    Ok(())
}

fn test(args: TestArgs) -> Result<()> {
    let spec_file = spec_path(&args.data.model);
    let spec = NetworkSpec::load_json(&spec_file)
        .with_context(|| format!("no architecture found for {}", args.data.model.display()))?;

    let mut network: Network = Network::from_spec(&spec);
    network.compile()?;
    network.load(&args.data.model)?;
    log::info!("loaded model from {}", args.data.model.display());

    let (_, testing) = load_datasets(&args.data)?;
    let sizes = spec.sizes();
    let (inputs, outputs) = (sizes[0], sizes[sizes.len() - 1]);
    testing.validate(inputs, outputs).context("testing set does not fit the network")?;

    let accuracy = network.evaluate(&testing.samples, &testing.labels)?;
    println!("Accuracy: {accuracy:.2}%");

    let metadata = spec.metadata.unwrap_or_default();
    let side = (inputs as f64).sqrt() as usize;
    for (sample, &label) in testing.samples.iter().zip(&testing.labels).take(args.show) {
        let predicted = network.predict(sample)?;
        println!("{}", dataset::render_ascii(sample, side));
        println!(
            "expected: {}, predicted: {}\n",
            metadata.label_name(label),
            metadata.label_name(predicted)
        );
    }
    Ok(())
}
