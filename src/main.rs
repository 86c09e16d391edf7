use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use algo::{Mode, PredictorConfig};
use config::SweepConfig;

mod algo;
mod averages;
mod config;
mod error;
mod evaluation;
mod generator;
mod loader;
mod matrix;
mod report;
mod stats;
mod sweep;

#[derive(Parser, Debug)]
#[command(
    name = "cf-eval",
    version,
    about = "Leave-one-out evaluation of neighbourhood collaborative filtering"
)]
struct Cli {
    /// Log filter, overrides RUST_LOG (e.g. `info`, `cf_eval=debug`).
    #[arg(long, global = true, env = "CF_EVAL_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the standard parameter sweeps and append results to the experiment logs.
    Sweep(SweepArgs),
    /// Evaluate a single predictor configuration.
    Evaluate(EvaluateArgs),
    /// Write a random ratings file.
    Generate(GenerateArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SweepMode {
    User,
    Item,
    Both,
}

impl SweepMode {
    fn modes(self) -> &'static [Mode] {
        match self {
            SweepMode::User => &[Mode::User],
            SweepMode::Item => &[Mode::Item],
            SweepMode::Both => &[Mode::Item, Mode::User],
        }
    }
}

#[derive(Args, Debug)]
struct SweepArgs {
    /// Ratings file.
    #[arg(long)]
    data: PathBuf,
    #[arg(long, value_enum, default_value_t = SweepMode::Both)]
    mode: SweepMode,
    /// TOML file overriding the standard sweep values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory receiving userBasedLog.txt and itemBasedLog.txt.
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Ratings file.
    #[arg(long)]
    data: PathBuf,
    #[arg(long, value_enum)]
    mode: Mode,
    /// Maximum neighbourhood size.
    #[arg(
        short = 'k',
        long,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    neighbours: usize,
    /// Similarities must be strictly above this to be admitted.
    #[arg(short = 't', long, default_value_t = 0.)]
    threshold: f64,
    /// Apply the threshold to absolute similarities.
    #[arg(long)]
    absolute: bool,
    /// Also write the rounded predictions, in ratings file layout.
    #[arg(long)]
    predictions: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    users: usize,
    #[arg(long)]
    items: usize,
    /// Probability that a cell is rated.
    #[arg(long, default_value_t = 0.1, value_parser = parse_density)]
    density: f64,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn parse_density(value: &str) -> Result<f64, String> {
    let density: f64 = value.parse().map_err(|err| format!("{err}"))?;
    if !(0. ..=1.).contains(&density) {
        return Err(format!("{density} is not a probability in 0..=1"));
    }
    Ok(density)
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_sweep(args: SweepArgs) -> Result<(), Box<dyn Error>> {
    let sweep_config = match &args.config {
        Some(path) => SweepConfig::load(path)?,
        None => SweepConfig::default(),
    };
    let ratings = loader::load_ratings(&args.data)?;

    let start = Instant::now();
    let records = sweep::run_sweep(&ratings, args.mode.modes(), &sweep_config, &args.log_dir)?;
    info!(
        runs = records.len(),
        log_dir = %args.log_dir.display(),
        total_secs = start.elapsed().as_secs_f64(),
        "sweep complete"
    );
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<(), Box<dyn Error>> {
    let ratings = loader::load_ratings(&args.data)?;
    let config = PredictorConfig::new(args.neighbours, args.threshold, args.absolute);
    let experiment = sweep::Experiment {
        title: format!(
            "{}, {} neighbours, threshold {}{}",
            args.mode,
            args.neighbours,
            args.threshold,
            if args.absolute { ", absolute similarities" } else { "" }
        ),
        mode: args.mode,
        config,
    };

    let (record, predictions) = sweep::run_experiment(&experiment, &ratings);
    if let Some(path) = &args.predictions {
        fs::write(path, generator::to_ratings_file(&predictions))?;
        info!(path = %path.display(), "wrote predictions");
    }
    print!("{}", record.render());
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<(), Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let ratings = generator::synthetic_ratings(args.users, args.items, args.density, &mut rng)?;
    fs::write(&args.out, generator::to_ratings_file(&ratings))?;
    info!(
        path = %args.out.display(),
        rated = ratings.rated_count(),
        "wrote synthetic ratings"
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let result = match cli.command {
        Command::Sweep(args) => run_sweep(args),
        Command::Evaluate(args) => run_evaluate(args),
        Command::Generate(args) => run_generate(args),
    };
    if let Err(err) = &result {
        tracing::error!(error = %err, "cf-eval failed");
    }
    result
}
