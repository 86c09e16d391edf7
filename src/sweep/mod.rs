use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::algo::{ItemBased, Mode, Predictor, PredictorConfig, UserBased};
use crate::config::SweepConfig;
use crate::error::Result;
use crate::evaluation::{evaluate, Evaluation};
use crate::matrix::RatingMatrix;
use crate::report::{append_record, RunRecord};

pub mod families;

/// One predictor configuration to evaluate.
#[derive(Clone, Debug, PartialEq)]
pub struct Experiment {
    pub title: String,
    pub mode: Mode,
    pub config: PredictorConfig,
}

pub fn predictor_for(mode: Mode, config: PredictorConfig) -> Box<dyn Predictor> {
    match mode {
        Mode::User => Box::new(UserBased::new(config)),
        Mode::Item => Box::new(ItemBased::new(config)),
    }
}

/// Evaluates one experiment on its own copy of the ratings and times it.
/// Returns the log record together with the predictions matrix.
pub fn run_experiment(
    experiment: &Experiment,
    ratings: &RatingMatrix,
) -> (RunRecord, RatingMatrix) {
    let predictor = predictor_for(experiment.mode, experiment.config);

    let start = Instant::now();
    let (evaluation, _) = evaluate(predictor.as_ref(), ratings.clone());
    let run_time = start.elapsed();

    let Evaluation { stats, predictions } = evaluation;
    info!(
        experiment = %experiment.title,
        predictions = stats.predictions_made,
        mae = stats.mae,
        no_valid_neighbours = stats.no_valid_neighbours,
        run_time_secs = run_time.as_secs_f64(),
        "experiment finished"
    );

    let record = RunRecord {
        title: experiment.title.clone(),
        stats,
        run_time,
    };
    (record, predictions)
}

/// Runs every experiment of every requested mode in order, appending each
/// record to the experiment logs in `log_dir` as soon as it finishes.
pub fn run_sweep(
    ratings: &RatingMatrix,
    modes: &[Mode],
    config: &SweepConfig,
    log_dir: &Path,
) -> Result<Vec<RunRecord>> {
    let mut records = Vec::new();
    for &mode in modes {
        let experiments = families::experiments(mode, config.for_mode(mode));
        info!(%mode, experiments = experiments.len(), "starting sweep");

        for experiment in &experiments {
            let (record, _) = run_experiment(experiment, ratings);
            append_record(log_dir, &record)?;
            records.push(record);
        }
    }
    Ok(records)
}
