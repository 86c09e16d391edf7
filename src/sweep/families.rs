use crate::algo::{Mode, PredictorConfig};
use crate::config::ModeSweep;

use super::Experiment;

/// The four standard sweep families for `mode`, in run order:
/// neighbourhood sizes, thresholds, absolute thresholds, then absolute
/// neighbourhood sizes.
pub fn experiments(mode: Mode, sweep: &ModeSweep) -> Vec<Experiment> {
    let label = mode.label();
    let fixed = sweep.threshold_neighbourhood_size;
    let mut out = Vec::new();

    for size in sweep.neighbourhood_sizes.sizes() {
        out.push(Experiment {
            title: format!("{label}, {size} neighbours, ignore negative similarities"),
            mode,
            config: PredictorConfig::new(size, 0., false),
        });
    }

    for &threshold in &sweep.thresholds {
        out.push(Experiment {
            title: format!(
                "{label}, {fixed} neighbours, ignore similarities less then {threshold:.1}"
            ),
            mode,
            config: PredictorConfig::new(fixed, threshold, false),
        });
    }

    for &threshold in &sweep.thresholds {
        out.push(Experiment {
            title: format!(
                "{label}, {fixed} neighbours, take absolute value of similarities, \
                 ignore similarities less then {threshold:.1}"
            ),
            mode,
            config: PredictorConfig::new(fixed, threshold, true),
        });
    }

    for size in sweep.neighbourhood_sizes.sizes() {
        out.push(Experiment {
            title: format!(
                "{label}, {size} neighbours, take absolute similarities,ignore negative similarities"
            ),
            mode,
            config: PredictorConfig::new(size, 0., true),
        });
    }

    out
}
