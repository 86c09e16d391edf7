use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::algo::Mode;
use crate::error::{EvalError, Result};

/// Parameter sweep for both predictors.
///
/// A missing `[user]` or `[item]` table keeps the standard sweep for that
/// mode.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    #[serde(default = "ModeSweep::user_defaults")]
    pub user: ModeSweep,
    #[serde(default = "ModeSweep::item_defaults")]
    pub item: ModeSweep,
}

/// Sweep values for one predictor.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeSweep {
    /// Neighbourhood sizes for the two neighbourhood sweeps.
    pub neighbourhood_sizes: SizeRange,
    /// Neighbourhood size held fixed during the two threshold sweeps.
    pub threshold_neighbourhood_size: usize,
    /// Thresholds for the two threshold sweeps.
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<f64>,
}

/// Inclusive stepped range of neighbourhood sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeRange {
    pub start: usize,
    pub end: usize,
    pub step: usize,
}

impl SizeRange {
    /// Sizes in the range; 0 is skipped since it admits no neighbour.
    pub fn sizes(&self) -> impl Iterator<Item = usize> {
        (self.start..=self.end)
            .step_by(self.step.max(1))
            .filter(|&size| size > 0)
    }
}

/// 0.0, 0.1, ..., 1.0
fn default_thresholds() -> Vec<f64> {
    (0..=10).map(|step| step as f64 / 10.).collect()
}

impl ModeSweep {
    pub fn user_defaults() -> Self {
        Self {
            neighbourhood_sizes: SizeRange {
                start: 5,
                end: 100,
                step: 5,
            },
            threshold_neighbourhood_size: 25,
            thresholds: default_thresholds(),
        }
    }

    pub fn item_defaults() -> Self {
        Self {
            neighbourhood_sizes: SizeRange {
                start: 25,
                end: 500,
                step: 25,
            },
            threshold_neighbourhood_size: 300,
            thresholds: default_thresholds(),
        }
    }

    fn validate(&self, mode: Mode) -> Result<()> {
        if self.neighbourhood_sizes.step == 0 {
            return Err(EvalError::InvalidSweep(format!(
                "{mode} neighbourhood size step must be positive"
            )));
        }
        if self.threshold_neighbourhood_size == 0 {
            return Err(EvalError::InvalidSweep(format!(
                "{mode} threshold sweep needs a positive neighbourhood size"
            )));
        }
        if let Some(t) = self.thresholds.iter().find(|t| !t.is_finite()) {
            return Err(EvalError::InvalidSweep(format!(
                "{mode} threshold {t} is not finite"
            )));
        }
        Ok(())
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            user: ModeSweep::user_defaults(),
            item: ModeSweep::item_defaults(),
        }
    }
}

impl SweepConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text).map_err(|e| EvalError::config(path, e))?;
        config.user.validate(Mode::User)?;
        config.item.validate(Mode::Item)?;
        Ok(config)
    }

    pub fn for_mode(&self, mode: Mode) -> &ModeSweep {
        match mode {
            Mode::User => &self.user,
            Mode::Item => &self.item,
        }
    }
}
