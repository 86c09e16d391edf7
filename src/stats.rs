/// Counters accumulated over one evaluation run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunStatistics {
    pub predictions_made: usize,
    pub r_less_than_one: usize,
    pub r_greater_five: usize,
    pub no_valid_neighbours: usize,
    pub total_neighbours: usize,
    pub total_error: f64,
    pub mae: f64,
}

impl RunStatistics {
    /// Folds one scored cell into the running error.
    pub fn record_prediction(&mut self, predicted: f64, actual: f64) {
        self.total_error += (predicted - actual).abs();
        self.predictions_made += 1;
    }

    /// Computes MAE; NaN when nothing was scored.
    pub fn finish(&mut self) {
        self.mae = self.total_error / self.predictions_made as f64;
    }

    /// Mean number of neighbours used per prediction; NaN when nothing was
    /// scored.
    pub fn average_neighbourhood_size(&self) -> f64 {
        self.total_neighbours as f64 / self.predictions_made as f64
    }
}

#[cfg(test)]
mod test {
    use super::RunStatistics;

    #[test]
    fn should_compute_mae() {
        let mut stats = RunStatistics::default();
        stats.record_prediction(3.5, 4.);
        stats.record_prediction(2., 1.);
        stats.finish();
        assert_eq!(stats.predictions_made, 2);
        assert_eq!(stats.mae, 0.75);
    }

    #[test]
    fn should_surface_nan_without_predictions() {
        let mut stats = RunStatistics::default();
        stats.finish();
        assert!(stats.mae.is_nan());
        assert!(stats.average_neighbourhood_size().is_nan());
    }
}
