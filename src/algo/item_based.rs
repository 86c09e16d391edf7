use tracing::trace;

use super::{
    select_neighbours, settle, similarity::adjusted_cosine, Mode, Neighbour, Predictor,
    PredictorConfig,
};
use crate::averages::UserAverages;
use crate::matrix::RatingMatrix;
use crate::stats::RunStatistics;

/// Predicts from the user's own ratings of similar items, weighted by
/// adjusted cosine similarity.
///
/// Unlike [`UserBased`](super::UserBased) the weighted sum is not re-centred
/// on the user's mean.
#[derive(Clone, Debug)]
pub struct ItemBased {
    config: PredictorConfig,
}

impl ItemBased {
    pub fn new(config: PredictorConfig) -> Self {
        Self { config }
    }
}

impl Predictor for ItemBased {
    fn mode(&self) -> Mode {
        Mode::Item
    }

    fn config(&self) -> &PredictorConfig {
        &self.config
    }

    fn similarities(
        &self,
        ratings: &RatingMatrix,
        averages: &UserAverages,
        _user: usize,
        item: usize,
    ) -> Vec<f64> {
        (0..ratings.n_items())
            .map(|other| {
                if other == item {
                    return 0.;
                }
                adjusted_cosine(ratings, averages, item, other)
            })
            .collect()
    }

    fn predict(
        &self,
        ratings: &RatingMatrix,
        averages: &UserAverages,
        similarities: &[f64],
        user: usize,
        item: usize,
        stats: &mut RunStatistics,
    ) -> f64 {
        let user_avg = averages.avg(user);
        let scores = self.config.filter_scores(similarities);

        let candidates = (0..ratings.n_items())
            .filter(|&other| {
                other != item && ratings.is_rated(user, other) && self.config.admits(scores[other])
            })
            .map(|other| Neighbour {
                similarity: similarities[other],
                value: ratings.get(user, other),
            })
            .collect();

        let Some(neighbours) =
            select_neighbours(candidates, self.config.neighbourhood_size, stats)
        else {
            trace!(user, item, "no valid neighbours, using user mean");
            return user_avg;
        };

        let mut numerator = 0.;
        let mut denominator = 0.;
        for n in &neighbours {
            numerator += n.similarity * n.value;
            denominator += n.similarity.abs();
        }

        settle(numerator / denominator, denominator, user_avg, stats)
    }
}
