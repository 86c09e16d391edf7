use tracing::trace;

use super::{
    select_neighbours, settle, similarity::pearson, Mode, Neighbour, Predictor, PredictorConfig,
};
use crate::averages::UserAverages;
use crate::matrix::RatingMatrix;
use crate::stats::RunStatistics;

/// Predicts from users who rated the item, weighting their deviation from
/// their own mean by Pearson correlation.
#[derive(Clone, Debug)]
pub struct UserBased {
    config: PredictorConfig,
}

impl UserBased {
    pub fn new(config: PredictorConfig) -> Self {
        Self { config }
    }
}

impl Predictor for UserBased {
    fn mode(&self) -> Mode {
        Mode::User
    }

    fn config(&self) -> &PredictorConfig {
        &self.config
    }

    fn similarities(
        &self,
        ratings: &RatingMatrix,
        averages: &UserAverages,
        user: usize,
        _item: usize,
    ) -> Vec<f64> {
        (0..ratings.n_users())
            .map(|peer| {
                if peer == user {
                    return 0.;
                }
                pearson(ratings, averages, user, peer)
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

        let candidates = (0..ratings.n_users())
            .filter(|&peer| {
                peer != user && ratings.is_rated(peer, item) && self.config.admits(scores[peer])
            })
            .map(|peer| Neighbour {
                similarity: similarities[peer],
                value: ratings.get(peer, item) - averages.avg(peer),
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
            denominator += n.similarity;
        }

        settle(user_avg + numerator / denominator, denominator, user_avg, stats)
    }
}
