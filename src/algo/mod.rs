use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use crate::averages::UserAverages;
use crate::matrix::{RatingMatrix, MAX_RATING, MIN_RATING};
use crate::stats::RunStatistics;

pub mod item_based;
pub mod similarity;
pub mod user_based;

pub use item_based::ItemBased;
pub use user_based::UserBased;

/// Which neighbourhood a predictor draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Mode {
    User,
    Item,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::User => "user-based",
            Mode::Item => "item-based",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PredictorConfig {
    /// Upper bound on neighbours used per prediction.
    pub neighbourhood_size: usize,
    /// Peers are admitted only when their similarity is strictly above this.
    pub similarity_threshold: f64,
    /// Compare `|similarity|` against the threshold instead of the signed
    /// value.
    pub absolute_similarity: bool,
}

impl PredictorConfig {
    pub fn new(
        neighbourhood_size: usize,
        similarity_threshold: f64,
        absolute_similarity: bool,
    ) -> Self {
        Self {
            neighbourhood_size,
            similarity_threshold,
            absolute_similarity,
        }
    }

    /// Scores the threshold is applied to. Weighting always uses the signed
    /// similarities.
    pub fn filter_scores<'a>(&self, similarities: &'a [f64]) -> Cow<'a, [f64]> {
        if self.absolute_similarity {
            Cow::Owned(similarities.iter().map(|s| s.abs()).collect())
        } else {
            Cow::Borrowed(similarities)
        }
    }

    pub fn admits(&self, score: f64) -> bool {
        score > self.similarity_threshold
    }
}

/// One candidate peer used to assemble a prediction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbour {
    pub similarity: f64,
    /// What the peer contributes to the weighted sum: the peer user's
    /// deviation from their own mean, or the user's rating of the peer item.
    pub value: f64,
}

/// A rating predictor driven by the leave-one-out evaluation loop.
pub trait Predictor {
    fn mode(&self) -> Mode;

    fn config(&self) -> &PredictorConfig;

    /// Similarities of the target (user `user` or item `item`, depending on
    /// the mode) against every peer, in matrix order. The self slot is 0.
    fn similarities(
        &self,
        ratings: &RatingMatrix,
        averages: &UserAverages,
        user: usize,
        item: usize,
    ) -> Vec<f64>;

    /// Predicts the rating of `user` for `item`, always yielding a number:
    /// degenerate cases fall back to the user's mean.
    fn predict(
        &self,
        ratings: &RatingMatrix,
        averages: &UserAverages,
        similarities: &[f64],
        user: usize,
        item: usize,
        stats: &mut RunStatistics,
    ) -> f64;
}

/// Keeps the `neighbourhood_size` most similar candidates, best first.
///
/// Returns `None` when there is no candidate at all. Ties keep their encounter
/// order.
pub fn select_neighbours(
    mut candidates: Vec<Neighbour>,
    neighbourhood_size: usize,
    stats: &mut RunStatistics,
) -> Option<Vec<Neighbour>> {
    if candidates.is_empty() {
        stats.no_valid_neighbours += 1;
        return None;
    }
    let size = neighbourhood_size.min(candidates.len());
    stats.total_neighbours += size;

    // sort_by is stable
    candidates.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
    candidates.truncate(size);
    Some(candidates)
}

/// Turns a raw prediction into the final one: falls back on a zero
/// denominator or a non-finite value, otherwise clamps to the rating scale.
pub fn settle(prediction: f64, denominator: f64, fallback: f64, stats: &mut RunStatistics) -> f64 {
    if denominator == 0. || !prediction.is_finite() {
        return fallback;
    }
    if prediction > MAX_RATING {
        stats.r_greater_five += 1;
        return MAX_RATING;
    }
    if prediction < MIN_RATING {
        stats.r_less_than_one += 1;
        return MIN_RATING;
    }
    prediction
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn neighbour(similarity: f64, value: f64) -> Neighbour {
        Neighbour { similarity, value }
    }

    #[test]
    fn should_take_absolute_scores_without_touching_input() {
        let similarities = [0.5, -0.8, 0.];
        let config = PredictorConfig::new(5, 0.6, true);
        let scores = config.filter_scores(&similarities);

        assert_eq!(&*scores, &[0.5, 0.8, 0.]);
        assert_eq!(similarities, [0.5, -0.8, 0.]);
        assert!(config.admits(scores[1]));
        assert!(!config.admits(scores[0]));

        let signed = PredictorConfig::new(5, 0.6, false);
        assert!(matches!(signed.filter_scores(&similarities), Cow::Borrowed(_)));
    }

    #[test]
    fn should_exclude_scores_equal_to_threshold() {
        let config = PredictorConfig::new(1, 0., false);
        assert!(!config.admits(0.));
        assert!(config.admits(f64::MIN_POSITIVE));
    }

    #[test]
    fn should_sort_stably_and_truncate() {
        let mut stats = RunStatistics::default();
        let candidates = vec![
            neighbour(0.2, 1.),
            neighbour(0.9, 2.),
            neighbour(0.2, 3.),
            neighbour(0.9, 4.),
        ];
        let chosen = select_neighbours(candidates, 3, &mut stats).unwrap();

        let values: Vec<f64> = chosen.iter().map(|n| n.value).collect();
        assert_eq!(values, vec![2., 4., 1.]);
        assert_eq!(stats.total_neighbours, 3);
    }

    #[test]
    fn should_shrink_neighbourhood_to_candidates() {
        let mut stats = RunStatistics::default();
        let chosen = select_neighbours(vec![neighbour(0.4, 3.)], 10, &mut stats).unwrap();
        assert_eq!(chosen.len(), 1);
        assert_eq!(stats.total_neighbours, 1);
    }

    #[test]
    fn should_count_missing_neighbours() {
        let mut stats = RunStatistics::default();
        assert!(select_neighbours(Vec::new(), 10, &mut stats).is_none());
        assert_eq!(stats.no_valid_neighbours, 1);
        assert_eq!(stats.total_neighbours, 0);
    }

    #[test]
    fn should_fall_back_on_degenerate_predictions() {
        let mut stats = RunStatistics::default();
        assert_eq!(settle(4.2, 0., 3.1, &mut stats), 3.1);
        assert_eq!(settle(f64::NAN, 1., 3.1, &mut stats), 3.1);
        assert_eq!(settle(f64::INFINITY, 1., 3.1, &mut stats), 3.1);
        assert_eq!(stats, RunStatistics::default());
    }

    proptest! {
        #[test]
        fn should_clamp_every_prediction(raw in -1e6f64..1e6) {
            let mut stats = RunStatistics::default();
            let settled = settle(raw, 1., 3., &mut stats);

            prop_assert!((MIN_RATING..=MAX_RATING).contains(&settled));
            prop_assert_eq!(stats.r_greater_five, usize::from(raw > MAX_RATING));
            prop_assert_eq!(stats.r_less_than_one, usize::from(raw < MIN_RATING));
        }

        #[test]
        fn should_bound_neighbourhood_size(
            similarities in prop::collection::vec(-1f64..1., 0..30),
            size in 1usize..20,
        ) {
            let mut stats = RunStatistics::default();
            let eligible = similarities.len();
            let candidates = similarities.into_iter().map(|s| neighbour(s, 3.)).collect();
            let chosen = select_neighbours(candidates, size, &mut stats).unwrap_or_default();

            prop_assert_eq!(chosen.len(), size.min(eligible));
            prop_assert!(chosen.windows(2).all(|w| w[0].similarity >= w[1].similarity));
        }
    }
}
