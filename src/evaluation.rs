use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::algo::Predictor;
use crate::averages::UserAverages;
use crate::matrix::RatingMatrix;
use crate::stats::RunStatistics;

/// Outcome of one leave-one-out run.
#[derive(Clone, Debug)]
pub struct Evaluation {
    pub stats: RunStatistics,
    /// Rounded prediction for every rated cell, 0 elsewhere.
    pub predictions: RatingMatrix,
}

/// Rounds to two decimals, the precision predictions are scored at.
///
/// Rounds the exact decimal value of the double, ties away from zero, so
/// `2.675` (stored as 2.67499...) becomes 2.67 while an exact `3.125` becomes
/// 3.13.
pub fn round_prediction(prediction: f64) -> f64 {
    let Some(exact) = Decimal::from_f64_retain(prediction) else {
        return prediction;
    };
    exact
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_string()
        .parse()
        .unwrap_or(prediction)
}

/// Hides each rated cell in turn, predicts it from the rest of the matrix and
/// scores the prediction against the hidden rating.
///
/// The matrix is owned for the duration of the run and handed back unchanged
/// in content; a matrix with no ratings yields a NaN MAE.
pub fn evaluate<P>(predictor: &P, mut ratings: RatingMatrix) -> (Evaluation, RatingMatrix)
where
    P: Predictor + ?Sized,
{
    let n_users = ratings.n_users();
    let n_items = ratings.n_items();
    let config = predictor.config();
    debug!(
        mode = %predictor.mode(),
        n_users,
        n_items,
        neighbourhood_size = config.neighbourhood_size,
        similarity_threshold = config.similarity_threshold,
        absolute_similarity = config.absolute_similarity,
        "starting leave-one-out evaluation"
    );

    let mut averages = UserAverages::compute(&ratings);
    let mut predictions = RatingMatrix::zeros(n_users, n_items);
    let mut stats = RunStatistics::default();

    for user in 0..n_users {
        for item in 0..n_items {
            if !ratings.is_rated(user, item) {
                continue;
            }
            let (actual, predicted) = {
                let hidden = ratings.hide(user, item);
                let actual = hidden.rating();
                let averages = averages.exclude(user, actual);
                let similarities = predictor.similarities(&hidden, &averages, user, item);
                let prediction =
                    predictor.predict(&hidden, &averages, &similarities, user, item, &mut stats);
                (actual, round_prediction(prediction))
            };

            predictions.set(user, item, predicted);
            stats.record_prediction(predicted, actual);
        }
    }
    stats.finish();

    (Evaluation { stats, predictions }, ratings)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algo::{ItemBased, PredictorConfig, UserBased};
    use crate::generator::synthetic_ratings;
    use rand::{rngs::StdRng, SeedableRng};

    fn user_based(k: usize, threshold: f64, absolute: bool) -> UserBased {
        UserBased::new(PredictorConfig::new(k, threshold, absolute))
    }

    fn item_based(k: usize, threshold: f64, absolute: bool) -> ItemBased {
        ItemBased::new(PredictorConfig::new(k, threshold, absolute))
    }

    #[test]
    fn should_fall_back_for_isolated_user() {
        // nobody else rated items 0 and 1
        let ratings = RatingMatrix::from_rows([[5, 3, 0], [0, 0, 4], [0, 0, 2]]);
        let (evaluation, _) = evaluate(&user_based(5, 0., false), ratings);

        assert_eq!(evaluation.predictions.get(0, 0), 3.);
        assert_eq!(evaluation.predictions.get(0, 1), 5.);
        // every cell ends up without neighbours
        assert_eq!(evaluation.stats.no_valid_neighbours, 4);
        assert_eq!(evaluation.stats.predictions_made, 4);
    }

    #[test]
    fn should_fall_back_for_anti_correlated_users() {
        let ratings = RatingMatrix::from_rows([[5, 1], [1, 5]]);
        let (evaluation, ratings) = evaluate(&user_based(1, 0., false), ratings);

        // each hidden rating falls back to the owner's one remaining rating
        assert_eq!(
            evaluation.predictions,
            RatingMatrix::from_rows([[1, 5], [5, 1]])
        );
        assert_eq!(evaluation.stats.no_valid_neighbours, 4);
        assert_eq!(evaluation.stats.total_neighbours, 0);
        assert_eq!(evaluation.stats.mae, 4.);
        assert_eq!(ratings, RatingMatrix::from_rows([[5, 1], [1, 5]]));
    }

    #[test]
    fn should_recover_constant_raters_from_own_mean() {
        // flat rows carry no deviation, so no peer is ever similar and each
        // hidden rating comes back as the mean of the rest
        let ratings = RatingMatrix::from_rows([
            [3, 3, 0, 3, 3],
            [5, 0, 5, 5, 0],
            [2, 2, 2, 0, 2],
            [0, 4, 4, 4, 4],
        ]);

        for predictor in [
            Box::new(user_based(10, 0., false)) as Box<dyn Predictor>,
            Box::new(item_based(10, 0., true)),
        ] {
            let (evaluation, _) = evaluate(predictor.as_ref(), ratings.clone());
            assert_eq!(evaluation.stats.mae, 0.);
            assert_eq!(evaluation.stats.no_valid_neighbours, ratings.rated_count());
            assert_eq!(evaluation.stats.total_neighbours, 0);
            assert_eq!(evaluation.predictions, ratings);
        }
    }

    #[test]
    fn should_recover_every_rating_from_similar_items() {
        // items 0/1 and 2/3 form two clusters; three users pull the clusters
        // apart and the last one rates everything 4
        let ratings = RatingMatrix::from_rows([
            [5, 5, 1, 1],
            [1, 1, 5, 5],
            [4, 4, 2, 2],
            [4, 4, 4, 4],
        ]);
        let (evaluation, _) = evaluate(&item_based(10, 0., false), ratings.clone());
        let stats = evaluation.stats;

        assert_eq!(stats.mae, 0.);
        assert_eq!(stats.predictions_made, 16);
        assert_eq!(stats.no_valid_neighbours, 0);
        // only the cluster partner is positively similar
        assert_eq!(stats.total_neighbours, 16);
        assert_eq!(evaluation.predictions, ratings);
    }

    #[test]
    fn should_report_nan_for_empty_matrix() {
        let ratings = RatingMatrix::zeros(3, 4);
        let (evaluation, _) = evaluate(&item_based(5, 0., false), ratings);

        assert_eq!(evaluation.stats.predictions_made, 0);
        assert!(evaluation.stats.mae.is_nan());
        assert_eq!(evaluation.predictions, RatingMatrix::zeros(3, 4));
    }

    #[test]
    fn should_round_predictions_to_two_decimals() {
        assert_eq!(round_prediction(3.14159), 3.14);
        assert_eq!(round_prediction(5.), 5.);
        assert_eq!(round_prediction(1.), 1.);
    }

    #[test]
    fn should_round_exact_decimal_value_half_up() {
        // stored just below the tie
        assert_eq!(round_prediction(2.675), 2.67);
        assert_eq!(round_prediction(3.445), 3.44);
        assert_eq!(round_prediction(1.115), 1.11);
        assert_eq!(round_prediction(1.005), 1.);
        // stored just above the tie
        assert_eq!(round_prediction(4.995), 5.);
        // exact ties go up
        assert_eq!(round_prediction(3.125), 3.13);
        assert_eq!(round_prediction(1.375), 1.38);
    }

    #[test]
    fn should_keep_predictions_in_range_on_random_matrix() {
        let mut rng = StdRng::seed_from_u64(7);
        let ratings = synthetic_ratings(30, 20, 0.4, &mut rng).unwrap();

        for predictor in [
            Box::new(user_based(5, 0., true)) as Box<dyn Predictor>,
            Box::new(item_based(5, 0., false)),
        ] {
            let (evaluation, returned) = evaluate(predictor.as_ref(), ratings.clone());
            assert_eq!(returned, ratings);
            assert_eq!(evaluation.stats.predictions_made, ratings.rated_count());
            assert!(evaluation.stats.mae.is_finite());

            for user in 0..ratings.n_users() {
                for item in 0..ratings.n_items() {
                    let predicted = evaluation.predictions.get(user, item);
                    if !ratings.is_rated(user, item) {
                        assert_eq!(predicted, 0.);
                    } else if averages_allow_range(&ratings, user) {
                        assert!((1. ..=5.).contains(&predicted), "{predicted}");
                    }
                }
            }
        }
    }

    // A user's only rating falls back to a mean of 0 once it is hidden.
    fn averages_allow_range(ratings: &RatingMatrix, user: usize) -> bool {
        ratings.row(user).iter().filter(|&&r| r != 0.).count() > 1
    }

    #[test]
    fn should_reproduce_average_neighbourhood_size() {
        let run = || {
            let mut rng = StdRng::seed_from_u64(42);
            let ratings = synthetic_ratings(25, 15, 0.5, &mut rng).unwrap();
            evaluate(&user_based(3, 0., false), ratings).0.stats
        };
        let first = run();
        let second = run();

        assert_eq!(first, second);
        assert!(first.predictions_made > 0);
        assert_eq!(
            first.average_neighbourhood_size(),
            first.total_neighbours as f64 / first.predictions_made as f64
        );
        assert!(first.average_neighbourhood_size() <= 3.);
    }

    #[test]
    fn should_count_neighbourhoods_within_bound() {
        let mut rng = StdRng::seed_from_u64(11);
        let ratings = synthetic_ratings(20, 40, 0.6, &mut rng).unwrap();
        let (evaluation, _) = evaluate(&item_based(4, 0., false), ratings);
        let stats = evaluation.stats;

        let scored_with_neighbours = stats.predictions_made - stats.no_valid_neighbours;
        assert!(stats.total_neighbours <= 4 * scored_with_neighbours);
        assert!(stats.total_neighbours >= scored_with_neighbours);
    }
}
