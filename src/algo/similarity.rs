use crate::averages::UserAverages;
use crate::matrix::RatingMatrix;

/// Pairs need at least this many co-rated entries to be considered similar at
/// all.
pub const MIN_CO_RATED: usize = 2;

/// Cosine of two deviation vectors given as pairs.
///
/// Returns 0 when fewer than [`MIN_CO_RATED`] pairs are given or either side
/// has no variance, so the result is never NaN.
pub fn deviation_cosine(deviations: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let mut numerator = 0.;
    let mut denominator_a = 0.;
    let mut denominator_b = 0.;
    let mut co_rated = 0;

    for (diff_a, diff_b) in deviations {
        numerator += diff_a * diff_b;
        denominator_a += diff_a * diff_a;
        denominator_b += diff_b * diff_b;
        co_rated += 1;
    }

    if co_rated < MIN_CO_RATED || denominator_a == 0. || denominator_b == 0. {
        return 0.;
    }
    numerator / (denominator_a.sqrt() * denominator_b.sqrt())
}

/// Pearson correlation between users `a` and `b` over the items both rated.
pub fn pearson(ratings: &RatingMatrix, averages: &UserAverages, a: usize, b: usize) -> f64 {
    let avg_a = averages.avg(a);
    let avg_b = averages.avg(b);

    let co_rated = ratings
        .row(a)
        .iter()
        .zip(ratings.row(b))
        .filter(|&(&r_ai, &r_bi)| r_ai != 0. && r_bi != 0.)
        .map(|(&r_ai, &r_bi)| (r_ai - avg_a, r_bi - avg_b));

    deviation_cosine(co_rated)
}

/// Adjusted cosine between items `i` and `j`: each co-rating is centred on
/// the mean of the user who gave it.
pub fn adjusted_cosine(
    ratings: &RatingMatrix,
    averages: &UserAverages,
    i: usize,
    j: usize,
) -> f64 {
    let co_rated = (0..ratings.n_users())
        .filter(|&u| ratings.is_rated(u, i) && ratings.is_rated(u, j))
        .map(|u| {
            let avg_u = averages.avg(u);
            (ratings.get(u, i) - avg_u, ratings.get(u, j) - avg_u)
        });

    deviation_cosine(co_rated)
}
