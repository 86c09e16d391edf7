use std::ops::Deref;

use crate::matrix::{RatingMatrix, UNRATED};

/// Running mean of one user's non-zero ratings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AverageRecord {
    pub sum: f64,
    pub count: usize,
    pub avg: f64,
}

impl AverageRecord {
    pub fn from_ratings(ratings: &[f64]) -> Self {
        let mut sum = 0.;
        let mut count = 0;
        for &rating in ratings {
            if rating != UNRATED {
                sum += rating;
                count += 1;
            }
        }
        Self {
            sum,
            count,
            avg: mean(sum, count),
        }
    }

    /// Mean of the ratings with `rating` taken out, derived from the stored
    /// sum and count.
    pub fn mean_without(&self, rating: f64) -> f64 {
        mean(self.sum - rating, self.count.saturating_sub(1))
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.;
    }
    sum / count as f64
}

/// Per-user averages for a whole rating matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct UserAverages {
    records: Vec<AverageRecord>,
}

impl UserAverages {
    pub fn compute(ratings: &RatingMatrix) -> Self {
        Self {
            records: ratings.rows().map(AverageRecord::from_ratings).collect(),
        }
    }

    pub fn avg(&self, user: usize) -> f64 {
        self.records[user].avg
    }

    /// Installs the mean of `user` without `rating` until the guard drops.
    /// Only one exclusion can be live at a time since the guard holds the
    /// averages mutably.
    pub fn exclude(&mut self, user: usize, rating: f64) -> ExcludedRating<'_> {
        let saved = self.records[user];
        self.records[user].avg = saved.mean_without(rating);
        ExcludedRating {
            averages: self,
            user,
            saved,
        }
    }
}

/// Scoped leave-one-out view of [`UserAverages`].
pub struct ExcludedRating<'a> {
    averages: &'a mut UserAverages,
    user: usize,
    saved: AverageRecord,
}

impl Deref for ExcludedRating<'_> {
    type Target = UserAverages;

    fn deref(&self) -> &UserAverages {
        &*self.averages
    }
}

impl Drop for ExcludedRating<'_> {
    fn drop(&mut self) {
        // Exact restore, recomputing would drift.
        self.averages.records[self.user] = self.saved;
    }
}
