use std::ops::Deref;

use num_traits::ToPrimitive;

/// Sentinel stored in cells that carry no rating.
pub const UNRATED: f64 = 0.;
/// Lowest legal rating, also the lower clamp bound for predictions.
pub const MIN_RATING: f64 = 1.;
/// Highest legal rating, also the upper clamp bound for predictions.
pub const MAX_RATING: f64 = 5.;

/// Dense users x items table of ratings, `0` meaning "not rated".
#[derive(Clone, Debug, PartialEq)]
pub struct RatingMatrix {
    n_users: usize,
    n_items: usize,
    cells: Vec<f64>,
}

impl RatingMatrix {
    pub fn zeros(n_users: usize, n_items: usize) -> Self {
        Self {
            n_users,
            n_items,
            cells: vec![UNRATED; n_users * n_items],
        }
    }

    /// Builds a matrix from nested rows of any primitive numeric type.
    ///
    /// The item count is the width of the widest row; shorter rows are padded
    /// with unrated cells, and values that do not fit an `f64` count as unrated.
    pub fn from_rows<R, T>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = T>,
        T: ToPrimitive,
    {
        let rows: Vec<Vec<f64>> = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|score| score.to_f64().unwrap_or(UNRATED))
                    .collect()
            })
            .collect();
        let n_items = rows.iter().map(Vec::len).max().unwrap_or(0);

        let mut matrix = Self::zeros(rows.len(), n_items);
        for (user, row) in rows.iter().enumerate() {
            for (item, &rating) in row.iter().enumerate() {
                matrix.set(user, item, rating);
            }
        }
        matrix
    }

    pub fn n_users(&self) -> usize {
        self.n_users
    }

    pub fn n_items(&self) -> usize {
        self.n_items
    }

    pub fn get(&self, user: usize, item: usize) -> f64 {
        self.cells[user * self.n_items + item]
    }

    pub fn set(&mut self, user: usize, item: usize, rating: f64) {
        self.cells[user * self.n_items + item] = rating;
    }

    pub fn is_rated(&self, user: usize, item: usize) -> bool {
        self.get(user, item) != UNRATED
    }

    pub fn row(&self, user: usize) -> &[f64] {
        let start = user * self.n_items;
        &self.cells[start..start + self.n_items]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.n_users).map(move |user| self.row(user))
    }

    /// Number of rated cells.
    pub fn rated_count(&self) -> usize {
        self.cells.iter().filter(|&&r| r != UNRATED).count()
    }

    /// Zeroes the cell until the returned guard is dropped, at which point the
    /// original rating is written back.
    pub fn hide(&mut self, user: usize, item: usize) -> HiddenRating<'_> {
        let rating = self.get(user, item);
        self.set(user, item, UNRATED);
        HiddenRating {
            matrix: self,
            user,
            item,
            rating,
        }
    }
}

/// A rating temporarily removed from its matrix.
///
/// Dereferences to the matrix in its hidden state.
pub struct HiddenRating<'a> {
    matrix: &'a mut RatingMatrix,
    user: usize,
    item: usize,
    rating: f64,
}

impl HiddenRating<'_> {
    /// The rating that was hidden.
    pub fn rating(&self) -> f64 {
        self.rating
    }
}

impl Deref for HiddenRating<'_> {
    type Target = RatingMatrix;

    fn deref(&self) -> &RatingMatrix {
        &*self.matrix
    }
}

impl Drop for HiddenRating<'_> {
    fn drop(&mut self) {
        self.matrix.set(self.user, self.item, self.rating);
    }
}
