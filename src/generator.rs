use std::fmt::Write as _;

use rand::distributions::{Bernoulli, Distribution};
use rand::Rng;

use crate::error::{EvalError, Result};
use crate::matrix::RatingMatrix;

/// Random ratings matrix: each cell is rated with probability `density`,
/// ratings uniform over 1..=5.
pub fn synthetic_ratings<R: Rng + ?Sized>(
    n_users: usize,
    n_items: usize,
    density: f64,
    rng: &mut R,
) -> Result<RatingMatrix> {
    let rated = Bernoulli::new(density).map_err(|_| EvalError::InvalidDensity(density))?;
    let mut ratings = RatingMatrix::zeros(n_users, n_items);
    for user in 0..n_users {
        for item in 0..n_items {
            if rated.sample(rng) {
                ratings.set(user, item, f64::from(rng.gen_range(1..=5u8)));
            }
        }
    }
    Ok(ratings)
}

/// Renders a matrix in the ratings file layout read by
/// [`loader::parse_ratings`](crate::loader::parse_ratings).
pub fn to_ratings_file(ratings: &RatingMatrix) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", ratings.n_users(), ratings.n_items());
    // The two reserved header lines carry user and item labels.
    let users: Vec<String> = (0..ratings.n_users()).map(|u| format!("U{}", u + 1)).collect();
    let items: Vec<String> = (0..ratings.n_items()).map(|i| format!("I{}", i + 1)).collect();
    let _ = writeln!(out, "{}", users.join(" "));
    let _ = writeln!(out, "{}", items.join(" "));
    for row in ratings.rows() {
        let cells: Vec<String> = row.iter().map(|r| r.to_string()).collect();
        let _ = writeln!(out, "{}", cells.join(" "));
    }
    out
}
