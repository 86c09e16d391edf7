use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EvalError, Result};
use crate::matrix::RatingMatrix;

/// Header lines between the `N M` line and the first ratings row.
const RESERVED_HEADER_LINES: usize = 2;

/// Reads a ratings file from disk.
pub fn load_ratings(path: impl AsRef<Path>) -> Result<RatingMatrix> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let ratings = parse_ratings(&text)?;
    info!(
        path = %path.display(),
        n_users = ratings.n_users(),
        n_items = ratings.n_items(),
        rated = ratings.rated_count(),
        "loaded ratings"
    );
    Ok(ratings)
}

/// Parses the ratings text layout: an `N M` line, two reserved header lines,
/// then `N` rows of `M` whitespace separated ratings (0 for unrated).
///
/// Lines past the `N`th row are ignored. Rating values are not range checked.
pub fn parse_ratings(text: &str) -> Result<RatingMatrix> {
    let mut lines = text.trim().lines().map(str::trim);

    let header = lines.next().filter(|l| !l.is_empty()).ok_or(EvalError::MissingHeader)?;
    let (n_users, n_items) = parse_header(header)?;

    let mut rows = lines.skip(RESERVED_HEADER_LINES);
    let mut parsed = Vec::with_capacity(n_users);
    for user in 0..n_users {
        let row = rows.next().ok_or(EvalError::MissingRows {
            expected: n_users,
            found: user,
        })?;
        let cells: Vec<&str> = row.split_whitespace().collect();
        if cells.len() != n_items {
            return Err(EvalError::RowWidth {
                row: user,
                expected: n_items,
                found: cells.len(),
            });
        }
        let row = cells
            .into_iter()
            .enumerate()
            .map(|(item, cell)| {
                cell.parse::<f64>().map_err(|_| EvalError::InvalidRating {
                    row: user,
                    column: item,
                    value: cell.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        parsed.push(row);
    }
    Ok(RatingMatrix::from_rows(parsed))
}

fn parse_header(line: &str) -> Result<(usize, usize)> {
    let mut fields = line.split_whitespace().map(str::parse::<usize>);
    match (fields.next(), fields.next()) {
        (Some(Ok(n_users)), Some(Ok(n_items))) => Ok((n_users, n_items)),
        _ => Err(EvalError::InvalidHeader(line.to_string())),
    }
}
