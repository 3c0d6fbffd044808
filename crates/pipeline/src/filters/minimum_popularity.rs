//! Filter that keeps only movies above a popularity threshold.
//!
//! The rows that survive form the catalog the similarity model is built
//! over; everything else stays queryable but is never recommended.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::{MovieStore, RowId};

/// Removes rows whose popularity is not strictly above `threshold`.
///
/// Rows with no popularity value never pass.
pub struct MinimumPopularityFilter {
    threshold: f64,
}

impl MinimumPopularityFilter {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Filter for MinimumPopularityFilter {
    fn name(&self) -> &str {
        "MinimumPopularityFilter"
    }

    fn apply(&self, rows: Vec<RowId>, store: &MovieStore) -> Result<Vec<RowId>> {
        let filtered: Vec<RowId> = rows
            .into_iter()
            .filter(|&row| {
                store
                    .get_movie(row)
                    .and_then(|movie| movie.popularity)
                    .is_some_and(|popularity| popularity > self.threshold)
            })
            .collect();

        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::MovieRecord;

    #[test]
    fn test_threshold_is_exclusive() {
        let mut at = MovieRecord::new("At threshold", "");
        at.popularity = Some(5.0);
        let mut above = MovieRecord::new("Above threshold", "");
        above.popularity = Some(5.0001);
        let store = MovieStore::from_movies(vec![at, above]);

        let filter = MinimumPopularityFilter::new(5.0);
        let filtered = filter.apply(vec![0, 1], &store).unwrap();

        assert_eq!(filtered, vec![1]);
    }

    #[test]
    fn test_unknown_rows_are_dropped() {
        let store = MovieStore::new();
        let filter = MinimumPopularityFilter::new(0.0);
        assert!(filter.apply(vec![0, 42], &store).unwrap().is_empty());
    }
}
