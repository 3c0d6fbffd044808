//! Exact nearest neighbours under cosine distance.
//!
//! ## Algorithm
//! 1. At fit time, store the matrix and the L2 norm of every row
//! 2. For a query, compute `1 - cos(query, row)` against every row in parallel
//! 3. Sort by distance (ties by row index) and keep the first `k`
//!
//! A linear scan is exact, which matters because the indexed rows are also
//! the query universe: a movie must always find itself at distance ~0.

use crate::error::{IndexError, Result};
use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// One query result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Row of the indexed matrix
    pub index: usize,
    /// Cosine distance to the query, in `[0, 2]`
    pub distance: f64,
}

/// Nearest-neighbour index over the rows of a dense matrix.
#[derive(Debug, Clone)]
pub struct NearestNeighbors {
    data: Array2<f64>,
    norms: Vec<f64>,
    n_neighbors: usize,
}

impl NearestNeighbors {
    /// Index the rows of `data`; `n_neighbors` is the default `k`.
    pub fn fit(data: Array2<f64>, n_neighbors: usize) -> Self {
        let norms = data
            .rows()
            .into_iter()
            .map(|row| row.dot(&row).sqrt())
            .collect();
        debug!("Fitted nearest-neighbour index over {} rows", data.nrows());
        Self {
            data,
            norms,
            n_neighbors,
        }
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Dimension of the indexed vectors
    pub fn dim(&self) -> usize {
        self.data.ncols()
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    /// The indexed vector at `row`
    pub fn row(&self, row: usize) -> Option<ArrayView1<'_, f64>> {
        (row < self.len()).then(|| self.data.row(row))
    }

    /// The default number of neighbours of `query`, closest first.
    pub fn kneighbors(&self, query: ArrayView1<f64>) -> Result<Vec<Neighbor>> {
        self.kneighbors_k(query, self.n_neighbors)
    }

    /// The `k` nearest rows to `query`, closest first.
    ///
    /// Returns fewer than `k` results only when the index holds fewer rows.
    #[instrument(skip(self, query), fields(rows = self.len()))]
    pub fn kneighbors_k(&self, query: ArrayView1<f64>, k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dim() {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim(),
                found: query.len(),
            });
        }

        let query_norm = query.dot(&query).sqrt();
        let mut neighbors: Vec<Neighbor> = (0..self.len())
            .into_par_iter()
            .map(|index| Neighbor {
                index,
                distance: self.cosine_distance(query, query_norm, index),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.index.cmp(&b.index))
        });
        neighbors.truncate(k);
        Ok(neighbors)
    }

    /// Neighbours of an indexed row (the row itself included).
    pub fn kneighbors_of_row(&self, row: usize, k: usize) -> Result<Vec<Neighbor>> {
        let query = self.row(row).ok_or(IndexError::RowOutOfRange {
            row,
            len: self.len(),
        })?;
        self.kneighbors_k(query, k)
    }

    /// `1 - cos`, with a zero vector at distance 1 from everything.
    fn cosine_distance(&self, query: ArrayView1<f64>, query_norm: f64, index: usize) -> f64 {
        let norm = self.norms[index];
        if query_norm == 0.0 || norm == 0.0 {
            return 1.0;
        }
        let similarity = query.dot(&self.data.row(index)) / (query_norm * norm);
        (1.0 - similarity).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn create_test_index() -> NearestNeighbors {
        NearestNeighbors::fit(
            array![
                [1.0, 0.0, 0.0],
                [0.9, 0.1, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [2.0, 0.0, 0.0],
            ],
            3,
        )
    }

    #[test]
    fn test_row_is_its_own_nearest_neighbor() {
        let index = create_test_index();
        let neighbors = index.kneighbors_of_row(2, 1).unwrap();
        assert_eq!(neighbors[0].index, 2);
        assert!(neighbors[0].distance.abs() < 1e-12);
    }

    #[test]
    fn test_results_sorted_by_distance() {
        let index = create_test_index();
        let neighbors = index.kneighbors(array![1.0, 0.05, 0.0].view()).unwrap();

        assert_eq!(neighbors.len(), 3);
        assert!(neighbors.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_cosine_ignores_magnitude_and_breaks_ties_by_index() {
        let index = create_test_index();
        let neighbors = index.kneighbors_of_row(0, 2).unwrap();
        // rows 0 and 4 point the same way
        assert_eq!(neighbors[0].index, 0);
        assert_eq!(neighbors[1].index, 4);

        let neighbors = index.kneighbors_of_row(4, 2).unwrap();
        assert_eq!(neighbors[0].index, 0);
        assert_eq!(neighbors[1].index, 4);
    }

    #[test]
    fn test_k_larger_than_index() {
        let index = create_test_index();
        let neighbors = index.kneighbors_of_row(0, 50).unwrap();
        assert_eq!(neighbors.len(), 5);
    }

    #[test]
    fn test_zero_vectors() {
        let index = NearestNeighbors::fit(array![[0.0, 0.0], [1.0, 0.0]], 2);
        let neighbors = index.kneighbors_of_row(0, 2).unwrap();
        assert!(neighbors.iter().all(|n| n.distance == 1.0));
    }

    #[test]
    fn test_dimension_mismatch() {
        let index = create_test_index();
        let err = index.kneighbors(array![1.0, 0.0].view()).unwrap_err();
        assert_eq!(err, IndexError::DimensionMismatch { expected: 3, found: 2 });
    }

    #[test]
    fn test_row_out_of_range() {
        let index = create_test_index();
        assert!(matches!(
            index.kneighbors_of_row(9, 1),
            Err(IndexError::RowOutOfRange { row: 9, len: 5 })
        ));
    }
}
