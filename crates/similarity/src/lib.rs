//! # Similarity Crate
//!
//! In-memory nearest-neighbour search over dense feature vectors.
//!
//! The index is fitted once over the catalog's feature matrix and is
//! read-only afterwards, so it can be shared behind an `Arc` by any number
//! of request handlers without locking.
//!
//! ## Example Usage
//!
//! ```ignore
//! use similarity::NearestNeighbors;
//!
//! let index = NearestNeighbors::fit(features.into_array(), 6);
//! let neighbors = index.kneighbors_of_row(movie_row, 6)?;
//! for n in neighbors {
//!     println!("{} at distance {:.3}", n.index, n.distance);
//! }
//! ```

pub mod error;
pub mod knn;

pub use error::{IndexError, Result};
pub use knn::{NearestNeighbors, Neighbor};
