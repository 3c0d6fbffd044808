//! Catalog filtering and feature engineering for content-based recommendations.
//!
//! This crate provides:
//! - Filter trait and implementations for narrowing the dataset to a catalog
//! - FilterPipeline for composing filters
//! - TF-IDF weighting and truncated SVD over sparse term matrices
//! - FeatureBuilder for the joint per-movie feature vectors
//!
//! ## Architecture
//! The pipeline runs once at startup:
//! 1. Filters pick the catalog rows (popularity above a threshold)
//! 2. The synopsis, collection and genre text of each row is vectorized
//! 3. Each source is reduced to a fixed number of dense columns
//! 4. The blocks are concatenated into one feature matrix
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FeatureBuilder, FilterPipeline, MovieDocuments};
//! use pipeline::filters::MinimumPopularityFilter;
//!
//! let catalog = FilterPipeline::new()
//!     .add_filter(MinimumPopularityFilter::new(5.0))
//!     .catalog(&store)?;
//!
//! let documents = MovieDocuments::from_rows(&store, &catalog);
//! let features = FeatureBuilder::default().build(&documents)?;
//! ```

pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod text;
pub mod tfidf;
pub mod svd;
pub mod features;

// Re-export main types
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
pub use tfidf::{TfidfMatrix, TfidfVectorizer};
pub use svd::TruncatedSvd;
pub use features::{FeatureBuilder, FeatureConfig, FeatureMatrix, MovieDocuments};
