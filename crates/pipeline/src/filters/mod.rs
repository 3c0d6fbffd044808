//! Filter implementations for the catalog pipeline.

pub mod minimum_popularity;

// Re-export for convenience
pub use minimum_popularity::MinimumPopularityFilter;
