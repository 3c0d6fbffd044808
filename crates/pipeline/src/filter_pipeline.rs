//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::{MovieStore, RowId};

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(MinimumPopularityFilter::new(5.0));
///
/// let catalog = pipeline.catalog(&store)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Apply all filters in sequence to the rows.
    ///
    /// # Returns
    /// * `Ok(Vec<RowId>)` - The surviving rows, in their input order
    /// * `Err` - If any filter fails
    pub fn apply(&self, rows: Vec<RowId>, store: &MovieStore) -> Result<Vec<RowId>> {
        let mut current = rows;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, store)?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }

    /// Run every row of `store` through the pipeline, in load order.
    pub fn catalog(&self, store: &MovieStore) -> Result<Vec<RowId>> {
        self.apply((0..store.len()).collect(), store)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
