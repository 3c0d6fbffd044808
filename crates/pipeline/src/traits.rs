//! Core traits for the catalog filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to narrow the full dataset down to the catalog
//! that recommendations operate on.

use anyhow::Result;
use data_loader::{MovieStore, RowId};

/// Core trait for filtering dataset rows.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be shared across threads
/// - Filters take ownership of the Vec<RowId> and return a filtered Vec
/// - Implementations must keep the relative order of the rows they keep
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of rows.
    ///
    /// # Arguments
    /// * `rows` - Row positions into `store` (takes ownership)
    /// * `store` - The dataset the rows point into
    fn apply(&self, rows: Vec<RowId>, store: &MovieStore) -> Result<Vec<RowId>>;
}
