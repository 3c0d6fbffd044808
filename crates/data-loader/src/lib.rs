//! # Data Loader Crate
//!
//! This crate loads the movie dataset into memory and indexes it.
//!
//! ## Main Components
//!
//! - **types**: `MovieRecord` and the `MovieStore` table
//! - **parser**: CSV rows and serialized list cells into Rust structs
//! - **index**: secondary indices and validation
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::MovieStore;
//! use std::path::Path;
//!
//! let store = MovieStore::load_from_file(Path::new("MoviesDataset_v41.csv"))?;
//!
//! let row = store.first_row_with_title("Toy Story").unwrap();
//! let movie = store.get_movie(row).unwrap();
//! println!("{} runs {:?} minutes", movie.title, movie.runtime);
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use parser::{parse_list_literal, to_list_literal};
pub use types::{MovieRecord, MovieStore, RowId};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_creation() {
        let store = MovieStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_movie() {
        let mut store = MovieStore::new();

        let mut movie = MovieRecord::new("Toy Story", "Led by Woody, Andy's toys live happily");
        movie.release_year = Some(1995);
        movie.runtime = Some(81.0);

        let row = store.insert_movie(movie);
        store.build_secondary_indices();

        let retrieved = store.get_movie(row).unwrap();
        assert_eq!(retrieved.title, "Toy Story");
        assert_eq!(retrieved.release_year, Some(1995));
        assert_eq!(store.first_row_with_title("Toy Story"), Some(0));
    }

    #[test]
    fn test_record_helpers() {
        let mut movie = MovieRecord::new("Heat", "Robbers and cops")
            .with_countries(&["United States of America"]);
        assert_eq!(movie.synopsis(), "Heat Robbers and cops");
        assert_eq!(movie.countries_raw, "['United States of America']");
        assert_eq!(movie.sole_director(), None);

        movie.directors = vec!["Michael Mann".to_string()];
        assert_eq!(movie.sole_director(), Some("Michael Mann"));
    }

    #[test]
    fn test_empty_queries() {
        let store = MovieStore::new();

        // Querying non-existent data should return None or empty slices
        assert!(store.get_movie(999).is_none());
        assert!(store.rows_with_title("Nothing").is_empty());
        assert!(store.rows_with_language("xx").is_empty());
        assert!(store.rows_in_collection("None Collection").is_empty());
        assert!(store.rows_for_director("Nobody").is_empty());
        assert!(!store.has_country("Atlantis"));
        assert!(!store.has_company("Acme"));
    }
}
