//! MovieStore building and indexing logic.
//!
//! Loading is: parse the CSV, append every record, build the secondary
//! indices, validate. After that the store is read-only.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::info;

impl MovieStore {
    /// Load the movie dataset from a CSV file.
    ///
    /// This is the main entry point for loading data.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading movie dataset from {:?}", path);
        let start = Instant::now();

        let movies = parser::parse_movies_file(path)?;
        let store = Self::build(movies)?;

        info!(
            "Loaded {} movies in {:.2?}",
            store.len(),
            start.elapsed()
        );
        Ok(store)
    }

    /// Load the movie dataset from any reader producing CSV text.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let movies = parser::parse_movies(reader)?;
        Self::build(movies)
    }

    fn build(movies: Vec<MovieRecord>) -> Result<Self> {
        let store = Self::from_movies(movies);
        store.validate()?;
        Ok(store)
    }

    /// Build secondary indices after primary data is loaded
    ///
    /// Safe to call more than once; every index is rebuilt from scratch.
    pub fn build_secondary_indices(&mut self) {
        self.title_index.clear();
        self.language_index.clear();
        self.collection_index.clear();
        self.director_index.clear();
        self.country_names.clear();
        self.company_names.clear();

        for (row, movie) in self.movies.iter().enumerate() {
            self.title_index
                .entry(movie.title.clone())
                .or_default()
                .push(row);

            if !movie.original_language.is_empty() {
                self.language_index
                    .entry(movie.original_language.clone())
                    .or_default()
                    .push(row);
            }

            if !movie.collection.is_empty() {
                self.collection_index
                    .entry(movie.collection.clone())
                    .or_default()
                    .push(row);
            }

            if let Some(director) = movie.sole_director() {
                self.director_index
                    .entry(director.to_string())
                    .or_default()
                    .push(row);
            }

            self.country_names.extend(movie.countries.iter().cloned());
            self.company_names.extend(movie.companies.iter().cloned());
        }
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - every record has a non-empty title
    /// - popularity, when present, is not negative
    pub fn validate(&self) -> Result<()> {
        for (row, movie) in self.movies.iter().enumerate() {
            if movie.title.trim().is_empty() {
                return Err(DataLoadError::ValidationError(format!(
                    "row {} has an empty title",
                    row
                )));
            }
            if let Some(popularity) = movie.popularity {
                if popularity < 0.0 {
                    return Err(DataLoadError::InvalidValue {
                        field: "popularity".to_string(),
                        value: popularity.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
