//! Core domain types for the movie dataset.
//!
//! One `MovieRecord` per CSV row, and the `MovieStore` that owns them all
//! together with the lookup indices built at load time. Nothing in here is
//! mutated after startup.

use std::collections::{HashMap, HashSet};

use crate::parser::to_list_literal;

// =============================================================================
// Type Aliases
// =============================================================================

/// Position of a record in load order.
///
/// Titles are not unique in the dataset, so rows are addressed by position.
pub type RowId = usize;

// =============================================================================
// Movie Record
// =============================================================================

/// One row of the movie dataset.
///
/// List-valued columns are parsed once when the file is loaded. The raw text
/// of `countries` and `companies` is kept next to the parsed list because
/// the country and company queries can match on the serialized form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieRecord {
    pub title: String,
    pub overview: String,
    /// Genre tags exactly as stored in the dataset (a serialized list)
    pub genres: String,
    /// Collection / franchise name, empty when the movie belongs to none
    pub collection: String,
    pub original_language: String,
    pub countries: Vec<String>,
    pub countries_raw: String,
    pub companies: Vec<String>,
    pub companies_raw: String,
    pub directors: Vec<String>,
    /// Runtime in minutes
    pub runtime: Option<f64>,
    pub release_year: Option<i32>,
    pub budget: Option<f64>,
    pub revenue: Option<f64>,
    /// Revenue / budget ratio
    pub return_ratio: Option<f64>,
    pub popularity: Option<f64>,
}

impl MovieRecord {
    /// Create a record with only a title and overview set.
    pub fn new(title: impl Into<String>, overview: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            overview: overview.into(),
            ..Self::default()
        }
    }

    /// Set the production countries, keeping the raw column in sync.
    pub fn with_countries<S: AsRef<str>>(mut self, countries: &[S]) -> Self {
        self.countries = countries.iter().map(|c| c.as_ref().to_string()).collect();
        self.countries_raw = to_list_literal(&self.countries);
        self
    }

    /// Set the production companies, keeping the raw column in sync.
    pub fn with_companies<S: AsRef<str>>(mut self, companies: &[S]) -> Self {
        self.companies = companies.iter().map(|c| c.as_ref().to_string()).collect();
        self.companies_raw = to_list_literal(&self.companies);
        self
    }

    /// Title and overview joined with a single space, the text used for
    /// synopsis features.
    pub fn synopsis(&self) -> String {
        format!("{} {}", self.title, self.overview)
    }

    /// The director name when the movie has exactly one director.
    pub fn sole_director(&self) -> Option<&str> {
        match self.directors.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}

// =============================================================================
// MovieStore - The In-Memory Table
// =============================================================================

/// Main data structure that holds every record and its lookup indices.
///
/// Records are stored in load order; every index maps a key to the row
/// positions carrying it, also in load order, so "first occurrence" is
/// always the first element of a slice.
#[derive(Debug, Default)]
pub struct MovieStore {
    // Primary data
    pub(crate) movies: Vec<MovieRecord>,

    // Secondary indices
    pub(crate) title_index: HashMap<String, Vec<RowId>>,
    pub(crate) language_index: HashMap<String, Vec<RowId>>,
    pub(crate) collection_index: HashMap<String, Vec<RowId>>,
    /// Rows whose director list holds exactly one name, keyed by that name
    pub(crate) director_index: HashMap<String, Vec<RowId>>,
    /// Every country name appearing in any row
    pub(crate) country_names: HashSet<String>,
    /// Every production company name appearing in any row
    pub(crate) company_names: HashSet<String>,
}

impl MovieStore {
    /// Creates a new, empty MovieStore
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-parsed records and index it.
    pub fn from_movies(movies: Vec<MovieRecord>) -> Self {
        let mut store = Self::new();
        for movie in movies {
            store.insert_movie(movie);
        }
        store.build_secondary_indices();
        store
    }

    /// Get a record by row position
    pub fn get_movie(&self, row: RowId) -> Option<&MovieRecord> {
        self.movies.get(row)
    }

    /// All records in load order
    pub fn movies(&self) -> &[MovieRecord] {
        &self.movies
    }

    /// Rows whose title is exactly `title`
    pub fn rows_with_title(&self, title: &str) -> &[RowId] {
        self.title_index
            .get(title)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// First row (in load order) whose title is exactly `title`
    pub fn first_row_with_title(&self, title: &str) -> Option<RowId> {
        self.rows_with_title(title).first().copied()
    }

    /// Rows whose original language code is exactly `language`
    pub fn rows_with_language(&self, language: &str) -> &[RowId] {
        self.language_index
            .get(language)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Rows belonging to the named collection
    pub fn rows_in_collection(&self, collection: &str) -> &[RowId] {
        self.collection_index
            .get(collection)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Rows directed solely by `director`
    pub fn rows_for_director(&self, director: &str) -> &[RowId] {
        self.director_index
            .get(director)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether any row lists `country` among its production countries
    pub fn has_country(&self, country: &str) -> bool {
        self.country_names.contains(country)
    }

    /// Whether any row lists `company` among its production companies
    pub fn has_company(&self, company: &str) -> bool {
        self.company_names.contains(company)
    }

    /// Append a record. Call `build_secondary_indices` once all records are in.
    pub fn insert_movie(&mut self, movie: MovieRecord) -> RowId {
        self.movies.push(movie);
        self.movies.len() - 1
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}
