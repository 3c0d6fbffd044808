//! Filter and aggregate queries answered straight from the dataset.
//!
//! These never touch the feature pipeline. Lookups keyed on a single entity
//! (a title, a country, a company, a director) return [`Lookup::NotFound`]
//! with the key echoed back; plain counts are always defined.
//!
//! Every sum and mean is truncated toward zero to an integer, and missing
//! numeric values are skipped rather than treated as zero.

use crate::config::MembershipMode;
use data_loader::{MovieRecord, MovieStore, RowId};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Result of a keyed lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    /// The key that had no match
    NotFound(String),
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageCount {
    pub language: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieDuration {
    pub title: String,
    /// Minutes, as stored
    pub runtime: Option<f64>,
    pub release_year: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FranchiseStats {
    pub franchise: String,
    pub count: i64,
    pub revenue_total: i64,
    /// `None` when no member has a revenue value
    pub revenue_mean: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryCount {
    pub country: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProducerStats {
    pub company: String,
    pub revenue_total: i64,
    pub count: i64,
}

/// One movie of a director, as listed in the director report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectorMovie {
    pub title: String,
    pub release_year: Option<i32>,
    #[serde(rename = "return")]
    pub return_ratio: Option<f64>,
    pub budget: Option<f64>,
    pub revenue: Option<f64>,
}

impl From<&MovieRecord> for DirectorMovie {
    fn from(movie: &MovieRecord) -> Self {
        Self {
            title: movie.title.clone(),
            release_year: movie.release_year,
            return_ratio: movie.return_ratio,
            budget: movie.budget,
            revenue: movie.revenue,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectorStats {
    pub director: String,
    /// Sum of the per-movie `return` ratios, truncated.
    ///
    /// Served as `retorno_total_director`. It sums the `return` column, not
    /// `revenue`.
    pub return_total: i64,
    pub count: i64,
    pub movies: Vec<DirectorMovie>,
}

/// Stateless queries over a shared, read-only store.
#[derive(Debug, Clone)]
pub struct QueryService {
    store: Arc<MovieStore>,
    membership: MembershipMode,
}

impl QueryService {
    pub fn new(store: Arc<MovieStore>, membership: MembershipMode) -> Self {
        Self { store, membership }
    }

    pub fn store(&self) -> &MovieStore {
        &self.store
    }

    /// Number of movies whose original language is exactly `language`.
    #[instrument(skip(self))]
    pub fn movies_by_language(&self, language: &str) -> LanguageCount {
        LanguageCount {
            language: language.to_string(),
            count: self.store.rows_with_language(language).len() as i64,
        }
    }

    /// Runtime and release year of the first movie titled `title`.
    #[instrument(skip(self))]
    pub fn movie_duration(&self, title: &str) -> Lookup<MovieDuration> {
        let Some(movie) = self
            .store
            .first_row_with_title(title)
            .and_then(|row| self.store.get_movie(row))
        else {
            return Lookup::NotFound(title.to_string());
        };

        Lookup::Found(MovieDuration {
            title: title.to_string(),
            runtime: movie.runtime,
            release_year: movie.release_year.map(i64::from),
        })
    }

    /// Count and revenue of the movies in a collection.
    ///
    /// An unknown franchise is not an error: it has zero movies, zero total
    /// revenue and no mean.
    #[instrument(skip(self))]
    pub fn franchise(&self, franchise: &str) -> FranchiseStats {
        let rows = self.store.rows_in_collection(franchise);
        let revenues: Vec<f64> = self.values(rows, |m| m.revenue).collect();

        FranchiseStats {
            franchise: franchise.to_string(),
            count: rows.len() as i64,
            revenue_total: truncate(revenues.iter().sum::<f64>()),
            revenue_mean: mean(&revenues).map(truncate),
        }
    }

    /// Number of movies produced in `country`.
    #[instrument(skip(self))]
    pub fn movies_by_country(&self, country: &str) -> Lookup<CountryCount> {
        if !self.store.has_country(country) {
            return Lookup::NotFound(country.to_string());
        }

        let count = self
            .store
            .movies()
            .iter()
            .filter(|m| self.matches(&m.countries, &m.countries_raw, country))
            .count();
        Lookup::Found(CountryCount {
            country: country.to_string(),
            count: count as i64,
        })
    }

    /// Number of movies and total revenue of a production company.
    #[instrument(skip(self))]
    pub fn successful_producer(&self, company: &str) -> Lookup<ProducerStats> {
        if !self.store.has_company(company) {
            return Lookup::NotFound(company.to_string());
        }

        let movies: Vec<&MovieRecord> = self
            .store
            .movies()
            .iter()
            .filter(|m| self.matches(&m.companies, &m.companies_raw, company))
            .collect();
        let revenue_total: f64 = movies.iter().filter_map(|m| m.revenue).sum();

        Lookup::Found(ProducerStats {
            company: company.to_string(),
            revenue_total: truncate(revenue_total),
            count: movies.len() as i64,
        })
    }

    /// Every movie directed solely by `director`, with the summed return.
    #[instrument(skip(self))]
    pub fn director(&self, director: &str) -> Lookup<DirectorStats> {
        let rows = self.store.rows_for_director(director);
        if rows.is_empty() {
            return Lookup::NotFound(director.to_string());
        }

        let return_total: f64 = self.values(rows, |m| m.return_ratio).sum();
        let movies: Vec<DirectorMovie> = rows
            .iter()
            .filter_map(|&row| self.store.get_movie(row))
            .map(DirectorMovie::from)
            .collect();
        debug!("{} has {} movies", director, movies.len());

        Lookup::Found(DirectorStats {
            director: director.to_string(),
            return_total: truncate(return_total),
            count: rows.len() as i64,
            movies,
        })
    }

    fn matches(&self, names: &[String], raw: &str, name: &str) -> bool {
        match self.membership {
            MembershipMode::Substring => raw.contains(name),
            MembershipMode::Exact => names.iter().any(|n| n == name),
        }
    }

    /// The present values of one numeric column over `rows`
    fn values<'a>(
        &'a self,
        rows: &'a [RowId],
        column: impl Fn(&MovieRecord) -> Option<f64> + 'a,
    ) -> impl Iterator<Item = f64> + 'a {
        rows.iter()
            .filter_map(|&row| self.store.get_movie(row))
            .filter_map(column)
    }
}

fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}
