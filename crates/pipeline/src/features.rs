//! Feature engineering for content-based similarity.
//!
//! Each catalog movie gets one dense vector made of three blocks, in this
//! order:
//! 1. synopsis: title + overview, TF-IDF without English stop words
//! 2. collection name, TF-IDF over the raw vocabulary
//! 3. genre tags, TF-IDF over the raw vocabulary
//!
//! Every block is reduced to `n_components` columns by its own truncated
//! SVD, so rows are `3 * n_components` long.

use crate::svd::TruncatedSvd;
use crate::tfidf::TfidfVectorizer;
use anyhow::{ensure, Result};
use data_loader::{MovieStore, RowId};
use ndarray::{concatenate, Array2, ArrayView1, Axis};
use std::time::Instant;
use tracing::{debug, info};

/// The three text sources of every catalog movie, positionally aligned.
#[derive(Debug, Clone, Default)]
pub struct MovieDocuments {
    pub synopses: Vec<String>,
    pub collections: Vec<String>,
    pub genres: Vec<String>,
}

impl MovieDocuments {
    /// Collect the text columns for `rows`, in the order given.
    ///
    /// Rows missing from the store are skipped.
    pub fn from_rows(store: &MovieStore, rows: &[RowId]) -> Self {
        let mut documents = Self::default();
        for movie in rows.iter().filter_map(|&row| store.get_movie(row)) {
            documents.synopses.push(movie.synopsis());
            documents.collections.push(movie.collection.clone());
            documents.genres.push(movie.genres.clone());
        }
        documents
    }

    pub fn len(&self) -> usize {
        self.synopses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synopses.is_empty()
    }
}

/// Settings for the feature builder.
#[derive(Debug, Clone, Copy)]
pub struct FeatureConfig {
    /// Columns per block
    pub n_components: usize,
    /// Seed of the randomized SVD
    pub seed: u64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            n_components: 100,
            seed: 0,
        }
    }
}

/// Dense feature vectors, one row per catalog movie.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Array2<f64>,
}

impl FeatureMatrix {
    pub fn new(data: Array2<f64>) -> Self {
        Self { data }
    }

    pub fn row(&self, i: usize) -> Option<ArrayView1<'_, f64>> {
        (i < self.data.nrows()).then(|| self.data.row(i))
    }

    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    /// Length of every row
    pub fn dim(&self) -> usize {
        self.data.ncols()
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn into_array(self) -> Array2<f64> {
        self.data
    }
}

/// Builds feature vectors for a catalog.
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    config: FeatureConfig,
}

impl FeatureBuilder {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> FeatureConfig {
        self.config
    }

    /// Vectorize, reduce and concatenate the three sources.
    ///
    /// The three sources are independent, so they run in parallel.
    pub fn build(&self, documents: &MovieDocuments) -> Result<FeatureMatrix> {
        let n = documents.len();
        ensure!(
            documents.collections.len() == n && documents.genres.len() == n,
            "misaligned documents: {} synopses, {} collections, {} genres",
            n,
            documents.collections.len(),
            documents.genres.len()
        );

        let start = Instant::now();
        let (synopsis, (collection, genre)) = rayon::join(
            || self.reduce("synopsis", TfidfVectorizer::new().with_english_stop_words(), &documents.synopses),
            || {
                rayon::join(
                    || self.reduce("collection", TfidfVectorizer::new(), &documents.collections),
                    || self.reduce("genre", TfidfVectorizer::new(), &documents.genres),
                )
            },
        );

        let data = concatenate(Axis(1), &[synopsis.view(), collection.view(), genre.view()])?;
        info!(
            "Built {}x{} feature matrix in {:.2?}",
            data.nrows(),
            data.ncols(),
            start.elapsed()
        );
        Ok(FeatureMatrix::new(data))
    }

    fn reduce(&self, source: &str, vectorizer: TfidfVectorizer, documents: &[String]) -> Array2<f64> {
        let tfidf = vectorizer.fit_transform(documents);
        debug!(
            "{} vocabulary: {} terms, {} non-zeros",
            source,
            tfidf.vocabulary.len(),
            tfidf.matrix.nnz()
        );
        TruncatedSvd::new(self.config.n_components)
            .with_seed(self.config.seed)
            .fit_transform(&tfidf.matrix)
    }
}
