//! # Recommendation Engine
//!
//! Built once at startup, read-only afterwards:
//! 1. Filter the dataset down to the catalog (popularity above a threshold)
//! 2. Build the joint synopsis / collection / genre feature vectors
//! 3. Fit the cosine nearest-neighbour index over them
//!
//! Per request, a title is resolved to its first catalog position, its
//! neighbours are fetched, and their positions mapped back to titles.

use std::collections::HashMap;
use std::time::Instant;

use anyhow::{Context, Result};
use ndarray::ArrayView1;
use tracing::{debug, info, instrument};

use crate::config::ModelConfig;
use crate::error::ServiceError;
use data_loader::{MovieStore, RowId};
use pipeline::filters::MinimumPopularityFilter;
use pipeline::{FeatureBuilder, FeatureConfig, FilterPipeline, MovieDocuments};
use similarity::NearestNeighbors;

/// Content-based recommender over the popular part of the catalog.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    /// Catalog titles, aligned with the rows of the index
    titles: Vec<String>,
    /// Store row of every catalog position
    rows: Vec<RowId>,
    /// First catalog position of every title
    positions: HashMap<String, usize>,
    index: NearestNeighbors,
}

impl RecommendationEngine {
    /// Filter, vectorize and index the store.
    ///
    /// CPU bound and slow on the full dataset; async callers should run it
    /// on a blocking thread.
    pub fn build(store: &MovieStore, config: &ModelConfig) -> Result<Self> {
        let start_time = Instant::now();

        let rows = FilterPipeline::new()
            .add_filter(MinimumPopularityFilter::new(config.popularity_threshold))
            .catalog(store)
            .context("Failed to filter the catalog")?;
        info!(
            "Catalog has {} of {} movies (popularity > {})",
            rows.len(),
            store.len(),
            config.popularity_threshold
        );

        let documents = MovieDocuments::from_rows(store, &rows);
        let features = FeatureBuilder::new(FeatureConfig {
            n_components: config.n_components,
            seed: config.seed,
        })
        .build(&documents)
        .context("Failed to build feature vectors")?;

        let fit_start = Instant::now();
        let index = NearestNeighbors::fit(features.into_array(), config.n_neighbors);
        info!("Fitted similarity index in {:.2?}", fit_start.elapsed());

        let titles: Vec<String> = rows
            .iter()
            .filter_map(|&row| store.get_movie(row))
            .map(|movie| movie.title.clone())
            .collect();
        let mut positions = HashMap::with_capacity(titles.len());
        for (position, title) in titles.iter().enumerate() {
            positions.entry(title.clone()).or_insert(position);
        }

        info!(
            "Recommendation engine ready in {:.2?}",
            start_time.elapsed()
        );
        Ok(Self {
            titles,
            rows,
            positions,
            index,
        })
    }

    /// Titles most similar to `title`, closest first.
    ///
    /// The query movie's own catalog position is never returned, though a
    /// different movie sharing its title can be.
    #[instrument(skip(self))]
    pub fn recommend(&self, title: &str) -> Result<Vec<String>, ServiceError> {
        if title.trim().is_empty() {
            return Err(ServiceError::InvalidInput("empty title".to_string()));
        }
        let &position = self
            .positions
            .get(title)
            .ok_or_else(|| ServiceError::NotFound(title.to_string()))?;

        let k = self.index.n_neighbors();
        let neighbors = self.index.kneighbors_of_row(position, k)?;
        let recommendations: Vec<String> = neighbors
            .iter()
            .filter(|n| n.index != position)
            .take(k.saturating_sub(1))
            .filter_map(|n| self.titles.get(n.index).cloned())
            .collect();

        debug!("{} recommendations for '{}'", recommendations.len(), title);
        Ok(recommendations)
    }

    /// Catalog titles in catalog order (duplicates included)
    pub fn catalog_titles(&self) -> &[String] {
        &self.titles
    }

    pub fn catalog_len(&self) -> usize {
        self.titles.len()
    }

    /// Store row backing a catalog position
    pub fn catalog_row(&self, position: usize) -> Option<RowId> {
        self.rows.get(position).copied()
    }

    /// Whether `title` is recommendable
    pub fn contains(&self, title: &str) -> bool {
        self.positions.contains_key(title)
    }

    /// Feature vector at a catalog position
    pub fn feature_row(&self, position: usize) -> Option<ArrayView1<'_, f64>> {
        self.index.row(position)
    }

    /// Length of every feature vector
    pub fn feature_dim(&self) -> usize {
        self.index.dim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::MovieRecord;

    fn movie(title: &str, overview: &str, collection: &str, genres: &str, popularity: f64) -> MovieRecord {
        let mut movie = MovieRecord::new(title, overview);
        movie.collection = collection.to_string();
        movie.genres = genres.to_string();
        movie.popularity = Some(popularity);
        movie
    }

    fn create_test_store() -> MovieStore {
        MovieStore::from_movies(vec![
            movie("Alien", "Crew of a spaceship meets a deadly alien creature", "Alien Collection", "['Horror', 'Science Fiction']", 20.0),
            movie("Aliens", "Ripley returns to fight the alien creatures", "Alien Collection", "['Action', 'Science Fiction']", 18.0),
            movie("Alien 3", "Ripley crash lands on a prison planet with an alien", "Alien Collection", "['Science Fiction']", 12.0),
            movie("Heat", "A detective hunts a crew of bank robbers in Los Angeles", "", "['Crime', 'Drama']", 15.0),
            movie("Obscure", "A movie nobody watched", "", "['Drama']", 1.0),
            movie("Toy Story", "Toys come to life when nobody is watching", "Toy Story Collection", "['Animation', 'Family']", 21.0),
            movie("Toy Story 2", "Woody the toy is stolen by a collector", "Toy Story Collection", "['Animation', 'Family']", 17.0),
            movie("Alien", "A remake with the same title", "", "['Horror']", 9.0),
        ])
    }

    fn config() -> ModelConfig {
        ModelConfig {
            n_components: 8,
            n_neighbors: 4,
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_catalog_excludes_unpopular_movies() {
        let store = create_test_store();
        let engine = RecommendationEngine::build(&store, &config()).unwrap();

        assert_eq!(engine.catalog_len(), 7);
        assert!(!engine.contains("Obscure"));
        assert_eq!(engine.catalog_row(4), Some(5));
        assert_eq!(engine.feature_dim(), 24);
        assert_eq!(engine.feature_row(0).unwrap().len(), 24);
    }

    #[test]
    fn test_recommend_excludes_query_position() {
        let store = create_test_store();
        let engine = RecommendationEngine::build(&store, &config()).unwrap();

        let recommendations = engine.recommend("Toy Story").unwrap();
        assert_eq!(recommendations.len(), 3);
        assert!(!recommendations.contains(&"Toy Story".to_string()));
        assert_eq!(recommendations[0], "Toy Story 2");
    }

    #[test]
    fn test_recommendations_follow_neighbor_order() {
        let store = create_test_store();
        let config = ModelConfig::default();
        let engine = RecommendationEngine::build(&store, &config).unwrap();
        let k = config.n_neighbors;

        for (position, title) in engine.catalog_titles().iter().enumerate() {
            // duplicate titles resolve to their first position
            if engine.positions[title] != position {
                continue;
            }
            let neighbors: Vec<_> = engine
                .index
                .kneighbors_of_row(position, k)
                .unwrap()
                .into_iter()
                .filter(|n| n.index != position)
                .take(k - 1)
                .collect();
            assert!(neighbors.windows(2).all(|w| w[0].distance <= w[1].distance));

            let expected: Vec<String> = neighbors
                .iter()
                .map(|n| engine.catalog_titles()[n.index].clone())
                .collect();
            let recommendations = engine.recommend(title).unwrap();
            assert!(recommendations.len() <= 5);
            assert_eq!(recommendations, expected, "recommendations for {title}");
        }
    }

    #[test]
    fn test_duplicate_title_may_be_recommended() {
        let twin = movie("Twin", "Two identical rows", "Twin Collection", "['Drama']", 30.0);
        let mut movies = create_test_store().movies().to_vec();
        movies.push(twin.clone());
        movies.push(twin);
        let store = MovieStore::from_movies(movies);
        let engine = RecommendationEngine::build(&store, &config()).unwrap();

        // the second copy sits at distance zero from the first
        let recommendations = engine.recommend("Twin").unwrap();
        assert_eq!(recommendations[0], "Twin");
        assert_eq!(recommendations.iter().filter(|t| t.as_str() == "Twin").count(), 1);
    }

    #[test]
    fn test_recommend_unknown_or_filtered_title() {
        let store = create_test_store();
        let engine = RecommendationEngine::build(&store, &config()).unwrap();

        assert_eq!(
            engine.recommend("Obscure"),
            Err(ServiceError::NotFound("Obscure".to_string()))
        );
        assert_eq!(
            engine.recommend("Missing"),
            Err(ServiceError::NotFound("Missing".to_string()))
        );
        assert!(matches!(engine.recommend("  "), Err(ServiceError::InvalidInput(_))));
    }

    #[test]
    fn test_recommend_is_idempotent() {
        let store = create_test_store();
        let engine = RecommendationEngine::build(&store, &config()).unwrap();
        assert_eq!(engine.recommend("Heat"), engine.recommend("Heat"));
    }
}
