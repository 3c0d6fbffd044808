//! HTTP routes.
//!
//! Every endpoint answers `200` with a JSON object. A lookup that finds
//! nothing echoes its key with a " no existe en DB" suffix and nulls out
//! the numeric fields, which is the contract existing clients rely on.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ModelConfig;
use crate::error::ServiceError;
use crate::queries::{DirectorMovie, Lookup, QueryService};
use crate::recommender::RecommendationEngine;
use data_loader::MovieStore;

/// Appended to the echoed key when a lookup has no match
pub const NOT_FOUND_SUFFIX: &str = " no existe en DB";
/// Appended to the title when it is not in the recommendation catalog
pub const NOT_IN_MODEL_SUFFIX: &str = " no existe en DB p/ML";
pub const API_VERSION: &str = "v7";

/// Everything a request handler can read. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct AppState {
    pub queries: QueryService,
    pub engine: RecommendationEngine,
    pub n_components: usize,
}

impl AppState {
    /// Index an already-loaded store and build the recommendation model.
    pub fn new(store: MovieStore, config: &ModelConfig) -> Result<Self> {
        let store = Arc::new(store);
        let engine = RecommendationEngine::build(&store, config)?;
        Ok(Self {
            queries: QueryService::new(store, config.membership),
            engine,
            n_components: config.n_components,
        })
    }

    /// Load the dataset named in `config` and build everything.
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let start = Instant::now();
        let store = MovieStore::load_from_file(&config.data_path)
            .with_context(|| format!("Failed to load dataset from {}", config.data_path.display()))?;
        let state = Self::new(store, config)?;
        info!("Application state ready in {:.2?}", start.elapsed());
        Ok(state)
    }
}

// =============================================================================
// Response bodies
// =============================================================================

#[derive(Debug, Serialize)]
pub struct LanguageResponse {
    pub idioma: String,
    pub cantidad: i64,
}

#[derive(Debug, Serialize)]
pub struct DurationResponse {
    pub pelicula: String,
    pub duracion: Option<f64>,
    pub anio: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FranchiseResponse {
    pub franquicia: String,
    pub cantidad: i64,
    pub ganancia_total: i64,
    pub ganancia_promedio: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CountryResponse {
    pub pais: String,
    pub cantidad: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProducerResponse {
    pub productora: String,
    pub revenue_total: Option<i64>,
    pub cantidad: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DirectorResponse {
    pub director: String,
    pub retorno_total_director: Option<i64>,
    pub cantidad_peliculas: Option<i64>,
    pub peliculas: Option<Vec<DirectorMovie>>,
}

/// Either the recommended titles or the not-in-model message
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RecommendationList {
    Titles(Vec<String>),
    Missing(String),
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    #[serde(rename = "lista recomendada")]
    pub lista_recomendada: RecommendationList,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub componentes: usize,
}

fn not_found(key: &str) -> String {
    format!("{key}{NOT_FOUND_SUFFIX}")
}

// =============================================================================
// Router
// =============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/peliculas_idioma/:idioma", get(peliculas_idioma))
        .route("/peliculas_duracion/:pelicula", get(peliculas_duracion))
        .route("/franquicia/:franquicia", get(franquicia))
        .route("/peliculas_pais/:pais", get(peliculas_pais))
        .route("/productoras_exitosas/:productora", get(productoras_exitosas))
        .route("/get_director/:nombre_director", get(get_director))
        .route("/recomendacion/:titulo", get(recomendacion))
        .route("/version", get(version))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn peliculas_idioma(
    State(state): State<Arc<AppState>>,
    Path(idioma): Path<String>,
) -> Json<LanguageResponse> {
    let result = state.queries.movies_by_language(&idioma);
    Json(LanguageResponse {
        idioma: result.language,
        cantidad: result.count,
    })
}

async fn peliculas_duracion(
    State(state): State<Arc<AppState>>,
    Path(pelicula): Path<String>,
) -> Json<DurationResponse> {
    Json(match state.queries.movie_duration(&pelicula) {
        Lookup::Found(movie) => DurationResponse {
            pelicula: movie.title,
            duracion: movie.runtime,
            anio: movie.release_year,
        },
        Lookup::NotFound(key) => DurationResponse {
            pelicula: not_found(&key),
            duracion: None,
            anio: None,
        },
    })
}

async fn franquicia(
    State(state): State<Arc<AppState>>,
    Path(franquicia): Path<String>,
) -> Json<FranchiseResponse> {
    let stats = state.queries.franchise(&franquicia);
    Json(FranchiseResponse {
        franquicia: stats.franchise,
        cantidad: stats.count,
        ganancia_total: stats.revenue_total,
        ganancia_promedio: stats.revenue_mean,
    })
}

async fn peliculas_pais(
    State(state): State<Arc<AppState>>,
    Path(pais): Path<String>,
) -> Json<CountryResponse> {
    Json(match state.queries.movies_by_country(&pais) {
        Lookup::Found(result) => CountryResponse {
            pais: result.country,
            cantidad: Some(result.count),
        },
        Lookup::NotFound(key) => CountryResponse {
            pais: not_found(&key),
            cantidad: None,
        },
    })
}

async fn productoras_exitosas(
    State(state): State<Arc<AppState>>,
    Path(productora): Path<String>,
) -> Json<ProducerResponse> {
    Json(match state.queries.successful_producer(&productora) {
        Lookup::Found(stats) => ProducerResponse {
            productora: stats.company,
            revenue_total: Some(stats.revenue_total),
            cantidad: Some(stats.count),
        },
        Lookup::NotFound(key) => ProducerResponse {
            productora: not_found(&key),
            revenue_total: None,
            cantidad: None,
        },
    })
}

async fn get_director(
    State(state): State<Arc<AppState>>,
    Path(nombre_director): Path<String>,
) -> Json<DirectorResponse> {
    Json(match state.queries.director(&nombre_director) {
        Lookup::Found(stats) => DirectorResponse {
            director: stats.director,
            retorno_total_director: Some(stats.return_total),
            cantidad_peliculas: Some(stats.count),
            peliculas: Some(stats.movies),
        },
        Lookup::NotFound(key) => DirectorResponse {
            director: not_found(&key),
            retorno_total_director: None,
            cantidad_peliculas: None,
            peliculas: None,
        },
    })
}

async fn recomendacion(
    State(state): State<Arc<AppState>>,
    Path(titulo): Path<String>,
) -> Result<Json<RecommendationResponse>, StatusCode> {
    let lista_recomendada = match state.engine.recommend(&titulo) {
        Ok(titles) => RecommendationList::Titles(titles),
        Err(ServiceError::NotFound(_) | ServiceError::InvalidInput(_)) => {
            RecommendationList::Missing(format!("{titulo}{NOT_IN_MODEL_SUFFIX}"))
        }
        Err(e) => {
            error!("recommendation for '{}' failed: {}", titulo, e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    Ok(Json(RecommendationResponse { lista_recomendada }))
}

async fn version(State(state): State<Arc<AppState>>) -> Json<VersionResponse> {
    Json(VersionResponse {
        version: API_VERSION,
        componentes: state.n_components,
    })
}
