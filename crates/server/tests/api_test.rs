//! End-to-end tests of the HTTP routes over a small in-memory dataset.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use data_loader::MovieStore;
use server::{router, AppState, ModelConfig};

const DATASET: &str = "\
title,overview,genres,btc_name,original_language,countries,companies,Directors,runtime,release_year,budget,revenue,return,popularity
Toy Story,Led by Woody Andy's toys live happily,\"['Animation', 'Comedy', 'Family']\",Toy Story Collection,en,\"['United States of America']\",\"['Pixar Animation Studios']\",['John Lasseter'],81.0,1995,30000000,373554033,12.45,21.9
Toy Story 2,Andy heads off to Cowboy Camp leaving his toys,\"['Animation', 'Comedy', 'Family']\",Toy Story Collection,en,\"['United States of America']\",\"['Pixar Animation Studios', 'Walt Disney Pictures']\",['John Lasseter'],92.0,1999,90000000,497366869,5.52,17.5
Heat,Obsessive master thief McCauley leads a crew of robbers,\"['Action', 'Crime', 'Drama']\",,en,\"['United States of America']\",\"['Regency Enterprises']\",['Michael Mann'],170.0,1995,60000000,187436818,3.12,17.9
Amélie,A shy waitress decides to change the lives of people in Paris,\"['Comedy', 'Romance']\",,fr,\"['France', 'Germany']\",\"['Miramax Films']\",\"['Jean-Pierre Jeunet']\",122.0,2001,10000000,173921954,17.39,12.0
Lagaan,A village stakes its future on a cricket match,\"['Drama', 'History']\",,hi,\"['India']\",\"['Aamir Khan Productions']\",['Ashutosh Gowariker'],224.0,2001,,,,3.1
Alien,The crew of a spaceship meets a deadly creature,\"['Horror', 'Science Fiction']\",Alien Collection,en,\"['United Kingdom', 'United States of America']\",\"['Brandywine Productions']\",['Ridley Scott'],117.0,1979,11000000,104931801,9.54,23.4
Aliens,Ripley returns to the planet of the creature,\"['Horror', 'Action', 'Science Fiction']\",Alien Collection,en,\"['United Kingdom', 'United States of America']\",\"['Brandywine Productions']\",['James Cameron'],137.0,1986,18500000,183316455,9.91,21.7
";

fn app() -> axum::Router {
    let store = MovieStore::from_reader(DATASET.as_bytes()).unwrap();
    let config = ModelConfig {
        n_components: 8,
        ..ModelConfig::default()
    };
    let state = AppState::new(store, &config).unwrap();
    router(Arc::new(state))
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_language_count() {
    let (status, body) = get("/peliculas_idioma/en").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"idioma": "en", "cantidad": 5}));

    let (_, body) = get("/peliculas_idioma/xx").await;
    assert_eq!(body, json!({"idioma": "xx", "cantidad": 0}));
}

#[tokio::test]
async fn test_duration() {
    let (_, body) = get("/peliculas_duracion/Toy%20Story").await;
    assert_eq!(body, json!({"pelicula": "Toy Story", "duracion": 81.0, "anio": 1995}));

    let (status, body) = get("/peliculas_duracion/Nope").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"pelicula": "Nope no existe en DB", "duracion": null, "anio": null})
    );
}

#[tokio::test]
async fn test_franchise() {
    let (_, body) = get("/franquicia/Toy%20Story%20Collection").await;
    assert_eq!(
        body,
        json!({
            "franquicia": "Toy Story Collection",
            "cantidad": 2,
            "ganancia_total": 870920902i64,
            "ganancia_promedio": 435460451i64
        })
    );

    let (_, body) = get("/franquicia/Unknown").await;
    assert_eq!(body["cantidad"], 0);
    assert_eq!(body["ganancia_total"], 0);
    assert!(body["ganancia_promedio"].is_null());
}

#[tokio::test]
async fn test_country() {
    let (_, body) = get("/peliculas_pais/United%20Kingdom").await;
    assert_eq!(body, json!({"pais": "United Kingdom", "cantidad": 2}));

    let (_, body) = get("/peliculas_pais/Atlantis").await;
    assert_eq!(body, json!({"pais": "Atlantis no existe en DB", "cantidad": null}));
}

#[tokio::test]
async fn test_producer() {
    let (_, body) = get("/productoras_exitosas/Pixar%20Animation%20Studios").await;
    assert_eq!(
        body,
        json!({"productora": "Pixar Animation Studios", "revenue_total": 870920902i64, "cantidad": 2})
    );

    let (_, body) = get("/productoras_exitosas/Nobody").await;
    assert_eq!(
        body,
        json!({"productora": "Nobody no existe en DB", "revenue_total": null, "cantidad": null})
    );
}

#[tokio::test]
async fn test_director() {
    let (_, body) = get("/get_director/John%20Lasseter").await;
    assert_eq!(body["director"], "John Lasseter");
    assert_eq!(body["retorno_total_director"], 17);
    assert_eq!(body["cantidad_peliculas"], 2);
    assert_eq!(
        body["peliculas"][0],
        json!({
            "title": "Toy Story",
            "release_year": 1995,
            "return": 12.45,
            "budget": 30000000.0,
            "revenue": 373554033.0
        })
    );

    let (_, body) = get("/get_director/Nobody").await;
    assert_eq!(
        body,
        json!({
            "director": "Nobody no existe en DB",
            "retorno_total_director": null,
            "cantidad_peliculas": null,
            "peliculas": null
        })
    );
}

#[tokio::test]
async fn test_recommendation() {
    let (status, body) = get("/recomendacion/Toy%20Story").await;
    assert_eq!(status, StatusCode::OK);

    let titles = body["lista recomendada"].as_array().unwrap();
    assert_eq!(titles.len(), 5);
    assert_eq!(titles[0], "Toy Story 2");
    assert!(titles.iter().all(|t| t != "Toy Story"));
}

fn encode_path(segment: &str) -> String {
    segment
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' => (b as char).to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect()
}

fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm = |v: &[f64]| v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm(a) == 0.0 || norm(b) == 0.0 {
        1.0
    } else {
        1.0 - dot / (norm(a) * norm(b))
    }
}

#[tokio::test]
async fn test_every_recommendation_is_closest_first() {
    let store = MovieStore::from_reader(DATASET.as_bytes()).unwrap();
    let config = ModelConfig {
        n_components: 8,
        ..ModelConfig::default()
    };
    let state = AppState::new(store, &config).unwrap();
    let engine = &state.engine;
    let rows: Vec<Vec<f64>> = (0..engine.catalog_len())
        .map(|i| engine.feature_row(i).unwrap().to_vec())
        .collect();

    for (position, title) in engine.catalog_titles().iter().enumerate() {
        let (_, body) = get(&format!("/recomendacion/{}", encode_path(title))).await;
        let titles: Vec<&str> = body["lista recomendada"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t.as_str().unwrap())
            .collect();
        assert!(titles.len() <= 5);

        let distances: Vec<f64> = titles
            .iter()
            .map(|t| {
                let other = engine.catalog_titles().iter().position(|c| c.as_str() == *t).unwrap();
                cosine_distance(&rows[position], &rows[other])
            })
            .collect();
        assert!(
            distances.windows(2).all(|w| w[0] <= w[1] + 1e-12),
            "{title}: {distances:?}"
        );
    }
}

#[tokio::test]
async fn test_recommendation_outside_catalog() {
    // Lagaan is in the dataset but below the popularity threshold
    let (_, body) = get("/recomendacion/Lagaan").await;
    assert_eq!(body, json!({"lista recomendada": "Lagaan no existe en DB p/ML"}));
}

#[tokio::test]
async fn test_version() {
    let (_, body) = get("/version").await;
    assert_eq!(body, json!({"version": "v7", "componentes": 8}));
}

#[tokio::test]
async fn test_repeated_calls_are_identical() {
    let (_, first) = get("/recomendacion/Heat").await;
    let (_, second) = get("/recomendacion/Heat").await;
    assert_eq!(first, second);
}
