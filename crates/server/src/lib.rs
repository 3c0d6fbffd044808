//! Server crate for the movie information and recommendation API.
//!
//! - **queries**: filter/aggregate lookups answered from the dataset
//! - **recommender**: the content-based recommendation engine
//! - **api**: axum routes exposing both over HTTP
//! - **config**: command line and runtime settings

pub mod api;
pub mod config;
pub mod error;
pub mod queries;
pub mod recommender;

pub use api::{router, AppState};
pub use config::{MembershipMode, ModelArgs, ModelConfig, ServerConfig};
pub use error::ServiceError;
pub use queries::{Lookup, QueryService};
pub use recommender::RecommendationEngine;
