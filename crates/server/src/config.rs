//! Runtime configuration.
//!
//! Both binaries flatten [`ModelArgs`] into their own clap parser and turn
//! it into a [`ModelConfig`], which is what the library code consumes.

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// How country and company names are matched when counting rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MembershipMode {
    /// Substring of the serialized list text. `"India"` also counts rows
    /// listing `"British Indian Ocean Territory"`.
    #[default]
    Substring,
    /// Exact element of the parsed list
    Exact,
}

/// Settings for loading the dataset and building the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub data_path: PathBuf,
    /// Movies need a popularity strictly above this to be recommendable
    pub popularity_threshold: f64,
    /// Dense columns per text source
    pub n_components: usize,
    /// Neighbours fetched per query, the query movie included
    pub n_neighbors: usize,
    pub seed: u64,
    pub membership: MembershipMode,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("MoviesDataset_v41.csv"),
            popularity_threshold: 5.0,
            n_components: 100,
            n_neighbors: 6,
            seed: 0,
            membership: MembershipMode::Substring,
        }
    }
}

/// Settings for the HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: String,
    pub model: ModelConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:10000".to_string(),
            model: ModelConfig::default(),
        }
    }
}

/// Command line flags for [`ModelConfig`].
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Path to the movie dataset CSV
    #[arg(long, env = "MOVIES_DATASET", default_value = "MoviesDataset_v41.csv")]
    pub data_path: PathBuf,

    /// Minimum popularity (exclusive) for the recommendation catalog
    #[arg(long, default_value_t = 5.0)]
    pub popularity_threshold: f64,

    /// SVD components per text source
    #[arg(long, default_value_t = 100)]
    pub components: usize,

    /// Neighbours per recommendation query, the movie itself included
    #[arg(long, default_value_t = 6)]
    pub neighbors: usize,

    /// Seed of the randomized SVD
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Country and company matching
    #[arg(long, value_enum, default_value_t = MembershipMode::Substring)]
    pub membership: MembershipMode,
}

impl From<ModelArgs> for ModelConfig {
    fn from(args: ModelArgs) -> Self {
        Self {
            data_path: args.data_path,
            popularity_threshold: args.popularity_threshold,
            n_components: args.components,
            n_neighbors: args.neighbors,
            seed: args.seed,
            membership: args.membership,
        }
    }
}
