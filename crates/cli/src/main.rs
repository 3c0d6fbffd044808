use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{MovieRecord, MovieStore};
use rand::seq::IndexedRandom;
use server::queries::Lookup;
use server::{ModelArgs, ModelConfig, QueryService, RecommendationEngine, ServiceError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// movie-recs - Movie information and content-based recommendations
#[derive(Parser)]
#[command(name = "movie-recs")]
#[command(about = "Query the movie dataset and get similar-movie recommendations", long_about = None)]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend movies similar to a title
    Recommend {
        /// Exact movie title
        #[arg(long)]
        title: String,
    },

    /// Show everything known about a movie
    Movie {
        /// Exact movie title
        #[arg(long)]
        title: String,
    },

    /// Show a director's movies and total return
    Director {
        /// Director name
        #[arg(long)]
        name: String,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Run benchmark to test recommendation latency
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ModelConfig::from(cli.model);

    println!("Loading movie dataset from {}...", config.data_path.display());
    let start = Instant::now();
    let store = Arc::new(
        MovieStore::load_from_file(&config.data_path).context("Failed to load movie dataset")?,
    );
    println!(
        "{} Loaded {} movies in {:?}",
        "✓".green(),
        store.len(),
        start.elapsed()
    );

    match cli.command {
        Commands::Recommend { title } => {
            let engine = build_engine(store, &config).await?;
            handle_recommend(&engine, &title)?
        }
        Commands::Movie { title } => handle_movie(&store, &config, &title),
        Commands::Director { name } => handle_director(store, &config, &name),
        Commands::Search { title } => handle_search(&store, &title),
        Commands::Benchmark {
            requests,
            concurrent,
        } => {
            let engine = build_engine(store, &config).await?;
            handle_benchmark(Arc::new(engine), requests, concurrent).await?
        }
    }

    Ok(())
}

/// Build the model on a blocking thread; it is CPU bound.
async fn build_engine(store: Arc<MovieStore>, config: &ModelConfig) -> Result<RecommendationEngine> {
    info!("Building recommendation model");
    let start = Instant::now();
    let config = config.clone();
    let engine = tokio::task::spawn_blocking(move || RecommendationEngine::build(&store, &config))
        .await
        .context("Model build task panicked")??;
    println!(
        "{} Built model over {} catalog movies in {:?}",
        "✓".green(),
        engine.catalog_len(),
        start.elapsed()
    );
    Ok(engine)
}

/// Handle the 'recommend' command
fn handle_recommend(engine: &RecommendationEngine, title: &str) -> Result<()> {
    match engine.recommend(title) {
        Ok(titles) => {
            println!("{}", format!("Movies similar to '{}':", title).bold().blue());
            for (rank, recommended) in titles.iter().enumerate() {
                println!("{}. {}", (rank + 1).to_string().green(), recommended);
            }
            Ok(())
        }
        Err(ServiceError::NotFound(_)) => {
            println!(
                "{} '{}' is not in the recommendation catalog",
                "✗".red(),
                title
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Handle the 'movie' command
fn handle_movie(store: &MovieStore, config: &ModelConfig, title: &str) {
    let rows = store.rows_with_title(title);
    let Some(movie) = rows.first().and_then(|&row| store.get_movie(row)) else {
        println!("{} '{}' not found", "✗".red(), title);
        return;
    };

    print_movie(movie);
    let recommendable = movie
        .popularity
        .is_some_and(|p| p > config.popularity_threshold);
    println!(
        "{}Recommendable: {}",
        "• ".cyan(),
        if recommendable { "yes".green() } else { "no".red() }
    );
    if rows.len() > 1 {
        println!(
            "{}",
            format!("({} rows share this title; showing the first)", rows.len()).dimmed()
        );
    }
}

/// Handle the 'director' command
fn handle_director(store: Arc<MovieStore>, config: &ModelConfig, name: &str) {
    let queries = QueryService::new(store, config.membership);
    let stats = match queries.director(name) {
        Lookup::Found(stats) => stats,
        Lookup::NotFound(_) => {
            println!("{} No movies directed solely by '{}'", "✗".red(), name);
            return;
        }
    };

    println!("{}", format!("Director: {}", stats.director).bold().blue());
    println!("{}Movies: {}", "• ".green(), stats.count);
    println!("{}Total return: {}", "• ".green(), stats.return_total);
    for movie in &stats.movies {
        println!(
            "  - {} ({}) return {} budget {} revenue {}",
            movie.title,
            movie.release_year.map(|y| y.to_string()).unwrap_or("????".to_string()),
            format_number(movie.return_ratio),
            format_number(movie.budget),
            format_number(movie.revenue)
        );
    }
}

/// Handle the 'search' command
fn handle_search(store: &MovieStore, title: &str) {
    let needle = title.to_lowercase();

    // (relevance, popularity, record): exact matches first
    let mut matches: Vec<(u8, f64, &MovieRecord)> = store
        .movies()
        .iter()
        .filter_map(|movie| {
            let lower = movie.title.to_lowercase();
            let relevance = if lower == needle {
                0
            } else if lower.contains(&needle) {
                1
            } else {
                return None;
            };
            Some((relevance, movie.popularity.unwrap_or(0.0), movie))
        })
        .collect();

    matches.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal))
    });

    println!(
        "{}",
        format!("Search results for '{}' ({} matches):", title, matches.len())
            .bold()
            .blue()
    );
    for (_, popularity, movie) in matches.iter().take(20) {
        println!(
            "{} ({}) [{}] popularity {:.1}",
            movie.title,
            movie.release_year.map(|y| y.to_string()).unwrap_or("????".to_string()),
            movie.genres,
            popularity
        );
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    engine: Arc<RecommendationEngine>,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        println!("Nothing to benchmark");
        return Ok(());
    }

    let mut rng = rand::rng();
    let titles: Vec<String> = (0..requests)
        .filter_map(|_| engine.catalog_titles().choose(&mut rng).cloned())
        .collect();
    if titles.is_empty() {
        anyhow::bail!("The recommendation catalog is empty");
    }

    let bench_start = Instant::now();
    let mut timings: Vec<Duration> = Vec::with_capacity(titles.len());
    for batch in titles.chunks(concurrent.max(1)) {
        let mut handles = Vec::with_capacity(batch.len());
        for title in batch {
            let engine = engine.clone();
            let title = title.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                let start = Instant::now();
                engine.recommend(&title)?;
                Ok::<_, ServiceError>(start.elapsed())
            }));
        }
        for handle in handles {
            timings.push(handle.await??);
        }
    }
    let wall_time = bench_start.elapsed();

    timings.sort();
    let total: Duration = timings.iter().sum();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {}", timings.len());
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", total / timings.len() as u32);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} requests/second",
        timings.len() as f64 / wall_time.as_secs_f64()
    );

    Ok(())
}

/// Helper function to print a movie record
fn print_movie(movie: &MovieRecord) {
    println!("{}", movie.title.bold().blue());
    println!(
        "{}Year: {}",
        "• ".green(),
        movie.release_year.map(|y| y.to_string()).unwrap_or("????".to_string())
    );
    println!("{}Runtime: {} min", "• ".green(), format_number(movie.runtime));
    println!("{}Language: {}", "• ".green(), movie.original_language);
    println!("{}Genres: {}", "• ".green(), movie.genres);
    if !movie.collection.is_empty() {
        println!("{}Collection: {}", "• ".green(), movie.collection);
    }
    println!("{}Countries: {}", "• ".green(), movie.countries.join(", "));
    println!("{}Companies: {}", "• ".green(), movie.companies.join(", "));
    println!("{}Directors: {}", "• ".green(), movie.directors.join(", "));
    println!(
        "{}Budget: {}  Revenue: {}  Return: {}",
        "• ".cyan(),
        format_number(movie.budget),
        format_number(movie.revenue),
        format_number(movie.return_ratio)
    );
    println!("{}Popularity: {}", "• ".cyan(), format_number(movie.popularity));
    if !movie.overview.is_empty() {
        println!("\n{}", movie.overview);
    }
}

fn format_number(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}
