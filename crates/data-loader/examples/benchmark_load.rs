use data_loader::MovieStore;
use std::path::Path;
use std::time::Instant;

fn main() {
    let path = Path::new("MoviesDataset_v41.csv");

    println!("Loading movie dataset...\n");

    let start = Instant::now();
    let store = MovieStore::load_from_file(path)
        .expect("Failed to load dataset");
    let elapsed = start.elapsed();

    let with_collection = store
        .movies()
        .iter()
        .filter(|m| !m.collection.is_empty())
        .count();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Movies: {}", store.len());
    println!("In a collection: {}", with_collection);
    println!("\nPerformance: {:.0} rows/second",
             store.len() as f64 / elapsed.as_secs_f64());
}
