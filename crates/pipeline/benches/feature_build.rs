//! Benchmarks for feature building
//!
//! Run with: cargo bench --package pipeline
//!
//! Uses a synthetic corpus so the benchmark runs without the dataset file.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pipeline::{FeatureBuilder, MovieDocuments, TfidfVectorizer};

const WORDS: &[&str] = &[
    "space", "crew", "alien", "detective", "city", "robbery", "family", "war", "love",
    "ship", "planet", "murder", "island", "school", "friend", "dragon", "king", "ocean",
];

fn synthetic_documents(n: usize) -> MovieDocuments {
    let mut documents = MovieDocuments::default();
    for i in 0..n {
        let synopsis: Vec<&str> = (0..12).map(|k| WORDS[(i * 7 + k * 5) % WORDS.len()]).collect();
        documents.synopses.push(format!("Movie {} {}", i, synopsis.join(" ")));
        documents.collections.push(if i % 4 == 0 { format!("Saga {}", i / 8) } else { String::new() });
        documents.genres.push(format!("['{}', '{}']", WORDS[i % 5], WORDS[(i + 3) % 7]));
    }
    documents
}

fn bench_tfidf(c: &mut Criterion) {
    let documents = synthetic_documents(2000);
    let vectorizer = TfidfVectorizer::new().with_english_stop_words();

    c.bench_function("tfidf_fit_transform_2000", |b| {
        b.iter(|| black_box(vectorizer.fit_transform(black_box(&documents.synopses))))
    });
}

fn bench_feature_build(c: &mut Criterion) {
    let documents = synthetic_documents(1000);
    let builder = FeatureBuilder::default();

    let mut group = c.benchmark_group("feature_build");
    group.sample_size(10);
    group.bench_function("build_1000", |b| {
        b.iter(|| black_box(builder.build(black_box(&documents)).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_tfidf, bench_feature_build);
criterion_main!(benches);
