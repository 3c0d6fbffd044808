//! Term-frequency / inverse-document-frequency weighting.
//!
//! Weights follow the smoothed formulation: for `n` documents and a term
//! appearing in `df` of them, `idf = ln((1 + n) / (1 + df)) + 1`. A cell is
//! the raw count of the term in the document times its idf, and each row
//! is then scaled to unit L2 norm.

use crate::text::{english_stop_words, tokenize};
use rayon::prelude::*;
use sprs::CsMat;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Turns a list of documents into a weighted sparse matrix.
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    stop_words: Option<HashSet<&'static str>>,
}

/// Result of fitting a vectorizer on a corpus.
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    /// Terms in column order (sorted)
    pub vocabulary: Vec<String>,
    /// idf weight per column
    pub idf: Vec<f64>,
    /// One L2-normalized row per document
    pub matrix: CsMat<f64>,
}

impl TfidfVectorizer {
    /// A vectorizer that keeps every token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop English stop words before counting.
    pub fn with_english_stop_words(mut self) -> Self {
        self.stop_words = Some(english_stop_words());
        self
    }

    /// Build the vocabulary from `documents` and weight every document.
    ///
    /// An empty vocabulary (no document has a usable token) yields an
    /// `n x 0` matrix.
    pub fn fit_transform<S: AsRef<str> + Sync>(&self, documents: &[S]) -> TfidfMatrix {
        let tokenized: Vec<Vec<String>> = documents
            .par_iter()
            .map(|doc| {
                tokenize(doc.as_ref())
                    .into_iter()
                    .filter(|token| {
                        self.stop_words
                            .as_ref()
                            .is_none_or(|stop| !stop.contains(token.as_str()))
                    })
                    .collect()
            })
            .collect();

        let vocabulary: Vec<String> = tokenized
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let columns: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(col, term)| (term.as_str(), col))
            .collect();

        // term counts per document, sorted by column
        let counts: Vec<Vec<(usize, f64)>> = tokenized
            .par_iter()
            .map(|tokens| {
                let mut row: HashMap<usize, f64> = HashMap::new();
                for token in tokens {
                    if let Some(&col) = columns.get(token.as_str()) {
                        *row.entry(col).or_insert(0.0) += 1.0;
                    }
                }
                let mut row: Vec<(usize, f64)> = row.into_iter().collect();
                row.sort_unstable_by_key(|&(col, _)| col);
                row
            })
            .collect();

        let mut document_frequency = vec![0usize; vocabulary.len()];
        for row in &counts {
            for &(col, _) in row {
                document_frequency[col] += 1;
            }
        }

        let n = documents.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let rows: Vec<Vec<(usize, f64)>> = counts
            .into_par_iter()
            .map(|row| {
                let weighted: Vec<(usize, f64)> =
                    row.into_iter().map(|(col, count)| (col, count * idf[col])).collect();
                let norm = weighted.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    weighted.into_iter().map(|(col, w)| (col, w / norm)).collect()
                } else {
                    weighted
                }
            })
            .collect();

        TfidfMatrix {
            matrix: csr_from_rows(vocabulary.len(), rows),
            vocabulary,
            idf,
        }
    }
}

/// Assemble a CSR matrix from per-row `(column, value)` lists sorted by column.
fn csr_from_rows(n_cols: usize, rows: Vec<Vec<(usize, f64)>>) -> CsMat<f64> {
    let n_rows = rows.len();
    let mut indptr = Vec::with_capacity(n_rows + 1);
    let mut indices = Vec::new();
    let mut data = Vec::new();
    indptr.push(0);
    for row in rows {
        for (col, value) in row {
            indices.push(col);
            data.push(value);
        }
        indptr.push(indices.len());
    }
    CsMat::new((n_rows, n_cols), indptr, indices, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(tfidf: &TfidfMatrix, term: &str) -> usize {
        tfidf.vocabulary.iter().position(|t| t == term).unwrap()
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let tfidf = TfidfVectorizer::new().fit_transform(&["zebra apple", "mango apple"]);
        assert_eq!(tfidf.vocabulary, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn test_smoothed_idf() {
        let tfidf = TfidfVectorizer::new().fit_transform(&["apple mango", "apple", "apple"]);
        let apple = tfidf.idf[column(&tfidf, "apple")];
        let mango = tfidf.idf[column(&tfidf, "mango")];

        assert!((apple - 1.0).abs() < 1e-12);
        assert!((mango - ((4.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let tfidf = TfidfVectorizer::new()
            .fit_transform(&["the quick brown fox", "lazy dog lazy dog", ""]);
        for i in 0..2 {
            let row = tfidf.matrix.outer_view(i).unwrap();
            let norm: f64 = row.data().iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-12);
        }
        assert_eq!(tfidf.matrix.outer_view(2).unwrap().nnz(), 0);
    }

    #[test]
    fn test_stop_words_are_removed() {
        let docs = ["The hero and the villain"];
        let plain = TfidfVectorizer::new().fit_transform(&docs);
        let filtered = TfidfVectorizer::new().with_english_stop_words().fit_transform(&docs);

        assert!(plain.vocabulary.contains(&"the".to_string()));
        assert_eq!(filtered.vocabulary, vec!["hero", "villain"]);
    }

    #[test]
    fn test_repeated_term_weighs_more() {
        let tfidf = TfidfVectorizer::new().fit_transform(&["space space war"]);
        let dense = tfidf.matrix.to_dense();
        assert!(dense[[0, column(&tfidf, "space")]] > dense[[0, column(&tfidf, "war")]]);
    }

    #[test]
    fn test_empty_vocabulary() {
        let tfidf = TfidfVectorizer::new().fit_transform(&["", "a", "!"]);
        assert!(tfidf.vocabulary.is_empty());
        assert_eq!(tfidf.matrix.shape(), (3, 0));
        assert_eq!(tfidf.matrix.nnz(), 0);
    }
}
