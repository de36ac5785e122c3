use std::sync::Arc;

use crate::{
    catalog::Catalog,
    models::{BookRow, BOOK_NOT_FOUND},
    services::tfidf::{SparseVector, TfidfVectorizer},
};

/// Dense, symmetric matrix of pairwise cosine similarities
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Computes all pairwise similarities of unit-length rows
    ///
    /// Uses an inverted index over terms so only pairs sharing a term are
    /// touched. Self-similarity is fixed at 1.0, also for empty rows.
    pub fn from_rows(rows: &[SparseVector], vocabulary_size: usize) -> Self {
        let size = rows.len();
        let mut postings: Vec<Vec<(usize, f64)>> = vec![Vec::new(); vocabulary_size];
        for (doc, row) in rows.iter().enumerate() {
            for &(term, weight) in row {
                postings[term].push((doc, weight));
            }
        }

        let mut values = vec![0.0f32; size * size];
        let mut scores = vec![0.0f64; size];
        for (i, row) in rows.iter().enumerate() {
            scores.iter_mut().for_each(|s| *s = 0.0);
            for &(term, weight) in row {
                for &(j, other) in &postings[term] {
                    if j > i {
                        scores[j] += weight * other;
                    }
                }
            }
            for j in (i + 1)..size {
                let score = scores[j].clamp(0.0, 1.0) as f32;
                values[i * size + j] = score;
                values[j * size + i] = score;
            }
            values[i * size + i] = 1.0;
        }

        Self { size, values }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, a: usize, b: usize) -> f32 {
        self.values[a * self.size + b]
    }

    pub fn row(&self, a: usize) -> &[f32] {
        &self.values[a * self.size..(a + 1) * self.size]
    }
}

/// TF-IDF vectors and cosine similarities over every catalog row's tag text
///
/// The index keeps the catalog it was built from, so matrix positions and
/// catalog rows always line up.
#[derive(Debug, Clone)]
pub struct ContentIndex {
    catalog: Arc<Catalog>,
    tfidf: Vec<SparseVector>,
    similarity: SimilarityMatrix,
}

impl ContentIndex {
    pub fn build(catalog: Arc<Catalog>) -> Self {
        let documents: Vec<&str> = catalog.books().iter().map(|b| b.tag_name.as_str()).collect();

        let mut vectorizer = TfidfVectorizer::new();
        let tfidf = vectorizer.fit_transform(&documents);
        let similarity = SimilarityMatrix::from_rows(&tfidf, vectorizer.vocabulary_size());

        tracing::info!(
            books = catalog.len(),
            vocabulary = vectorizer.vocabulary_size(),
            "Built content similarity index"
        );

        Self {
            catalog,
            tfidf,
            similarity,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn tfidf(&self) -> &[SparseVector] {
        &self.tfidf
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    /// Catalog positions of the `top_n` books most similar to `position`
    ///
    /// The book itself is excluded; equal scores keep catalog order.
    pub fn neighbours(&self, position: usize, top_n: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .similarity
            .row(position)
            .iter()
            .copied()
            .enumerate()
            .filter(|&(other, _)| other != position)
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_n);
        scored
    }

    /// Books most similar in tags to the book titled `title`
    ///
    /// An unknown title yields a single "Book not found" row.
    pub fn similar_to(&self, title: &str, top_n: usize) -> Vec<BookRow> {
        let Some(position) = self.catalog.find_by_title(title) else {
            tracing::info!(title = %title, "{}", BOOK_NOT_FOUND);
            return vec![BookRow::not_found()];
        };

        self.neighbours(position, top_n)
            .into_iter()
            .filter_map(|(other, _)| self.catalog.row(other))
            .map(BookRow::from)
            .collect()
    }
}
