//! Content Source - TF-IDF similarity between catalog movies
//!
//! Each movie becomes one document: its genre labels followed by its
//! overview. Documents are vectorized with TF-IDF and every pair of movies
//! is compared by cosine similarity up front, so queries are a row lookup
//! plus a sort.
//!
//! ## Weighting
//! - tf: raw term count in the document
//! - idf: ln((1 + n) / (1 + df)) + 1 (smoothed, never zero)
//! - vectors are L2-normalized, so cosine similarity is a dot product
//!
//! The index is immutable once built. A changed catalog needs a new index;
//! `catalog_fingerprint` tells callers when that is the case.

use crate::error::{Result, SourceError};
use crate::text::tokenize;
use crate::types::{Candidate, CandidateSource};
use data_loader::{Movie, MovieId};
use ndarray::{Array2, Zip};
use rayon::prelude::*;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::{debug, info, instrument};

/// Sparse L2-normalized vector, sorted by term id
type SparseVector = Vec<(u32, f32)>;

/// Pairwise content similarity over a fixed catalog
#[derive(Debug, Clone)]
pub struct ContentIndex {
    /// Movie ids in catalog order; row/column `i` belongs to `movie_ids[i]`
    movie_ids: Vec<MovieId>,
    positions: HashMap<MovieId, usize>,
    /// `n x n` similarity matrix
    similarity: Array2<f32>,
    fingerprint: u64,
}

impl ContentIndex {
    /// Build the index over `movies`, in the order given
    ///
    /// If an id appears twice only its first occurrence is queryable.
    #[instrument(skip(movies), fields(movies = movies.len()))]
    pub fn build(movies: &[Movie]) -> Self {
        let documents: Vec<Vec<String>> = movies
            .par_iter()
            .map(|movie| tokenize(&movie.content_text()))
            .collect();

        let vectors = tfidf_vectors(&documents);
        let n = vectors.len();

        let mut similarity = Array2::<f32>::zeros((n, n));
        Zip::indexed(&mut similarity)
            .par_for_each(|(i, j), score| *score = cosine(&vectors[i], &vectors[j]));

        let mut positions = HashMap::with_capacity(n);
        for (pos, movie) in movies.iter().enumerate() {
            positions.entry(movie.id).or_insert(pos);
        }

        info!("Built content index over {} movies", n);
        Self {
            movie_ids: movies.iter().map(|m| m.id).collect(),
            positions,
            similarity,
            fingerprint: catalog_fingerprint(movies),
        }
    }

    pub fn len(&self) -> usize {
        self.movie_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movie_ids.is_empty()
    }

    /// Fingerprint of the catalog this index was built from
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Similarity between two indexed movies
    pub fn similarity(&self, a: MovieId, b: MovieId) -> Option<f32> {
        let row = *self.positions.get(&a)?;
        let col = *self.positions.get(&b)?;
        Some(self.similarity[[row, col]])
    }

    /// The `limit` movies most similar to `movie_id`, best first
    ///
    /// The query movie itself is never returned. Equal scores keep catalog
    /// order.
    #[instrument(skip(self))]
    pub fn similar(&self, movie_id: MovieId, limit: usize) -> Result<Vec<Candidate>> {
        let pos = *self
            .positions
            .get(&movie_id)
            .ok_or(SourceError::MovieNotFound(movie_id))?;

        let mut ranked: Vec<(usize, f32)> = self
            .similarity
            .row(pos)
            .iter()
            .copied()
            .enumerate()
            .filter(|&(i, _)| self.movie_ids[i] != movie_id)
            .collect();

        // Stable sort: ties stay in catalog order
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(limit);

        debug!("Found {} similar movies for {}", ranked.len(), movie_id);
        Ok(ranked
            .into_iter()
            .map(|(i, score)| Candidate::new(self.movie_ids[i], CandidateSource::Content, score))
            .collect())
    }
}

/// Hash of ids and document text, in catalog order
pub fn catalog_fingerprint(movies: &[Movie]) -> u64 {
    let mut hasher = DefaultHasher::new();
    movies.len().hash(&mut hasher);
    for movie in movies {
        movie.id.hash(&mut hasher);
        movie.content_text().hash(&mut hasher);
    }
    hasher.finish()
}

/// Turn tokenized documents into normalized TF-IDF vectors
fn tfidf_vectors(documents: &[Vec<String>]) -> Vec<SparseVector> {
    // Vocabulary and document frequency
    let mut vocabulary: HashMap<&str, u32> = HashMap::new();
    let mut doc_freq: Vec<u32> = Vec::new();
    let mut term_counts: Vec<HashMap<u32, u32>> = Vec::with_capacity(documents.len());

    for doc in documents {
        let mut counts: HashMap<u32, u32> = HashMap::new();
        for token in doc {
            let next_id = vocabulary.len() as u32;
            let term_id = *vocabulary.entry(token.as_str()).or_insert_with(|| {
                doc_freq.push(0);
                next_id
            });
            *counts.entry(term_id).or_insert(0) += 1;
        }
        for &term_id in counts.keys() {
            doc_freq[term_id as usize] += 1;
        }
        term_counts.push(counts);
    }

    let n = documents.len() as f32;
    let idf: Vec<f32> = doc_freq
        .iter()
        .map(|&df| ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0)
        .collect();

    term_counts
        .into_par_iter()
        .map(|counts| {
            let mut vector: SparseVector = counts
                .into_iter()
                .map(|(term_id, tf)| (term_id, tf as f32 * idf[term_id as usize]))
                .collect();
            vector.sort_unstable_by_key(|&(term_id, _)| term_id);

            let norm = vector.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
            if norm > 0.0 {
                for (_, w) in vector.iter_mut() {
                    *w /= norm;
                }
            }
            vector
        })
        .collect()
}

/// Dot product of two normalized sparse vectors, clamped to [0, 1]
fn cosine(a: &[(u32, f32)], b: &[(u32, f32)]) -> f32 {
    let (mut i, mut j) = (0, 0);
    let mut dot = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    dot.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: MovieId, overview: &str) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            overview: overview.to_string(),
            release_date: None,
            vote_average: 7.0,
            vote_count: 10,
            genre_ids: vec![],
            poster_path: None,
            popularity: 1.0,
        }
    }

    fn space_catalog() -> Vec<Movie> {
        vec![
            movie(1, "space adventure"),
            movie(2, "space opera"),
            movie(3, "cooking show"),
        ]
    }

    #[test]
    fn test_similar_ranks_shared_terms_first() {
        let index = ContentIndex::build(&space_catalog());
        let similar = index.similar(1, 2).unwrap();

        let ids: Vec<MovieId> = similar.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(similar[0].score > similar[1].score);
        assert_eq!(similar[1].score, 0.0);
    }

    #[test]
    fn test_similar_excludes_query_and_respects_limit() {
        let index = ContentIndex::build(&space_catalog());
        for id in 1..=3 {
            for limit in 0..5 {
                let similar = index.similar(id, limit).unwrap();
                assert!(similar.len() <= limit);
                assert!(similar.iter().all(|c| c.movie_id != id));
                assert!(similar.iter().all(|c| c.score <= 1.0));
            }
        }
    }

    #[test]
    fn test_unknown_movie_is_not_found() {
        let index = ContentIndex::build(&space_catalog());
        assert_eq!(index.similar(99, 2), Err(SourceError::MovieNotFound(99)));
    }

    #[test]
    fn test_matrix_is_symmetric_with_unit_diagonal() {
        let index = ContentIndex::build(&space_catalog());
        for a in 1..=3 {
            let self_score = index.similarity(a, a).unwrap();
            assert!((self_score - 1.0).abs() < 1e-5);
            for b in 1..=3 {
                assert_eq!(index.similarity(a, b), index.similarity(b, a));
            }
        }
    }

    #[test]
    fn test_similarity_rows_follow_catalog_order() {
        let index = ContentIndex::build(&space_catalog());
        assert_eq!(index.similarity.dim(), (3, 3));

        let row = index.similarity.row(0);
        assert_eq!(row[1], index.similarity(1, 2).unwrap());
        assert_eq!(row[2], index.similarity(1, 3).unwrap());
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = vec![
            movie(10, "heist"),
            movie(20, "pirates"),
            movie(30, "robots"),
            movie(40, "dinosaurs"),
        ];
        let index = ContentIndex::build(&catalog);
        let ids: Vec<MovieId> = index.similar(30, 3).unwrap().iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![10, 20, 40]);
    }

    #[test]
    fn test_repeated_queries_are_identical() {
        let index = ContentIndex::build(&space_catalog());
        assert_eq!(index.similar(2, 2).unwrap(), index.similar(2, 2).unwrap());
    }

    #[test]
    fn test_genre_labels_contribute_to_similarity() {
        let mut a = movie(1, "a lonely detective");
        a.genre_ids = vec![878];
        let mut b = movie(2, "an old farmer");
        b.genre_ids = vec![878];
        let c = movie(3, "an old farmer");

        let index = ContentIndex::build(&[a, b, c]);
        // Movie 1 shares only the "science fiction" genre text with movie 2
        assert!(index.similarity(1, 2).unwrap() > index.similarity(1, 3).unwrap());
    }

    #[test]
    fn test_fingerprint_tracks_catalog_text() {
        let catalog = space_catalog();
        let mut changed = space_catalog();
        changed[2].overview = "baking show".to_string();

        assert_eq!(catalog_fingerprint(&catalog), catalog_fingerprint(&space_catalog()));
        assert_ne!(catalog_fingerprint(&catalog), catalog_fingerprint(&changed));
        assert_eq!(ContentIndex::build(&catalog).fingerprint(), catalog_fingerprint(&catalog));
    }

    #[test]
    fn test_empty_catalog() {
        let index = ContentIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.similar(1, 5).is_err());
    }
}
