//! Hybrid blending of content and collaborative candidates.
//!
//! ## Algorithm
//! Without a seed movie the collaborative ranking is returned as is.
//! With a seed movie, both sources produce `2 * limit` candidates and:
//! 1. Movies found by both sources come first, in content rank order
//! 2. If that leaves free slots, half of them (rounded down) go to
//!    content-only movies and half to collaborative-only movies, content
//!    first, each in its own rank order
//! 3. The result is truncated to `limit`
//!
//! A source that runs out of exclusive candidates leaves its share empty;
//! the other source does not fill in, so the list can be shorter than
//! `limit`.

use data_loader::{DataIndex, MovieId, UserId};
use sources::error::Result;
use sources::{Candidate, CollaborativeModel, ContentIndex};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Blends the content index and the collaborative model over one snapshot
pub struct HybridRecommender<'a> {
    data_index: &'a DataIndex,
    content: &'a ContentIndex,
    model: &'a CollaborativeModel,
}

impl<'a> HybridRecommender<'a> {
    pub fn new(
        data_index: &'a DataIndex,
        content: &'a ContentIndex,
        model: &'a CollaborativeModel,
    ) -> Self {
        Self {
            data_index,
            content,
            model,
        }
    }

    /// Recommend up to `limit` movies for `user_id`, optionally seeded by a movie
    ///
    /// Fails with `MovieNotFound` when the seed movie is not in the catalog.
    #[instrument(skip(self))]
    pub fn recommend(
        &self,
        user_id: UserId,
        movie_id: Option<MovieId>,
        limit: usize,
    ) -> Result<Vec<Candidate>> {
        let Some(movie_id) = movie_id else {
            return Ok(self.model.top_unrated(self.data_index, user_id, limit));
        };

        let pool = limit.saturating_mul(2);
        let content = self.content.similar(movie_id, pool)?;
        let collaborative = self.model.top_unrated(self.data_index, user_id, pool);

        debug!(
            "Blending {} content and {} collaborative candidates",
            content.len(),
            collaborative.len()
        );
        Ok(blend(content, collaborative, limit))
    }
}

/// Merge two ranked candidate lists (see module docs)
pub fn blend(content: Vec<Candidate>, collaborative: Vec<Candidate>, limit: usize) -> Vec<Candidate> {
    let content_ids: HashSet<MovieId> = content.iter().map(|c| c.movie_id).collect();
    let collaborative_ids: HashSet<MovieId> = collaborative.iter().map(|c| c.movie_id).collect();

    let (mut blended, content_only): (Vec<Candidate>, Vec<Candidate>) = content
        .into_iter()
        .partition(|c| collaborative_ids.contains(&c.movie_id));

    if blended.len() < limit {
        let share = (limit - blended.len()) / 2;
        blended.extend(content_only.into_iter().take(share));
        blended.extend(
            collaborative
                .into_iter()
                .filter(|c| !content_ids.contains(&c.movie_id))
                .take(share),
        );
    }

    blended.truncate(limit);
    blended
}

#[cfg(test)]
mod tests {
    use super::*;
    use sources::CandidateSource;

    fn content(ids: &[MovieId]) -> Vec<Candidate> {
        ids.iter()
            .enumerate()
            .map(|(rank, &id)| Candidate::new(id, CandidateSource::Content, 1.0 - rank as f32 * 0.1))
            .collect()
    }

    fn collaborative(ids: &[MovieId]) -> Vec<Candidate> {
        ids.iter()
            .enumerate()
            .map(|(rank, &id)| Candidate::new(id, CandidateSource::Collaborative, 5.0 - rank as f32 * 0.1))
            .collect()
    }

    fn ids(candidates: &[Candidate]) -> Vec<MovieId> {
        candidates.iter().map(|c| c.movie_id).collect()
    }

    #[test]
    fn test_intersection_first_in_content_order() {
        let blended = blend(content(&[1, 2, 3, 4]), collaborative(&[4, 2, 9, 8]), 2);
        assert_eq!(ids(&blended), vec![2, 4]);
    }

    #[test]
    fn test_top_up_splits_remaining_slots() {
        // Intersection {2}; 3 free slots -> 1 content-only, 1 collaborative-only
        let blended = blend(content(&[1, 2, 3, 5]), collaborative(&[9, 2, 8, 7]), 4);
        assert_eq!(ids(&blended), vec![2, 1, 9]);
    }

    #[test]
    fn test_no_overlap_half_and_half() {
        let blended = blend(content(&[1, 2, 3, 4]), collaborative(&[5, 6, 7, 8]), 4);
        assert_eq!(ids(&blended), vec![1, 2, 5, 6]);
    }

    #[test]
    fn test_exhausted_source_is_not_backfilled() {
        // Content has a single exclusive movie; its unused share stays empty
        let blended = blend(content(&[1]), collaborative(&[5, 6, 7, 8, 9, 10]), 6);
        assert_eq!(ids(&blended), vec![1, 5, 6, 7]);
    }

    #[test]
    fn test_single_free_slot_stays_empty() {
        let blended = blend(content(&[1, 2, 3]), collaborative(&[1, 2, 9]), 3);
        assert_eq!(ids(&blended), vec![1, 2]);
    }

    #[test]
    fn test_full_intersection_is_truncated() {
        let blended = blend(content(&[3, 2, 1]), collaborative(&[1, 2, 3]), 2);
        assert_eq!(ids(&blended), vec![3, 2]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(blend(vec![], vec![], 5).is_empty());
        assert!(blend(content(&[1, 2]), collaborative(&[3]), 0).is_empty());
    }
}
