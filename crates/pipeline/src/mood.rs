//! Mood-based recommendations.
//!
//! Ranks movies by how often they were rated highly while the rater was in
//! a given brain-wave mood. When nobody ever rated anything highly in that
//! mood (or the mood tag is unknown) the collaborative ranking is returned
//! instead, ignoring the mood entirely.

use data_loader::{DataIndex, MoodTag, MovieId, Rating, UserId};
use sources::{Candidate, CandidateSource, CollaborativeModel};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Minimum rating for a row to count towards a mood's popularity
pub const MOOD_RATING_THRESHOLD: f32 = 4.0;

/// Mood recommender over one snapshot
#[derive(Debug, Clone)]
pub struct MoodRecommender {
    min_rating: f32,
}

impl MoodRecommender {
    pub fn new() -> Self {
        Self {
            min_rating: MOOD_RATING_THRESHOLD,
        }
    }

    /// Configure the high-rating threshold (default: 4.0)
    pub fn with_min_rating(mut self, min_rating: f32) -> Self {
        self.min_rating = min_rating;
        self
    }

    /// Movies most often rated highly in `mood`
    ///
    /// Ordered by count descending, then movie id ascending.
    pub fn top_for_mood(&self, ratings: &[Rating], mood: MoodTag, limit: usize) -> Vec<Candidate> {
        let mut counts: HashMap<MovieId, u32> = HashMap::new();
        for rating in ratings {
            if rating.mood == mood && rating.rating >= self.min_rating {
                *counts.entry(rating.movie_id).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(MovieId, u32)> = counts.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(limit);

        ranked
            .into_iter()
            .map(|(movie_id, count)| Candidate::new(movie_id, CandidateSource::Mood, count as f32))
            .collect()
    }

    /// Recommend for `user_id` in `mood`
    ///
    /// `None` stands for an unrecognized tag and always takes the fallback.
    #[instrument(skip(self, data_index, model))]
    pub fn recommend(
        &self,
        data_index: &DataIndex,
        model: &CollaborativeModel,
        user_id: UserId,
        mood: Option<MoodTag>,
        limit: usize,
    ) -> Vec<Candidate> {
        if let Some(mood) = mood {
            let matches = self.top_for_mood(data_index.ratings(), mood, limit);
            if !matches.is_empty() {
                return matches;
            }
            debug!("No high {} ratings, falling back to collaborative", mood);
        }
        model.top_unrated(data_index, user_id, limit)
    }
}

impl Default for MoodRecommender {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Movie;
    use sources::CollaborativeConfig;

    fn rating(user_id: UserId, movie_id: MovieId, value: f32, mood: MoodTag) -> Rating {
        Rating {
            user_id,
            movie_id,
            rating: value,
            timestamp: 0,
            mood,
        }
    }

    fn create_test_index() -> DataIndex {
        let movies = (1..=6)
            .map(|id| Movie {
                id,
                title: format!("Movie {}", id),
                overview: String::new(),
                release_date: None,
                vote_average: 6.0,
                vote_count: 1,
                genre_ids: vec![],
                poster_path: None,
                popularity: 1.0,
            })
            .collect();

        let ratings = vec![
            rating(1, 3, 4.5, MoodTag::Alpha),
            rating(2, 3, 5.0, MoodTag::Alpha),
            rating(3, 1, 4.0, MoodTag::Alpha),
            rating(4, 2, 4.0, MoodTag::Alpha),
            rating(5, 2, 4.0, MoodTag::Alpha),
            // Below threshold or other mood: ignored
            rating(6, 5, 3.5, MoodTag::Alpha),
            rating(6, 6, 5.0, MoodTag::Beta),
            rating(1, 4, 3.5, MoodTag::Theta),
        ];
        DataIndex::from_parts(movies, ratings)
    }

    fn model(index: &DataIndex) -> CollaborativeModel {
        CollaborativeModel::train(index.ratings(), &CollaborativeConfig::default().with_factors(4))
    }

    #[test]
    fn test_ranks_by_count_then_id() {
        let index = create_test_index();
        let top = MoodRecommender::new().top_for_mood(index.ratings(), MoodTag::Alpha, 10);

        let ids: Vec<MovieId> = top.iter().map(|c| c.movie_id).collect();
        // Movies 2 and 3 tie at two ratings; id breaks the tie
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(top[0].score, 2.0);
        assert!(top.iter().all(|c| c.source == CandidateSource::Mood));
    }

    #[test]
    fn test_limit_applies_to_mood_ranking() {
        let index = create_test_index();
        let top = MoodRecommender::new().top_for_mood(index.ratings(), MoodTag::Alpha, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].movie_id, 2);
    }

    #[test]
    fn test_unused_mood_falls_back_to_collaborative() {
        let index = create_test_index();
        let model = model(&index);
        let recommender = MoodRecommender::new();

        let recs = recommender.recommend(&index, &model, 1, Some(MoodTag::Gamma), 5);
        assert_eq!(recs, model.top_unrated(&index, 1, 5));
    }

    #[test]
    fn test_low_ratings_only_falls_back() {
        let index = create_test_index();
        let model = model(&index);
        let recommender = MoodRecommender::new();

        // Theta only has a 3.5 rating
        let recs = recommender.recommend(&index, &model, 1, Some(MoodTag::Theta), 3);
        assert_eq!(recs, model.top_unrated(&index, 1, 3));
    }

    #[test]
    fn test_unknown_mood_falls_back() {
        let index = create_test_index();
        let model = model(&index);

        let recs = MoodRecommender::new().recommend(&index, &model, 2, None, 4);
        assert_eq!(recs, model.top_unrated(&index, 2, 4));
    }

    #[test]
    fn test_custom_threshold() {
        let index = create_test_index();
        let top = MoodRecommender::new()
            .with_min_rating(4.5)
            .top_for_mood(index.ratings(), MoodTag::Alpha, 10);
        let ids: Vec<MovieId> = top.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![3]);
    }
}
