//! Synthetic rating generation for bootstrapping an empty store.

use crate::types::*;
use rand::Rng;
use rand::seq::IndexedRandom;

/// Seconds in the window synthetic timestamps are spread over (one year)
const TIMESTAMP_WINDOW: i64 = 31_536_000;

/// Generate random ratings for users `1..=num_users`
///
/// Each user rates `min(ratings_per_user, movies.len())` distinct movies
/// with a uniform value rounded to the nearest half point, a timestamp
/// within the year before `now`, and a uniformly random mood.
pub fn generate_ratings<R: Rng + ?Sized>(
    movies: &[Movie],
    num_users: u32,
    ratings_per_user: usize,
    now: i64,
    rng: &mut R,
) -> Vec<Rating> {
    let movie_ids: Vec<MovieId> = movies.iter().map(|m| m.id).collect();
    let per_user = ratings_per_user.min(movie_ids.len());

    let mut ratings = Vec::with_capacity(num_users as usize * per_user);
    for user_id in 1..=num_users {
        for &movie_id in movie_ids.choose_multiple(rng, per_user) {
            let raw: f32 = rng.random_range(MIN_RATING..=MAX_RATING);
            let rating = ((raw * 2.0).round() / 2.0).clamp(MIN_RATING, MAX_RATING);
            let timestamp = now - rng.random_range(0..=TIMESTAMP_WINDOW);
            let mood = MoodTag::ALL[rng.random_range(0..MoodTag::ALL.len())];

            ratings.push(Rating {
                user_id,
                movie_id,
                rating,
                timestamp,
                mood,
            });
        }
    }
    ratings
}
