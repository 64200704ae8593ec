//! Helper functions to build UserContext from DataIndex
//!
//! Users have no record of their own; everything known about them is
//! aggregated from their rows in the rating log.

use crate::types::UserContext;
use data_loader::{DataIndex, UserId};

/// Rating at or above which a movie counts as "highly rated"
pub const HIGH_RATING_THRESHOLD: f32 = 4.0;

/// Build a UserContext from DataIndex for a given user
///
/// A user without ratings yields an empty context rather than an error;
/// cold-start users are still served by the collaborative model.
pub fn build_user_context(data_index: &DataIndex, user_id: UserId) -> UserContext {
    let mut context = UserContext::new(user_id);

    let ratings = data_index.get_user_ratings(user_id);
    if ratings.is_empty() {
        return context;
    }

    let total: f32 = ratings.iter().map(|r| r.rating).sum();
    context.rating_count = ratings.len();
    context.avg_rating = total / ratings.len() as f32;

    for rating in ratings {
        context.rated_movies.insert(rating.movie_id);

        if rating.rating >= HIGH_RATING_THRESHOLD {
            context.highly_rated_movies.push(rating.movie_id);
        }
    }

    context
}
