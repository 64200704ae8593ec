//! Collaborative Source - latent-factor matrix factorization
//!
//! Learns a bias term and a factor vector for every user and movie so that
//!
//! ```text
//! r̂(u, i) = μ + b_u + b_i + q_i · p_u
//! ```
//!
//! approximates observed ratings. Parameters are fit with stochastic
//! gradient descent over a seeded 80/20 train/hold-out split; the hold-out
//! RMSE is kept as a quality signal and never gates the model.
//!
//! ## Cold start
//! Unknown users or movies contribute no bias and no factor term, so an
//! entirely unseen pair is scored at the global mean. Predictions are
//! clipped to the rating scale.

use crate::types::{Candidate, CandidateSource};
use data_loader::{DataIndex, MAX_RATING, MIN_RATING, MovieId, Rating, UserId};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

/// Hyper-parameters for training
#[derive(Debug, Clone, PartialEq)]
pub struct CollaborativeConfig {
    /// Latent factor rank
    pub factors: usize,
    /// Passes of SGD over the training partition
    pub epochs: usize,
    pub learning_rate: f32,
    pub regularization: f32,
    /// Factors start uniform in [-init_range, init_range]
    pub init_range: f32,
    /// Share of ratings held out for RMSE
    pub holdout_fraction: f32,
    /// Seed for the split and the initialization
    pub seed: u64,
}

impl Default for CollaborativeConfig {
    fn default() -> Self {
        Self {
            factors: 100,
            epochs: 20,
            learning_rate: 0.005,
            regularization: 0.02,
            init_range: 0.1,
            holdout_fraction: 0.2,
            seed: 42,
        }
    }
}

impl CollaborativeConfig {
    /// Configure the latent rank (default: 100)
    pub fn with_factors(mut self, factors: usize) -> Self {
        self.factors = factors;
        self
    }

    /// Configure the number of training passes (default: 20)
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_regularization(mut self, regularization: f32) -> Self {
        self.regularization = regularization;
        self
    }

    /// Configure the hold-out share (default: 0.2)
    pub fn with_holdout_fraction(mut self, fraction: f32) -> Self {
        self.holdout_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A fitted latent-factor model
///
/// Immutable after `train`; retraining builds a new model.
#[derive(Debug, Clone)]
pub struct CollaborativeModel {
    global_mean: f32,
    user_index: HashMap<UserId, usize>,
    movie_index: HashMap<MovieId, usize>,
    user_bias: Vec<f32>,
    movie_bias: Vec<f32>,
    /// `users x factors`
    user_factors: Array2<f32>,
    /// `movies x factors`
    movie_factors: Array2<f32>,
    training_size: usize,
    holdout_size: usize,
    holdout_rmse: Option<f32>,
}

impl CollaborativeModel {
    /// Fit a model on `ratings`
    ///
    /// With no ratings at all the model predicts the middle of the rating
    /// scale for everything.
    #[instrument(skip(ratings, config), fields(ratings = ratings.len(), factors = config.factors))]
    pub fn train(ratings: &[Rating], config: &CollaborativeConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);

        let (train, holdout) = split(ratings, config.holdout_fraction, &mut rng);
        let k = config.factors;

        let mut user_index = HashMap::new();
        let mut movie_index = HashMap::new();
        let samples: Vec<(usize, usize, f32)> = train
            .iter()
            .map(|r| {
                let next_user = user_index.len();
                let u = *user_index.entry(r.user_id).or_insert(next_user);
                let next_movie = movie_index.len();
                let i = *movie_index.entry(r.movie_id).or_insert(next_movie);
                (u, i, r.rating)
            })
            .collect();

        let global_mean = if samples.is_empty() {
            (MIN_RATING + MAX_RATING) / 2.0
        } else {
            samples.iter().map(|s| s.2).sum::<f32>() / samples.len() as f32
        };

        let mut init = |rows: usize| -> Array2<f32> {
            Array2::from_shape_fn((rows, k), |_| {
                rng.random_range(-config.init_range..=config.init_range)
            })
        };
        let mut user_factors = init(user_index.len());
        let mut movie_factors = init(movie_index.len());
        let mut user_bias = vec![0.0; user_index.len()];
        let mut movie_bias = vec![0.0; movie_index.len()];

        let lr = config.learning_rate;
        let reg = config.regularization;
        for epoch in 0..config.epochs {
            let mut squared_error = 0.0f64;
            for &(u, i, rating) in &samples {
                let mut pu = user_factors.row_mut(u);
                let mut qi = movie_factors.row_mut(i);

                let dot = pu.dot(&qi);
                let err = rating - (global_mean + user_bias[u] + movie_bias[i] + dot);
                squared_error += (err * err) as f64;

                user_bias[u] += lr * (err - reg * user_bias[u]);
                movie_bias[i] += lr * (err - reg * movie_bias[i]);

                for (p, q) in pu.iter_mut().zip(qi.iter_mut()) {
                    let (p_old, q_old) = (*p, *q);
                    *p += lr * (err * q_old - reg * p_old);
                    *q += lr * (err * p_old - reg * q_old);
                }
            }
            if !samples.is_empty() {
                debug!(
                    "Epoch {}: training RMSE {:.4}",
                    epoch + 1,
                    (squared_error / samples.len() as f64).sqrt()
                );
            }
        }

        let mut model = Self {
            global_mean,
            user_index,
            movie_index,
            user_bias,
            movie_bias,
            user_factors,
            movie_factors,
            training_size: train.len(),
            holdout_size: holdout.len(),
            holdout_rmse: None,
        };
        model.holdout_rmse = model.rmse(&holdout);

        match model.holdout_rmse {
            Some(rmse) => info!(
                "Trained on {} ratings, hold-out RMSE {:.4} over {} ratings",
                model.training_size, rmse, model.holdout_size
            ),
            None => info!("Trained on {} ratings, no hold-out", model.training_size),
        }
        model
    }

    /// Predicted rating of `user_id` for `movie_id`
    ///
    /// Defined for every pair; see the module docs for the cold-start rule.
    pub fn score(&self, user_id: UserId, movie_id: MovieId) -> f32 {
        let user = self.user_index.get(&user_id).copied();
        let movie = self.movie_index.get(&movie_id).copied();

        let mut estimate = self.global_mean;
        if let Some(u) = user {
            estimate += self.user_bias[u];
        }
        if let Some(i) = movie {
            estimate += self.movie_bias[i];
        }
        if let (Some(u), Some(i)) = (user, movie) {
            estimate += self.user_factors.row(u).dot(&self.movie_factors.row(i));
        }
        estimate.clamp(MIN_RATING, MAX_RATING)
    }

    /// The `limit` catalog movies `user_id` never rated, best predicted first
    ///
    /// Equal predictions keep catalog order. Rated-ness comes from the
    /// snapshot, not from the training partition.
    #[instrument(skip(self, index))]
    pub fn top_unrated(&self, index: &DataIndex, user_id: UserId, limit: usize) -> Vec<Candidate> {
        let rated: HashSet<MovieId> = index
            .get_user_ratings(user_id)
            .iter()
            .map(|r| r.movie_id)
            .collect();

        let mut scored: Vec<(MovieId, f32)> = index
            .movies()
            .par_iter()
            .filter(|movie| !rated.contains(&movie.id))
            .map(|movie| (movie.id, self.score(user_id, movie.id)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        debug!(
            "Scored unrated movies for user {}, returning {}",
            user_id,
            scored.len()
        );
        scored
            .into_iter()
            .map(|(movie_id, score)| Candidate::new(movie_id, CandidateSource::Collaborative, score))
            .collect()
    }

    /// Root-mean-squared error over `ratings`, `None` when empty
    pub fn rmse(&self, ratings: &[Rating]) -> Option<f32> {
        if ratings.is_empty() {
            return None;
        }
        let sum: f64 = ratings
            .iter()
            .map(|r| {
                let err = (r.rating - self.score(r.user_id, r.movie_id)) as f64;
                err * err
            })
            .sum();
        Some((sum / ratings.len() as f64).sqrt() as f32)
    }

    /// RMSE on the hold-out partition, if one existed
    pub fn holdout_rmse(&self) -> Option<f32> {
        self.holdout_rmse
    }

    pub fn global_mean(&self) -> f32 {
        self.global_mean
    }

    /// (training ratings, hold-out ratings)
    pub fn partition_sizes(&self) -> (usize, usize) {
        (self.training_size, self.holdout_size)
    }

    pub fn knows_user(&self, user_id: UserId) -> bool {
        self.user_index.contains_key(&user_id)
    }
}

/// Shuffle with `rng` and cut off the hold-out share
///
/// At least one rating always stays in training.
fn split(ratings: &[Rating], holdout_fraction: f32, rng: &mut StdRng) -> (Vec<Rating>, Vec<Rating>) {
    let mut shuffled = ratings.to_vec();
    shuffled.shuffle(rng);

    let n = shuffled.len();
    let holdout_len = if n < 2 {
        0
    } else {
        ((n as f32 * holdout_fraction).ceil() as usize).min(n - 1)
    };

    let train = shuffled.split_off(holdout_len);
    (train, shuffled)
}
