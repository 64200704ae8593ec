//! Benchmarks for candidate generation
//!
//! Run with: cargo bench --package sources
//!
//! Uses a synthetic catalog and rating log so no dataset is needed.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::synthetic::generate_ratings;
use data_loader::{DataIndex, Movie};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sources::{CollaborativeConfig, CollaborativeModel, ContentIndex};

const WORDS: &[&str] = &[
    "space", "heist", "detective", "family", "war", "robot", "love", "ocean", "dragon",
    "school", "prison", "island", "city", "ghost", "music", "racing", "king", "virus",
];

fn load_test_data() -> DataIndex {
    let movies: Vec<Movie> = (1..=500u32)
        .map(|id| {
            let overview = (0..12)
                .map(|k| WORDS[(id as usize * 7 + k * 13) % WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ");
            Movie {
                id,
                title: format!("Movie {}", id),
                overview,
                release_date: None,
                vote_average: 6.5,
                vote_count: 100,
                genre_ids: vec![[28, 18, 35, 878][id as usize % 4]],
                poster_path: None,
                popularity: id as f32,
            }
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(42);
    let ratings = generate_ratings(&movies, 200, 40, 1_700_000_000, &mut rng);
    DataIndex::from_parts(movies, ratings)
}

fn bench_content_index(c: &mut Criterion) {
    let data_index = load_test_data();

    c.bench_function("content_index_build", |b| {
        b.iter(|| black_box(ContentIndex::build(black_box(data_index.movies()))))
    });

    let index = ContentIndex::build(data_index.movies());
    c.bench_function("content_similar", |b| {
        b.iter(|| black_box(index.similar(black_box(1), black_box(20))))
    });
}

fn bench_collaborative(c: &mut Criterion) {
    let data_index = load_test_data();
    let config = CollaborativeConfig::default();

    c.bench_function("collaborative_train", |b| {
        b.iter(|| black_box(CollaborativeModel::train(black_box(data_index.ratings()), &config)))
    });

    let model = CollaborativeModel::train(data_index.ratings(), &config);
    c.bench_function("collaborative_top_unrated", |b| {
        b.iter(|| black_box(model.top_unrated(&data_index, black_box(1), black_box(20))))
    });
}

criterion_group!(benches, bench_content_index, bench_collaborative);
criterion_main!(benches);
