use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{MemoryStore, MovieId, UserId};
use server::{MovieRecommendation, RecommendationOrchestrator, ServiceConfig};
use sources::CollaborativeConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Brainwave Recs - hybrid movie recommendations with a mood twist
#[derive(Parser)]
#[command(name = "brainwave-recs")]
#[command(about = "Movie recommendations from content similarity, collaborative filtering and brain-wave moods", long_about = None)]
struct Cli {
    /// Directory holding movies.json and ratings.dat
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Latent factors for the collaborative model
    #[arg(long, default_value = "100")]
    factors: usize,

    /// Training passes for the collaborative model
    #[arg(long, default_value = "20")]
    epochs: usize,

    /// Seed for synthetic ratings and brain simulation
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get movie recommendations for a user
    Recommend {
        #[arg(long)]
        user_id: UserId,

        /// Seed movie for hybrid recommendations
        #[arg(long)]
        movie_id: Option<MovieId>,

        /// Number of recommendations to return
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Movies similar in content to a movie
    Similar {
        #[arg(long)]
        movie_id: MovieId,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Most popular movies in the catalog
    Popular {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Recommendations for a brain-wave mood (alpha, beta, gamma, delta, theta)
    Mood {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        wave: Option<String>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Simulate brain activity while a user watches a movie
    Analyze {
        #[arg(long)]
        movie_id: MovieId,

        #[arg(long)]
        user_id: UserId,
    },

    /// Rate a movie
    Rate {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        movie_id: MovieId,

        /// 0.5 to 5.0 in half steps
        #[arg(long)]
        rating: f32,

        /// Mood while watching (default: alpha)
        #[arg(long)]
        mood: Option<String>,
    },

    /// Train the collaborative model and report its hold-out error
    Train,

    /// Generate ratings if the store has none, then train and index
    Seed {
        /// Synthetic users to create
        #[arg(long, default_value = "50")]
        users: u32,

        /// Ratings per synthetic user
        #[arg(long, default_value = "15")]
        ratings_per_user: usize,
    },

    /// Show a user's rating profile
    User {
        #[arg(long)]
        user_id: UserId,
    },

    /// Show one movie
    Movie {
        #[arg(long)]
        movie_id: MovieId,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading data from {}...", cli.data_dir.display());
    let start = Instant::now();
    let store = MemoryStore::open(&cli.data_dir).context("Failed to load movie data")?;
    println!("{} Loaded data in {:?}", "✓".green(), start.elapsed());

    let mut config = ServiceConfig::default()
        .with_data_dir(cli.data_dir.clone())
        .with_collaborative(
            CollaborativeConfig::default()
                .with_factors(cli.factors)
                .with_epochs(cli.epochs),
        );
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Commands::Seed {
        users,
        ratings_per_user,
    } = &cli.command
    {
        config = config.with_synthetic_ratings(*users, *ratings_per_user);
    }

    let default_limit = config.default_limit;
    let orchestrator = RecommendationOrchestrator::new(Arc::new(store), config);

    match cli.command {
        Commands::Recommend {
            user_id,
            movie_id,
            limit,
        } => {
            let limit = limit.unwrap_or(default_limit);
            let recommendations = orchestrator
                .get_recommendations(user_id, movie_id, limit)
                .await?;
            let header = match movie_id {
                Some(id) => format!("Recommendations for user {} like movie {}:", user_id, id),
                None => format!("Recommendations for user {}:", user_id),
            };
            print_recommendations(&header, &recommendations);
        }
        Commands::Similar { movie_id, limit } => {
            let similar = orchestrator
                .similar_movies(movie_id, limit.unwrap_or(default_limit))
                .await?;
            print_recommendations(&format!("Movies similar to {}:", movie_id), &similar);
        }
        Commands::Popular { limit } => {
            let popular = orchestrator
                .popular_movies(limit.unwrap_or(default_limit))
                .await?;
            print_recommendations("Popular movies:", &popular);
        }
        Commands::Mood {
            user_id,
            wave,
            limit,
        } => {
            let wave = wave.unwrap_or_else(|| orchestrator.config().default_mood.to_string());
            let result = orchestrator
                .get_mood_recommendations(user_id, &wave, limit.unwrap_or(default_limit))
                .await?;
            print_recommendations(
                &format!("Picks for {} waves:", result.wave),
                &result.recommendations,
            );
        }
        Commands::Analyze { movie_id, user_id } => handle_analyze(&orchestrator, movie_id, user_id).await?,
        Commands::Rate {
            user_id,
            movie_id,
            rating,
            mood,
        } => {
            let stored = orchestrator
                .rate_movie(user_id, movie_id, rating, mood.as_deref())
                .await?;
            println!(
                "{} User {} rated movie {} with {} ({} waves)",
                "✓".green(),
                stored.user_id,
                stored.movie_id,
                stored.rating,
                stored.mood
            );
        }
        Commands::Train => {
            let start = Instant::now();
            let report = orchestrator.retrain().await?;
            println!("{} Trained in {:?}", "✓".green(), start.elapsed());
            println!("{}Training ratings: {}", "• ".cyan(), report.training_ratings);
            println!("{}Hold-out ratings: {}", "• ".cyan(), report.holdout_ratings);
            println!("{}Global mean: {:.3}", "• ".cyan(), report.global_mean);
            match report.holdout_rmse {
                Some(rmse) => println!("{}Hold-out RMSE: {:.4}", "• ".cyan(), rmse),
                None => println!("{}Hold-out RMSE: n/a", "• ".cyan()),
            }
        }
        Commands::Seed { .. } => {
            let report = orchestrator.initialize().await?;
            println!(
                "{} {} movies, {} users, {} ratings ({} generated)",
                "✓".green(),
                report.movies,
                report.users,
                report.ratings,
                report.synthetic_ratings
            );
            if let Some(rmse) = report.holdout_rmse {
                println!("{}Hold-out RMSE: {:.4}", "• ".cyan(), rmse);
            }
        }
        Commands::User { user_id } => handle_user(&orchestrator, user_id).await?,
        Commands::Movie { movie_id } => {
            let movie = orchestrator.movie_details(movie_id).await?;
            println!("{}", format!("{} [{}]", movie.title, movie.id).bold().blue());
            if let Some(date) = &movie.release_date {
                println!("{}Released: {}", "• ".green(), date);
            }
            let genres: Vec<&str> = movie.genres().map(|g| g.label()).collect();
            println!("{}Genres: {}", "• ".green(), genres.join(", "));
            println!(
                "{}Rating: {:.1} ({} votes)",
                "• ".green(),
                movie.vote_average,
                movie.vote_count
            );
            println!("{}", movie.overview);
        }
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(orchestrator, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'analyze' command
async fn handle_analyze(
    orchestrator: &RecommendationOrchestrator,
    movie_id: MovieId,
    user_id: UserId,
) -> Result<()> {
    let movie = orchestrator.movie_details(movie_id).await?;
    let analysis = orchestrator.analyze_brain(movie_id, user_id).await?;

    println!(
        "{}",
        format!("Brain activity for user {} watching {}:", user_id, movie.title)
            .bold()
            .blue()
    );
    for (region, value) in analysis.activity.iter() {
        let bar = "█".repeat((value * 20.0).round() as usize);
        let line = format!("  {:<10} {:.2} {}", region.name(), value, bar);
        if region == analysis.dominant_region {
            println!("{}", line.yellow());
        } else {
            println!("{}", line);
        }
    }
    println!(
        "{} {} waves: {}",
        "→".green(),
        analysis.mood.to_string().bold(),
        analysis.description
    );
    Ok(())
}

/// Handle the 'user' command
async fn handle_user(orchestrator: &RecommendationOrchestrator, user_id: UserId) -> Result<()> {
    let profile = orchestrator.user_profile(user_id).await?;

    println!("{}", format!("User ID: {}", user_id).bold().blue());
    println!("{}Number of ratings: {}", "• ".cyan(), profile.rating_count);
    println!("{}Average rating: {:.2}", "• ".cyan(), profile.average_rating);

    println!("Top rated movies:");
    for movie in profile.top_rated.iter().take(5) {
        println!("  - {} [{}]", movie.title, movie.movie_id);
    }

    println!("Moods while rating:");
    for (mood, count) in &profile.moods {
        if *count > 0 {
            println!("  - {}: {} ratings", mood, count);
        }
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: RecommendationOrchestrator,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        println!("Nothing to do");
        return Ok(());
    }

    // Train up front so the first request doesn't pay for it
    orchestrator.retrain().await?;
    let users = orchestrator.config().synthetic_users.max(1);
    let limit = orchestrator.config().default_limit;

    let user_ids: Vec<UserId> = (0..requests)
        .map(|_| rand::random::<u32>() % users + 1)
        .collect();

    let start = Instant::now();
    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    for batch in user_ids.chunks(concurrent.max(1)) {
        let mut handles = vec![];
        for &user in batch {
            let orchestrator = orchestrator.clone();
            handles.push(tokio::spawn(async move {
                let start = Instant::now();
                orchestrator.get_recommendations(user, None, limit).await?;
                Ok::<_, anyhow::Error>(start.elapsed())
            }));
        }
        for handle in handles {
            timings.push(handle.await??);
        }
        debug!("Completed {} of {} requests", timings.len(), requests);
    }
    let total_time = start.elapsed();

    timings.sort();
    let sum: Duration = timings.iter().sum();
    let avg_latency = sum / timings.len() as u32;
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("Benchmark results:");
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn print_recommendations(header: &str, recommendations: &[MovieRecommendation]) {
    println!("{}", header.bold().blue());
    if recommendations.is_empty() {
        println!("  (none)");
    }
    for (rank, movie) in recommendations.iter().enumerate() {
        println!(
            "{}. {} [{}] - {:.1}",
            (rank + 1).to_string().green(),
            movie.title,
            movie.movie_id,
            movie.rating
        );
    }
}
