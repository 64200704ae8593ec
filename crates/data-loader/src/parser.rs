//! Readers and writers for the on-disk store files.
//!
//! - movies.json: JSON array of TMDB movie objects
//! - ratings.dat: userId::movieId::rating::timestamp::mood
//!
//! The ratings log is append-only; new ratings are written as one line each.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

const RATINGS_FILE: &str = "ratings.dat";

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

/// Parse the movie catalog
///
/// Fields missing from a TMDB object fall back to their defaults.
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let reader = BufReader::new(open(path)?);
    let movies: Vec<Movie> = serde_json::from_reader(reader)?;
    Ok(movies)
}

/// Write the movie catalog as pretty-printed JSON
pub fn write_movies(path: &Path, movies: &[Movie]) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, movies)?;
    Ok(())
}

/// Parse the ratings log
///
/// Format: userId::movieId::rating::timestamp::mood
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let mut content = String::new();
    open(path)?.read_to_string(&mut content)?;

    let mut ratings = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }
        ratings.push(parse_rating_line(line_trimmed, line_no)?);
    }
    Ok(ratings)
}

fn parse_rating_line(line: &str, line_no: usize) -> Result<Rating> {
    let parse_error = |reason: String| DataLoadError::ParseError {
        file: RATINGS_FILE.to_string(),
        line: line_no,
        reason,
    };

    let mut parts = line.split("::");
    let mut field = |name: &str| {
        parts
            .next()
            .ok_or_else(|| parse_error(format!("Missing {}", name)))
    };

    let user_id = field("userId")?;
    let movie_id = field("movieId")?;
    let rating_value = field("rating")?;
    let timestamp = field("timestamp")?;
    let mood = field("mood")?;

    let rating = Rating {
        user_id: user_id
            .parse()
            .map_err(|e| parse_error(format!("Invalid userId: {}", e)))?,
        movie_id: movie_id
            .parse()
            .map_err(|e| parse_error(format!("Invalid movieId: {}", e)))?,
        rating: rating_value
            .parse()
            .map_err(|e| parse_error(format!("Invalid rating: {}", e)))?,
        timestamp: timestamp
            .parse()
            .map_err(|e| parse_error(format!("Invalid timestamp: {}", e)))?,
        mood: mood
            .parse()
            .map_err(|_| parse_error(format!("Invalid mood: {}", mood)))?,
    };
    Ok(rating)
}

/// Render one rating as a ratings.dat line (without newline)
pub fn format_rating(rating: &Rating) -> String {
    format!(
        "{}::{}::{}::{}::{}",
        rating.user_id, rating.movie_id, rating.rating, rating.timestamp, rating.mood
    )
}

/// Append ratings to the log, creating it if needed
pub fn append_ratings(path: &Path, ratings: &[Rating]) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    for rating in ratings {
        writeln!(writer, "{}", format_rating(rating))?;
    }
    writer.flush()?;
    Ok(())
}
