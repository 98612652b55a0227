use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::{actor, movie};

/// Mean rating as shown on the detail page. Movies nobody voted on show a
/// sentinel rather than zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum AverageRating {
    Rated(f64),
    NoRatings,
}

impl AverageRating {
    pub fn from_mean(mean: Option<f64>) -> Self {
        match mean {
            Some(m) => AverageRating::Rated(round_one_decimal(m)),
            None => AverageRating::NoRatings,
        }
    }
}

impl fmt::Display for AverageRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AverageRating::Rated(v) => write!(f, "{v:.1}"),
            AverageRating::NoRatings => f.write_str("N/A"),
        }
    }
}

/// Rounds the exact binary value, ties to even: 2.25 becomes 2.2 and 2.15
/// (stored as 2.1499...) becomes 2.1.
pub fn round_one_decimal(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

#[derive(Clone, Debug)]
pub struct CommentView {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub content: Option<String>,
    pub created_at: i64,
}

#[derive(Clone, Debug)]
pub struct MovieDetail {
    pub movie: movie::Model,
    pub actors: Vec<actor::Model>,
    /// Newest first.
    pub comments: Vec<CommentView>,
    pub average: AverageRating,
    pub own_rating: Option<i32>,
}

/// One entry of `/api/movies`. Unrated movies report `avg_rate` 0.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovieSummary {
    pub id: i32,
    pub name: String,
    pub release: i32,
    pub story: String,
    pub avg_rate: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub password: String,
}

#[derive(Clone, Debug, Default)]
pub struct NewMovie {
    pub name: String,
    pub release: i32,
    pub story: String,
    pub director: i32,
    /// Raw comma separated actor ids as typed into the form.
    pub actors: String,
}

#[derive(Clone, Debug)]
pub struct PosterUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}
