//! Persisted record shapes.
//!
//! Every record is stored as camelCase JSON. Scalar tables hold one object
//! per natural key, list tables hold one array per parent key.

use serde::{Deserialize, Serialize};

/// Canonical movie record (movie-by-id table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    pub tmdb_id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub rating_count: u64,
    #[serde(default)]
    pub director_name: Option<String>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub cast_profile_paths: Vec<Option<String>>,
    #[serde(default)]
    pub updated_at: i64,
}

/// Movie currently associated with a channel (movie-by-channel table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMovieRecord {
    pub channel_id: String,
    /// Title the channel asked for when this record was resolved. A lookup
    /// with a different title is a miss.
    #[serde(default)]
    pub lookup_title: String,
    #[serde(flatten)]
    pub movie: MovieRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// Series record (series-by-id table).
///
/// `created_by`, `number_of_episodes`, `number_of_seasons` and `seasons`
/// are only known after a detail fetch; a record seeded from search results
/// leaves them empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRecord {
    pub tmdb_id: u64,
    pub name: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Vec<CreatorRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_episodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_seasons: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasons: Option<Vec<SeasonRecord>>,
    #[serde(default)]
    pub updated_at: i64,
}

impl SeriesRecord {
    pub fn has_extended_fields(&self) -> bool {
        self.created_by.is_some()
            || self.number_of_episodes.is_some()
            || self.number_of_seasons.is_some()
            || self.seasons.is_some()
    }
}

/// One element of the series-seasons list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonRecord {
    pub id: u64,
    pub season_number: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub episode_count: u32,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub updated_at: i64,
}

/// One element of the series-episodes list.
///
/// `guest_stars` is `None` when the writer is not responsible for guest
/// stars (for example a season listing); the merge keeps whatever was
/// stored before. Stored episodes always carry `Some`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    pub id: u64,
    pub episode_number: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub still_path: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_stars: Option<Vec<GuestStarRecord>>,
    /// Written by a full season listing rather than a single episode
    /// lookup.
    #[serde(default)]
    pub listed: bool,
}

impl EpisodeRecord {
    /// Minimal stand-in used when a guest star arrives before its episode.
    /// `updated_at` stays at zero so the entry reads as stale until a real
    /// episode upsert fills it in.
    pub fn placeholder(id: u64, episode_number: u32) -> Self {
        Self {
            id,
            episode_number,
            name: String::new(),
            overview: String::new(),
            still_path: None,
            air_date: None,
            vote_average: 0.0,
            vote_count: 0,
            updated_at: 0,
            guest_stars: Some(Vec::new()),
            listed: false,
        }
    }

    pub fn guest_stars(&self) -> &[GuestStarRecord] {
        self.guest_stars.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestStarRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: u32,
}

/// Identifies the episode a guest star belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeRef {
    pub episode_id: u64,
    pub episode_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSearchHit {
    pub tmdb_id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub rating_count: u64,
}

/// Cached response of a movie search, keyed by the derived request key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSearchRecord {
    pub query: String,
    pub language: String,
    #[serde(default)]
    pub results: Vec<MovieSearchHit>,
    #[serde(default)]
    pub updated_at: i64,
}

/// Cached response of a series search. Each hit is also seeded into the
/// series-by-id table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSearchRecord {
    pub query: String,
    pub language: String,
    #[serde(default)]
    pub results: Vec<SeriesRecord>,
    #[serde(default)]
    pub updated_at: i64,
}
