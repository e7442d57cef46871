//! Upstream payload shapes, as TMDB sends them.
//!
//! Only the fields the cache keeps are modelled. Strings TMDB is known to
//! send as `null` are optional.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmdbGenre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmdbCastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmdbCrewMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

/// `/movie/{id}?append_to_response=credits`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub credits: Option<TmdbCredits>,
}

/// Element of `/search/movie` results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmdbMovieResult {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmdbPage<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmdbCreator {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmdbSeasonSummary {
    pub id: u64,
    pub season_number: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub episode_count: u32,
    #[serde(default)]
    pub vote_average: f64,
}

/// Series as returned by both `/tv/{id}` and `/search/tv`.
///
/// Search results carry `genre_ids` and none of the detail-only fields;
/// the detail endpoint carries `genres` objects instead of ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmdbSeries {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub created_by: Option<Vec<TmdbCreator>>,
    #[serde(default)]
    pub number_of_episodes: Option<u32>,
    #[serde(default)]
    pub number_of_seasons: Option<u32>,
    #[serde(default)]
    pub seasons: Option<Vec<TmdbSeasonSummary>>,
}

/// `/tv/{id}/season/{n}`. Episodes stay raw so one malformed element does
/// not fail the whole season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmdbSeasonDetail {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub season_number: u32,
    #[serde(default)]
    pub episodes: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmdbGuestStar {
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

/// Episode from a season listing or from `/tv/{id}/season/{n}/episode/{e}`.
/// Only the latter is guaranteed to carry `guest_stars`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmdbEpisode {
    pub id: u64,
    pub episode_number: u32,
    #[serde(default)]
    pub season_number: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub still_path: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub guest_stars: Option<Vec<TmdbGuestStar>>,
}
