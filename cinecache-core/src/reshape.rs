//! Upstream payloads into stored records.
//!
//! Every function leaves `updated_at` at zero; the store stamps it on write.

use serde_json::Value;

use crate::merge;
use crate::providers::{
    TmdbEpisode, TmdbGuestStar, TmdbMovie, TmdbMovieResult, TmdbSeasonSummary,
    TmdbSeries,
};
use crate::records::{
    CreatorRecord, EpisodeRecord, GuestStarRecord, MovieRecord, MovieSearchHit,
    SeasonRecord, SeriesRecord,
};

/// Billed cast kept on a movie record.
pub const MAX_CAST: usize = 10;

pub fn movie(raw: TmdbMovie) -> MovieRecord {
    let credits = raw.credits.unwrap_or_default();

    let director_name = credits
        .crew
        .iter()
        .find(|member| member.job == "Director")
        .map(|member| member.name.clone());

    let mut cast = credits.cast;
    cast.sort_by_key(|member| member.order);
    cast.truncate(MAX_CAST);

    MovieRecord {
        tmdb_id: raw.id,
        title: raw.title,
        overview: raw.overview.unwrap_or_default(),
        release_date: non_empty(raw.release_date),
        poster_path: raw.poster_path,
        genres: raw.genres.into_iter().map(|genre| genre.name).collect(),
        rating: raw.vote_average,
        rating_count: raw.vote_count,
        director_name,
        cast_profile_paths: cast
            .iter()
            .map(|member| member.profile_path.clone())
            .collect(),
        cast: cast.into_iter().map(|member| member.name).collect(),
        updated_at: 0,
    }
}

pub fn movie_hit(raw: TmdbMovieResult) -> MovieSearchHit {
    MovieSearchHit {
        tmdb_id: raw.id,
        title: raw.title,
        overview: raw.overview.unwrap_or_default(),
        release_date: non_empty(raw.release_date),
        poster_path: raw.poster_path,
        rating: raw.vote_average,
        rating_count: raw.vote_count,
    }
}

/// Detail responses fill the extended fields; search results leave them
/// `None`.
pub fn series(raw: TmdbSeries) -> SeriesRecord {
    let genre_ids = if raw.genre_ids.is_empty() {
        raw.genres.iter().map(|genre| genre.id).collect()
    } else {
        raw.genre_ids
    };

    SeriesRecord {
        tmdb_id: raw.id,
        name: raw.name,
        original_name: raw.original_name,
        original_language: raw.original_language,
        overview: raw.overview.unwrap_or_default(),
        genre_ids,
        poster_path: raw.poster_path,
        first_air_date: non_empty(raw.first_air_date),
        vote_average: raw.vote_average,
        vote_count: raw.vote_count,
        created_by: raw.created_by.map(|creators| {
            creators
                .into_iter()
                .map(|creator| CreatorRecord {
                    id: creator.id,
                    name: creator.name,
                    profile_path: creator.profile_path,
                })
                .collect()
        }),
        number_of_episodes: raw.number_of_episodes,
        number_of_seasons: raw.number_of_seasons,
        seasons: raw
            .seasons
            .map(|seasons| seasons.into_iter().map(season).collect()),
        updated_at: 0,
    }
}

pub fn season(raw: TmdbSeasonSummary) -> SeasonRecord {
    SeasonRecord {
        id: raw.id,
        season_number: raw.season_number,
        name: raw.name.unwrap_or_default(),
        overview: raw.overview.unwrap_or_default(),
        poster_path: raw.poster_path,
        air_date: non_empty(raw.air_date),
        episode_count: raw.episode_count,
        vote_average: raw.vote_average,
        updated_at: 0,
    }
}

/// Season listings do not own guest stars, so the episodes they produce
/// leave `guest_stars` unset and the merge keeps what was stored.
pub fn episodes_from_season(raw: Vec<Value>) -> Vec<EpisodeRecord> {
    merge::decode_batch::<TmdbEpisode>(raw, "season episodes")
        .into_iter()
        .map(|episode| EpisodeRecord {
            guest_stars: None,
            listed: true,
            ..self::episode(episode)
        })
        .collect()
}

pub fn episode(raw: TmdbEpisode) -> EpisodeRecord {
    EpisodeRecord {
        id: raw.id,
        episode_number: raw.episode_number,
        name: raw.name.unwrap_or_default(),
        overview: raw.overview.unwrap_or_default(),
        still_path: raw.still_path,
        air_date: non_empty(raw.air_date),
        vote_average: raw.vote_average,
        vote_count: raw.vote_count,
        updated_at: 0,
        guest_stars: raw
            .guest_stars
            .map(|guests| guests.into_iter().map(guest_star).collect()),
        listed: false,
    }
}

pub fn guest_star(raw: TmdbGuestStar) -> GuestStarRecord {
    GuestStarRecord {
        id: raw.id,
        name: raw.name,
        original_name: raw.original_name,
        character: raw.character,
        profile_path: raw.profile_path,
        order: raw.order,
    }
}

/// TMDB sends unknown dates as `""`.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
