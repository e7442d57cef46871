//! Decides whether a cached record can be served without going upstream.

use std::time::Duration;

use crate::records::{
    ChannelMovieRecord, EpisodeRecord, MovieRecord, MovieSearchRecord,
    SeasonRecord, SeriesRecord, SeriesSearchRecord,
};

pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Staleness and completeness signals of a stored record.
pub trait Freshness {
    fn updated_at(&self) -> i64;

    /// Record was written but never received real upstream data; it is
    /// stale regardless of age.
    fn never_enriched(&self) -> bool {
        false
    }

    /// Record was written by a code path with partial field coverage.
    fn is_incomplete(&self) -> bool {
        false
    }

    /// Element of a list view that was written by the listing itself, not
    /// by a lookup of that one element.
    fn is_listed(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FreshnessPolicy {
    stale_after_secs: i64,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_AFTER)
    }
}

impl FreshnessPolicy {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            stale_after_secs: i64::try_from(stale_after.as_secs())
                .unwrap_or(i64::MAX),
        }
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs.unsigned_abs())
    }

    /// Absent, older than the threshold, or never enriched. A record
    /// exactly `stale_after` old is still fresh.
    pub fn is_stale<R: Freshness>(&self, record: Option<&R>, now: i64) -> bool {
        match record {
            None => true,
            Some(record) => {
                now.saturating_sub(record.updated_at()) > self.stale_after_secs
                    || record.never_enriched()
            }
        }
    }

    /// Heuristic for series records seeded from search results rather than a
    /// detail fetch.
    pub fn is_incomplete(series: &SeriesRecord) -> bool {
        let (Some(created_by), Some(_), Some(episodes), Some(seasons)) = (
            series.created_by.as_ref(),
            series.seasons.as_ref(),
            series.number_of_episodes,
            series.number_of_seasons,
        ) else {
            return true;
        };

        created_by.is_empty() && episodes == 0 && seasons == 0
    }

    /// Fresh and complete.
    pub fn is_usable<R: Freshness>(&self, record: Option<&R>, now: i64) -> bool {
        !self.is_stale(record, now)
            && record.is_some_and(|record| !record.is_incomplete())
    }

    /// A collection view is served from cache only when it has elements,
    /// every element came from a full listing and none of them is stale.
    pub fn is_collection_usable<R: Freshness>(&self, items: &[R], now: i64) -> bool {
        !items.is_empty()
            && items
                .iter()
                .all(|item| item.is_listed() && !self.is_stale(Some(item), now))
    }
}

fn movie_never_enriched(movie: &MovieRecord) -> bool {
    movie.rating == 0.0 && movie.rating_count == 0
}

impl Freshness for MovieRecord {
    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn never_enriched(&self) -> bool {
        movie_never_enriched(self)
    }
}

impl Freshness for ChannelMovieRecord {
    fn updated_at(&self) -> i64 {
        self.movie.updated_at
    }

    fn never_enriched(&self) -> bool {
        movie_never_enriched(&self.movie)
    }
}

impl Freshness for SeriesRecord {
    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn is_incomplete(&self) -> bool {
        FreshnessPolicy::is_incomplete(self)
    }
}

impl Freshness for SeasonRecord {
    fn updated_at(&self) -> i64 {
        self.updated_at
    }
}

impl Freshness for EpisodeRecord {
    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    /// An episode fetched without guest-star enrichment.
    fn is_incomplete(&self) -> bool {
        self.guest_stars().is_empty()
    }

    fn is_listed(&self) -> bool {
        self.listed
    }
}

impl Freshness for MovieSearchRecord {
    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn is_incomplete(&self) -> bool {
        self.results.is_empty()
    }
}

impl Freshness for SeriesSearchRecord {
    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn is_incomplete(&self) -> bool {
        self.results.is_empty()
    }
}
