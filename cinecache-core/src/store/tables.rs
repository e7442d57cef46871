use std::fmt;

use serde::{Serialize, de::DeserializeOwned};
use url::form_urlencoded;

use crate::merge::{self, Mergeable};
use crate::records::{
    ChannelMovieRecord, EpisodeRecord, MovieRecord, MovieSearchRecord,
    SeasonRecord, SeriesRecord, SeriesSearchRecord,
};

/// Logical tables emulated on top of the flat key-value backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    MovieByChannel,
    MovieById,
    SeriesById,
    SeriesSeasons,
    SeriesEpisodes,
    EpisodeGuestStars,
    MovieSearch,
    SeriesSearch,
}

/// How a table's rows are laid out in the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableShape {
    /// One JSON object per natural key.
    Scalar,
    /// One JSON array per parent key.
    List,
    /// Rows live inside another table's elements and own no store key.
    Embedded { owner: Table },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub table: Table,
    pub namespace: &'static str,
    pub shape: TableShape,
}

impl Table {
    pub const ALL: [Table; 8] = [
        Table::MovieByChannel,
        Table::MovieById,
        Table::SeriesById,
        Table::SeriesSeasons,
        Table::SeriesEpisodes,
        Table::EpisodeGuestStars,
        Table::MovieSearch,
        Table::SeriesSearch,
    ];

    pub const fn spec(self) -> TableSpec {
        let (namespace, shape) = match self {
            Table::MovieByChannel => ("movie:channel", TableShape::Scalar),
            Table::MovieById => ("movie:id", TableShape::Scalar),
            Table::SeriesById => ("series:id", TableShape::Scalar),
            Table::SeriesSeasons => ("series:seasons", TableShape::List),
            Table::SeriesEpisodes => ("series:episodes", TableShape::List),
            Table::EpisodeGuestStars => (
                "series:episodes",
                TableShape::Embedded {
                    owner: Table::SeriesEpisodes,
                },
            ),
            Table::MovieSearch => ("search:movie", TableShape::Scalar),
            Table::SeriesSearch => ("search:series", TableShape::Scalar),
        };

        TableSpec {
            table: self,
            namespace,
            shape,
        }
    }

    /// Table whose store keys hold this table's rows.
    pub const fn storage_table(self) -> Table {
        match self.spec().shape {
            TableShape::Embedded { owner } => owner,
            TableShape::Scalar | TableShape::List => self,
        }
    }

    pub fn store_key<K: NaturalKey + ?Sized>(self, key: &K) -> String {
        let spec = self.storage_table().spec();
        format!("{}:{}", spec.namespace, key.segments())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::MovieByChannel => "movie-by-channel",
            Table::MovieById => "movie-by-id",
            Table::SeriesById => "series-by-id",
            Table::SeriesSeasons => "series-seasons",
            Table::SeriesEpisodes => "series-episodes",
            Table::EpisodeGuestStars => "episode-guest-stars",
            Table::MovieSearch => "movie-search",
            Table::SeriesSearch => "series-search",
        };
        f.write_str(name)
    }
}

/// Domain identifier(s) addressing one logical record or one list.
pub trait NaturalKey: fmt::Debug + Send + Sync {
    /// Key suffix appended after the table namespace.
    fn segments(&self) -> String;
}

fn escape(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelKey {
    pub channel_id: String,
    pub language: String,
}

impl ChannelKey {
    pub fn new(channel_id: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            language: language.into(),
        }
    }
}

impl NaturalKey for ChannelKey {
    fn segments(&self) -> String {
        format!("{}:{}", escape(&self.channel_id), escape(&self.language))
    }
}

/// (tmdbId, language), used by movie-by-id, series-by-id and as the parent
/// of the series-seasons list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaKey {
    pub tmdb_id: u64,
    pub language: String,
}

impl MediaKey {
    pub fn new(tmdb_id: u64, language: impl Into<String>) -> Self {
        Self {
            tmdb_id,
            language: language.into(),
        }
    }
}

impl NaturalKey for MediaKey {
    fn segments(&self) -> String {
        format!("{}:{}", self.tmdb_id, escape(&self.language))
    }
}

/// Parent of the series-episodes list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeasonKey {
    pub series_id: u64,
    pub language: String,
    pub season_number: u32,
}

impl SeasonKey {
    pub fn new(
        series_id: u64,
        language: impl Into<String>,
        season_number: u32,
    ) -> Self {
        Self {
            series_id,
            language: language.into(),
            season_number,
        }
    }
}

impl NaturalKey for SeasonKey {
    fn segments(&self) -> String {
        format!(
            "{}:{}:{}",
            self.series_id,
            escape(&self.language),
            self.season_number
        )
    }
}

/// Canonical request key produced by [`crate::keys::KeyCodec`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey(pub String);

impl NaturalKey for RequestKey {
    fn segments(&self) -> String {
        self.0.clone()
    }
}

/// A record stored as one JSON object per natural key.
pub trait ScalarRecord:
    Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    const TABLE: Table;
    /// Whether an upsert must read the stored record first so that
    /// [`ScalarRecord::absorb`] can carry fields forward.
    const MERGES_PREVIOUS: bool = false;

    type Key: NaturalKey;

    fn stamp(&mut self, now: i64);

    /// Runs on the already stamped record.
    fn absorb(&mut self, _previous: &Self) {}
}

/// A record stored as an element of one JSON array per parent key.
pub trait ListRecord:
    Mergeable + Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    const TABLE: Table;

    type Parent: NaturalKey;

    fn stamp(&mut self, now: i64);
}

impl ScalarRecord for MovieRecord {
    const TABLE: Table = Table::MovieById;
    type Key = MediaKey;

    fn stamp(&mut self, now: i64) {
        self.updated_at = now;
    }
}

impl ScalarRecord for ChannelMovieRecord {
    const TABLE: Table = Table::MovieByChannel;
    type Key = ChannelKey;

    fn stamp(&mut self, now: i64) {
        self.movie.updated_at = now;
    }
}

impl ScalarRecord for SeriesRecord {
    const TABLE: Table = Table::SeriesById;
    const MERGES_PREVIOUS: bool = true;
    type Key = MediaKey;

    fn stamp(&mut self, now: i64) {
        self.updated_at = now;
    }

    fn absorb(&mut self, previous: &Self) {
        merge::carry_forward_series(self, previous);
    }
}

impl ScalarRecord for MovieSearchRecord {
    const TABLE: Table = Table::MovieSearch;
    type Key = RequestKey;

    fn stamp(&mut self, now: i64) {
        self.updated_at = now;
    }
}

impl ScalarRecord for SeriesSearchRecord {
    const TABLE: Table = Table::SeriesSearch;
    type Key = RequestKey;

    fn stamp(&mut self, now: i64) {
        self.updated_at = now;
    }
}

impl ListRecord for SeasonRecord {
    const TABLE: Table = Table::SeriesSeasons;
    type Parent = MediaKey;

    fn stamp(&mut self, now: i64) {
        self.updated_at = now;
    }
}

impl ListRecord for EpisodeRecord {
    const TABLE: Table = Table::SeriesEpisodes;
    type Parent = SeasonKey;

    fn stamp(&mut self, now: i64) {
        self.updated_at = now;
    }
}
