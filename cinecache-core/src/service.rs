//! Read-through orchestration.
//!
//! Every lookup follows the same path: read the store, ask the freshness
//! policy, and on a miss fetch upstream, reshape, upsert and return. Store
//! failures never fail a lookup. A failed read is a miss and a failed write
//! still returns the freshly fetched data. Upstream failures are returned as
//! is; stale data is never served once a refresh was attempted.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{Result, ServiceError, StoreResult};
use crate::freshness::{Freshness, FreshnessPolicy};
use crate::keys::KeyCodec;
use crate::merge;
use crate::providers::MetadataSource;
use crate::records::{
    ChannelMovieRecord, EpisodeRecord, EpisodeRef, MovieRecord,
    MovieSearchRecord, SeasonRecord, SeriesRecord, SeriesSearchRecord,
};
use crate::reshape;
use crate::store::{
    ChannelKey, ListRecord, MediaKey, RecordStore, RequestKey, ScalarRecord,
    SeasonKey, StoreFallback,
};

#[derive(Clone)]
pub struct MetadataService {
    store: RecordStore,
    source: Arc<dyn MetadataSource>,
    policy: FreshnessPolicy,
    keys: KeyCodec,
}

impl fmt::Debug for MetadataService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataService")
            .field("store", &self.store)
            .field("policy", &self.policy)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl MetadataService {
    pub fn new(store: RecordStore, source: Arc<dyn MetadataSource>) -> Self {
        Self {
            store,
            source,
            policy: FreshnessPolicy::default(),
            keys: KeyCodec::default(),
        }
    }

    pub fn with_policy(mut self, policy: FreshnessPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_key_codec(mut self, keys: KeyCodec) -> Self {
        self.keys = keys;
        self
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn policy(&self) -> &FreshnessPolicy {
        &self.policy
    }

    pub fn keys(&self) -> &KeyCodec {
        &self.keys
    }

    pub async fn movie(&self, id: u64, language: &str) -> Result<MovieRecord> {
        let key = MediaKey::new(id, language);
        if let Some(cached) = self.cached_one::<MovieRecord>(&key).await {
            return Ok(cached);
        }

        let raw = self.source.fetch_movie(id, language).await?;
        Ok(self.persist_one(&key, reshape::movie(raw)).await)
    }

    /// Resolve the movie a channel is currently showing by title. The
    /// cached entry only counts when it was resolved for the same title.
    pub async fn movie_for_channel(
        &self,
        channel_id: &str,
        title: &str,
        language: &str,
    ) -> Result<ChannelMovieRecord> {
        let title = title.trim();
        let key = ChannelKey::new(channel_id, language);
        if let Some(cached) = self.cached_one::<ChannelMovieRecord>(&key).await
            && cached.lookup_title.eq_ignore_ascii_case(title)
        {
            return Ok(cached);
        }

        let page = self.source.search_movies(title, language).await?;
        let Some(hit) = page.results.into_iter().next() else {
            return Err(ServiceError::NotFound(format!(
                "no movie matches title {title:?}"
            )));
        };

        let movie = self.movie(hit.id, language).await?;
        info!(channel_id, tmdb_id = movie.tmdb_id, "channel movie resolved");
        let record = ChannelMovieRecord {
            channel_id: channel_id.to_string(),
            lookup_title: title.to_string(),
            movie,
        };
        Ok(self.persist_one(&key, record).await)
    }

    /// `request_url` is the inbound request; its canonical form keys the
    /// cached response.
    pub async fn search_movies(
        &self,
        request_url: &str,
        query: &str,
        language: &str,
    ) -> Result<MovieSearchRecord> {
        let key = RequestKey(self.keys.derive_key(request_url));
        if let Some(cached) = self.cached_one::<MovieSearchRecord>(&key).await {
            return Ok(cached);
        }

        let page = self.source.search_movies(query, language).await?;
        let record = MovieSearchRecord {
            query: query.to_string(),
            language: language.to_string(),
            results: page.results.into_iter().map(reshape::movie_hit).collect(),
            updated_at: 0,
        };
        Ok(self.persist_one(&key, record).await)
    }

    /// Like [`Self::search_movies`]; each hit also seeds the series-by-id
    /// table without downgrading records that already hold detail fields.
    pub async fn search_series(
        &self,
        request_url: &str,
        query: &str,
        language: &str,
    ) -> Result<SeriesSearchRecord> {
        let key = RequestKey(self.keys.derive_key(request_url));
        if let Some(cached) = self.cached_one::<SeriesSearchRecord>(&key).await
        {
            return Ok(cached);
        }

        let page = self.source.search_series(query, language).await?;
        let results: Vec<SeriesRecord> =
            page.results.into_iter().map(reshape::series).collect();

        for hit in &results {
            let series_key = MediaKey::new(hit.tmdb_id, language);
            self.store
                .upsert_one(&series_key, hit.clone())
                .await
                .or_skip("series-by-id");
        }

        let record = SeriesSearchRecord {
            query: query.to_string(),
            language: language.to_string(),
            results,
            updated_at: 0,
        };
        Ok(self.persist_one(&key, record).await)
    }

    /// Series detail. Records seeded from search results are incomplete and
    /// trigger a detail fetch.
    pub async fn series(&self, id: u64, language: &str) -> Result<SeriesRecord> {
        let key = MediaKey::new(id, language);
        if let Some(cached) = self.cached_one::<SeriesRecord>(&key).await {
            return Ok(cached);
        }

        let (series, _) = self.refresh_series(id, language).await?;
        Ok(series)
    }

    pub async fn seasons(
        &self,
        series_id: u64,
        language: &str,
    ) -> Result<Vec<SeasonRecord>> {
        let parent = MediaKey::new(series_id, language);
        if let Some(cached) = self.cached_list::<SeasonRecord>(&parent).await {
            return Ok(cached);
        }

        let (_, seasons) = self.refresh_series(series_id, language).await?;
        Ok(seasons)
    }

    /// Episode list of one season. Guest stars attached earlier by
    /// [`Self::episode`] survive the refresh.
    pub async fn season_episodes(
        &self,
        series_id: u64,
        season_number: u32,
        language: &str,
    ) -> Result<Vec<EpisodeRecord>> {
        let parent = SeasonKey::new(series_id, language, season_number);
        if let Some(cached) = self.cached_list::<EpisodeRecord>(&parent).await {
            return Ok(cached);
        }

        let detail = self
            .source
            .fetch_season_detail(series_id, season_number, language)
            .await?;
        let episodes = reshape::episodes_from_season(detail.episodes);
        Ok(self.persist_list(&parent, episodes).await)
    }

    /// Episode detail with guest stars. The episode row is upserted first,
    /// then its guest stars are merged in by guest id.
    pub async fn episode(
        &self,
        series_id: u64,
        season_number: u32,
        episode_number: u32,
        language: &str,
    ) -> Result<EpisodeRecord> {
        let parent = SeasonKey::new(series_id, language, season_number);
        let now = self.store.now();
        let cached = self
            .store
            .list_by_parent::<EpisodeRecord>(&parent)
            .await
            .or_miss("series-episodes")
            .into_iter()
            .find(|episode| episode.episode_number == episode_number);
        if let Some(cached) = cached
            && self.policy.is_usable(Some(&cached), now)
        {
            return Ok(cached);
        }

        let raw = self
            .source
            .fetch_episode_detail(
                series_id,
                season_number,
                episode_number,
                language,
            )
            .await?;

        let mut episode = reshape::episode(raw);
        let guests = episode.guest_stars.take().unwrap_or_default();
        let reference = EpisodeRef {
            episode_id: episode.id,
            episode_number: episode.episode_number,
        };

        let stored = self
            .store
            .upsert_into_list(&parent, episode.clone())
            .await
            .or_skip("series-episodes")
            .unwrap_or_else(|| {
                let mut episode = episode;
                ListRecord::stamp(&mut episode, now);
                episode
            });

        let merged = self
            .store
            .upsert_guest_stars(&parent, reference, guests.clone())
            .await
            .or_skip("episode-guest-stars");
        Ok(match merged {
            Some(merged) => merged,
            None => {
                let mut episodes = vec![stored];
                let index =
                    merge::upsert_guest_stars(&mut episodes, reference, guests);
                episodes.swap_remove(index)
            }
        })
    }

    pub async fn ping(&self) -> StoreResult<()> {
        self.store.ping().await
    }

    /// Fetch series detail and persist both the series record and its
    /// seasons list.
    async fn refresh_series(
        &self,
        id: u64,
        language: &str,
    ) -> Result<(SeriesRecord, Vec<SeasonRecord>)> {
        let raw = self.source.fetch_series(id, language).await?;
        let key = MediaKey::new(id, language);
        let series = self.persist_one(&key, reshape::series(raw)).await;

        let batch = series.seasons.clone().unwrap_or_default();
        let seasons = self.persist_list(&key, batch).await;
        Ok((series, seasons))
    }

    async fn cached_one<R>(&self, key: &R::Key) -> Option<R>
    where
        R: ScalarRecord + Freshness,
    {
        let cached = self.store.get_one::<R>(key).await.or_miss("record read");
        let now = self.store.now();
        match cached {
            Some(record) if self.policy.is_usable(Some(&record), now) => {
                debug!(table = %R::TABLE, ?key, "serving cached record");
                Some(record)
            }
            _ => None,
        }
    }

    async fn cached_list<R>(&self, parent: &R::Parent) -> Option<Vec<R>>
    where
        R: ListRecord + Freshness,
    {
        let cached = self
            .store
            .list_by_parent::<R>(parent)
            .await
            .or_miss("list read");
        let now = self.store.now();
        if self.policy.is_collection_usable(&cached, now) {
            debug!(table = %R::TABLE, ?parent, "serving cached list");
            Some(cached)
        } else {
            None
        }
    }

    async fn persist_one<R: ScalarRecord>(&self, key: &R::Key, record: R) -> R {
        match self
            .store
            .upsert_one(key, record.clone())
            .await
            .or_skip("record write")
        {
            Some(stored) => stored,
            None => {
                let mut record = record;
                record.stamp(self.store.now());
                record
            }
        }
    }

    /// On a failed write the batch is merged into an empty list in memory
    /// so the caller still gets the shape the store would have produced.
    async fn persist_list<R: ListRecord>(
        &self,
        parent: &R::Parent,
        batch: Vec<R>,
    ) -> Vec<R> {
        match self
            .store
            .upsert_many_into_list(parent, batch.clone())
            .await
            .or_skip("list write")
        {
            Some(stored) => stored,
            None => {
                let now = self.store.now();
                let mut items = Vec::new();
                merge::merge_batch(
                    &mut items,
                    batch.into_iter().map(|mut record| {
                        record.stamp(now);
                        record
                    }),
                );
                items
            }
        }
    }
}
