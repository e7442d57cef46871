//! Logical tables over a flat key-value backend.
//!
//! Every (table, natural key) pair maps to exactly one backend key holding
//! either a JSON object (scalar tables) or a JSON array (list tables). There
//! are no partial field updates: each upsert rewrites the whole value and
//! re-arms the TTL.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::KvBackend;
use crate::clock::{Clock, SystemClock};
use crate::error::{StoreError, StoreResult};
use crate::merge;
use crate::records::{EpisodeRecord, EpisodeRef, GuestStarRecord};

pub mod fallback;
pub mod tables;

pub use fallback::StoreFallback;
pub use tables::{
    ChannelKey, ListRecord, MediaKey, NaturalKey, RequestKey, ScalarRecord,
    SeasonKey, Table, TableShape, TableSpec,
};

pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn KvBackend>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("backend", &self.backend.kind())
            .field("clock", &self.clock)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl RecordStore {
    pub fn new(backend: Arc<dyn KvBackend>, ttl: Duration) -> Self {
        Self {
            backend,
            clock: Arc::new(SystemClock),
            ttl,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn backend_kind(&self) -> &'static str {
        self.backend.kind()
    }

    pub async fn ping(&self) -> StoreResult<()> {
        self.backend.ping().await?;
        Ok(())
    }

    pub async fn get_one<R: ScalarRecord>(
        &self,
        key: &R::Key,
    ) -> StoreResult<Option<R>> {
        let store_key = R::TABLE.store_key(key);
        let Some(bytes) = self.read(&store_key).await? else {
            return Ok(None);
        };

        match serde_json::from_slice::<R>(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                warn!(
                    key = %store_key,
                    table = %R::TABLE,
                    error = %err,
                    "discarding malformed cached record"
                );
                Ok(None)
            }
        }
    }

    /// Stamp `updated_at`, write the complete record and return what was
    /// stored. Tables that carry fields forward read the previous record
    /// and absorb it after stamping; if that read fails the write is
    /// abandoned.
    pub async fn upsert_one<R: ScalarRecord>(
        &self,
        key: &R::Key,
        mut record: R,
    ) -> StoreResult<R> {
        record.stamp(self.now());
        if R::MERGES_PREVIOUS
            && let Some(previous) = self.get_one::<R>(key).await?
        {
            record.absorb(&previous);
        }

        let store_key = R::TABLE.store_key(key);
        self.write(&store_key, &record).await?;
        Ok(record)
    }

    pub async fn list_by_parent<R: ListRecord>(
        &self,
        parent: &R::Parent,
    ) -> StoreResult<Vec<R>> {
        let store_key = R::TABLE.store_key(parent);
        self.read_list(&store_key).await
    }

    /// Merge one element into the parent's list and return the stored
    /// element.
    pub async fn upsert_into_list<R: ListRecord>(
        &self,
        parent: &R::Parent,
        mut record: R,
    ) -> StoreResult<R> {
        let store_key = R::TABLE.store_key(parent);
        let mut items = self.read_list::<R>(&store_key).await?;

        record.stamp(self.now());
        let index = merge::upsert_by_id(&mut items, record);
        self.write(&store_key, &items).await?;
        Ok(items.swap_remove(index))
    }

    /// Merge a whole upstream batch with a single read-modify-write and
    /// return the resulting list.
    pub async fn upsert_many_into_list<R: ListRecord>(
        &self,
        parent: &R::Parent,
        batch: Vec<R>,
    ) -> StoreResult<Vec<R>> {
        let store_key = R::TABLE.store_key(parent);
        let mut items = self.read_list::<R>(&store_key).await?;

        let now = self.now();
        let merged = merge::merge_batch(
            &mut items,
            batch.into_iter().map(|mut record| {
                record.stamp(now);
                record
            }),
        );
        debug!(key = %store_key, merged, total = items.len(), "Cache MERGE");

        self.write(&store_key, &items).await?;
        Ok(items)
    }

    pub async fn upsert_guest_star(
        &self,
        parent: &SeasonKey,
        episode: EpisodeRef,
        guest: GuestStarRecord,
    ) -> StoreResult<EpisodeRecord> {
        self.upsert_guest_stars(parent, episode, vec![guest]).await
    }

    /// Upsert guest stars inside their episode, creating a placeholder
    /// episode when it is not listed yet. The episode's `updated_at` is left
    /// untouched. Returns the owning episode as stored.
    pub async fn upsert_guest_stars(
        &self,
        parent: &SeasonKey,
        episode: EpisodeRef,
        guests: Vec<GuestStarRecord>,
    ) -> StoreResult<EpisodeRecord> {
        let store_key = Table::EpisodeGuestStars.store_key(parent);
        let mut episodes = self.read_list::<EpisodeRecord>(&store_key).await?;

        let index = merge::upsert_guest_stars(&mut episodes, episode, guests);
        self.write(&store_key, &episodes).await?;
        Ok(episodes.swap_remove(index))
    }

    async fn read(&self, store_key: &str) -> StoreResult<Option<Vec<u8>>> {
        let bytes = self.backend.get(store_key).await?;
        match &bytes {
            Some(_) => debug!(key = %store_key, "Cache HIT"),
            None => debug!(key = %store_key, "Cache MISS"),
        }
        Ok(bytes)
    }

    /// Lists decode element by element so one bad entry does not hide its
    /// siblings.
    async fn read_list<R: ListRecord>(
        &self,
        store_key: &str,
    ) -> StoreResult<Vec<R>> {
        let Some(bytes) = self.read(store_key).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_slice::<Vec<Value>>(&bytes) {
            Ok(raw) => Ok(merge::decode_batch(raw, store_key)),
            Err(err) => {
                warn!(
                    key = %store_key,
                    table = %R::TABLE,
                    error = %err,
                    "discarding malformed cached list"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn write<T: Serialize + ?Sized>(
        &self,
        store_key: &str,
        value: &T,
    ) -> StoreResult<()> {
        let bytes =
            serde_json::to_vec(value).map_err(|source| StoreError::Encode {
                key: store_key.to_string(),
                source,
            })?;
        let ttl_seconds = self.ttl.as_secs().max(1);

        self.backend.set(store_key, bytes, ttl_seconds).await?;
        debug!(key = %store_key, ttl_seconds, "Cache SET");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::clock::ManualClock;
    use crate::records::{MovieRecord, SeasonRecord};

    fn store(now: i64) -> (RecordStore, Arc<MemoryBackend>, Arc<ManualClock>) {
        let backend = Arc::new(MemoryBackend::new());
        let clock = Arc::new(ManualClock::new(now));
        let store = RecordStore::new(backend.clone(), DEFAULT_TTL)
            .with_clock(clock.clone());
        (store, backend, clock)
    }

    fn season(id: u64, number: u32) -> SeasonRecord {
        SeasonRecord {
            id,
            season_number: number,
            name: format!("Season {number}"),
            overview: String::new(),
            poster_path: None,
            air_date: None,
            episode_count: 10,
            vote_average: 0.0,
            updated_at: 0,
        }
    }

    #[tokio::test]
    async fn scalar_upsert_stamps_and_reads_back() {
        let (store, backend, _) = store(42);
        let key = MediaKey::new(27205, "en");
        let movie = MovieRecord {
            tmdb_id: 27205,
            title: "Inception".into(),
            overview: String::new(),
            release_date: None,
            poster_path: None,
            genres: vec![],
            rating: 8.4,
            rating_count: 1000,
            director_name: None,
            cast: vec![],
            cast_profile_paths: vec![],
            updated_at: 0,
        };

        let stored = store.upsert_one(&key, movie).await.unwrap();
        assert_eq!(stored.updated_at, 42);
        assert_eq!(
            backend.ttl_seconds("movie:id:27205:en"),
            Some(DEFAULT_TTL.as_secs())
        );

        let read: Option<MovieRecord> = store.get_one(&key).await.unwrap();
        assert_eq!(read, Some(stored));
    }

    #[tokio::test]
    async fn list_upsert_returns_the_stored_element() {
        let (store, _, clock) = store(10);
        let parent = MediaKey::new(1399, "en");

        store.upsert_into_list(&parent, season(1, 1)).await.unwrap();
        clock.advance(5);
        let stored = store.upsert_into_list(&parent, season(2, 2)).await.unwrap();

        assert_eq!(stored.id, 2);
        assert_eq!(stored.updated_at, 15);

        let seasons: Vec<SeasonRecord> =
            store.list_by_parent(&parent).await.unwrap();
        let stamps: Vec<_> = seasons.iter().map(|s| s.updated_at).collect();
        assert_eq!(stamps, vec![10, 15]);
    }

    #[tokio::test]
    async fn malformed_list_elements_are_dropped_on_read() {
        let (store, backend, _) = store(10);
        let parent = MediaKey::new(1399, "en");
        backend.insert_raw(
            "series:seasons:1399:en",
            br#"[{"id":1,"seasonNumber":1},{"id":"x"}]"#.to_vec(),
            Duration::from_secs(60),
        );

        let seasons: Vec<SeasonRecord> =
            store.list_by_parent(&parent).await.unwrap();
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].id, 1);
    }
}
