//! Merge-upsert rules for collection-valued records.
//!
//! Lists are reconciled element by element: an incoming element replaces
//! the stored element with the same natural id in place, or is appended.
//! Each element type decides, through [`Mergeable::absorb`], which stored
//! fields survive a replacement. Episodes keep their guest stars unless the
//! incoming element brings its own, and stay marked as listed once a season
//! listing has written them.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::records::{
    EpisodeRecord, EpisodeRef, GuestStarRecord, SeasonRecord, SeriesRecord,
};

pub trait Mergeable {
    /// Natural id, unique within one parent-scoped list.
    fn child_id(&self) -> u64;

    /// Pull fields the incoming element is not responsible for from the
    /// element it replaces. `previous` is `None` on insert.
    fn absorb(&mut self, _previous: Option<&Self>) {}
}

impl Mergeable for SeasonRecord {
    fn child_id(&self) -> u64 {
        self.id
    }
}

impl Mergeable for GuestStarRecord {
    fn child_id(&self) -> u64 {
        self.id
    }
}

impl Mergeable for EpisodeRecord {
    fn child_id(&self) -> u64 {
        self.id
    }

    fn absorb(&mut self, previous: Option<&Self>) {
        if self.guest_stars.is_none() {
            let carried = previous
                .and_then(|previous| previous.guest_stars.clone())
                .unwrap_or_default();
            self.guest_stars = Some(carried);
        }
        self.listed |= previous.is_some_and(|previous| previous.listed);
    }
}

/// Find-or-insert `incoming` by natural id. Returns the index the element
/// ended up at; the positions of all other elements are unchanged.
pub fn upsert_by_id<T: Mergeable>(items: &mut Vec<T>, mut incoming: T) -> usize {
    let id = incoming.child_id();
    match items.iter().position(|item| item.child_id() == id) {
        Some(index) => {
            incoming.absorb(Some(&items[index]));
            items[index] = incoming;
            index
        }
        None => {
            incoming.absorb(None);
            items.push(incoming);
            items.len() - 1
        }
    }
}

/// Upsert every element of `batch` in order. Later duplicates win.
pub fn merge_batch<T, I>(items: &mut Vec<T>, batch: I) -> usize
where
    T: Mergeable,
    I: IntoIterator<Item = T>,
{
    let mut merged = 0;
    for incoming in batch {
        upsert_by_id(items, incoming);
        merged += 1;
    }
    merged
}

/// Decode raw upstream elements, skipping the ones that do not fit `T`.
pub fn decode_batch<T: DeserializeOwned>(raw: Vec<Value>, what: &str) -> Vec<T> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(position, value)| {
            serde_json::from_value(value)
                .map_err(|err| {
                    warn!(
                        what,
                        position,
                        error = %err,
                        "skipping malformed element"
                    );
                })
                .ok()
        })
        .collect()
}

/// Index of the episode `episode`, inserting a placeholder when absent.
pub fn ensure_episode(
    episodes: &mut Vec<EpisodeRecord>,
    episode: EpisodeRef,
) -> usize {
    match episodes
        .iter()
        .position(|existing| existing.id == episode.episode_id)
    {
        Some(index) => index,
        None => {
            episodes.push(EpisodeRecord::placeholder(
                episode.episode_id,
                episode.episode_number,
            ));
            episodes.len() - 1
        }
    }
}

/// Second-level upsert of guest stars inside the owning episode. Returns the
/// index of the episode.
pub fn upsert_guest_stars<I>(
    episodes: &mut Vec<EpisodeRecord>,
    episode: EpisodeRef,
    guests: I,
) -> usize
where
    I: IntoIterator<Item = GuestStarRecord>,
{
    let index = ensure_episode(episodes, episode);
    let owner = &mut episodes[index];
    let stars = owner.guest_stars.get_or_insert_with(Vec::new);
    merge_batch(stars, guests);
    index
}

/// A series write that lacks the extended detail fields (typically one
/// seeded from search results) keeps the ones already stored. When it
/// carries all of them it also keeps their `updated_at`, so the detail view
/// ages from the last detail write.
pub fn carry_forward_series(incoming: &mut SeriesRecord, previous: &SeriesRecord) {
    if !incoming.has_extended_fields() && previous.has_extended_fields() {
        incoming.updated_at = previous.updated_at;
    }
    if incoming.created_by.is_none() {
        incoming.created_by = previous.created_by.clone();
    }
    if incoming.number_of_episodes.is_none() {
        incoming.number_of_episodes = previous.number_of_episodes;
    }
    if incoming.number_of_seasons.is_none() {
        incoming.number_of_seasons = previous.number_of_seasons;
    }
    if incoming.seasons.is_none() {
        incoming.seasons = previous.seasons.clone();
    }
}
