//! # Cinecache Core
//!
//! Caching and staleness-decision layer of the cinecache TMDB proxy.
//!
//! ## Overview
//!
//! - **Key derivation**: canonical cache keys from request URLs
//!   ([`keys::KeyCodec`])
//! - **Record store**: logical tables with upsert and list semantics over a
//!   flat key-value backend ([`store::RecordStore`])
//! - **Freshness**: when a stored record may be served
//!   ([`freshness::FreshnessPolicy`])
//! - **Merge upserts**: in-place list merges that keep sibling data and guest
//!   stars ([`merge`])
//! - **Read-through service**: the lookup flow tying the above to the
//!   upstream client ([`service::MetadataService`])
//!
//! ## Feature Flags
//!
//! - `redis` (default): the Redis backend. Without it only the in-memory
//!   backend is available.
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use cinecache_core::{
//!     backend::MemoryBackend,
//!     providers::TmdbClient,
//!     service::MetadataService,
//!     store::{DEFAULT_TTL, RecordStore},
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RecordStore::new(Arc::new(MemoryBackend::new()), DEFAULT_TTL);
//! let tmdb = TmdbClient::new(
//!     "api-key",
//!     "https://api.themoviedb.org/3",
//!     Duration::from_secs(5),
//! )?;
//! let service = MetadataService::new(store, Arc::new(tmdb));
//!
//! let movie = service.movie(27205, "en").await?;
//! println!("{} ({})", movie.title, movie.rating);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod clock;
pub mod error;
pub mod freshness;
pub mod keys;
pub mod merge;
pub mod providers;
pub mod records;
pub mod reshape;
pub mod service;
pub mod store;

pub use error::{BackendError, Result, ServiceError, StoreError, StoreResult};
pub use freshness::{Freshness, FreshnessPolicy};
pub use keys::KeyCodec;
pub use records::*;
pub use service::MetadataService;
pub use store::RecordStore;
