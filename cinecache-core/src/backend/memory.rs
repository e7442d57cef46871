use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::KvBackend;
use crate::error::BackendError;

#[derive(Debug, Clone)]
struct MemoryEntry {
    bytes: Vec<u8>,
    expires_at: Instant,
    ttl_seconds: u64,
}

/// Writes between two sweeps of expired entries.
pub const SWEEP_EVERY: usize = 256;

/// In-process backend with per-key expiry.
///
/// Used when no Redis URL is configured and throughout the tests. Expired
/// entries are dropped on read, and every [`SWEEP_EVERY`] writes the whole
/// map is swept so keys that are never read again do not pile up.
#[derive(Debug)]
pub struct MemoryBackend {
    entries: DashMap<String, MemoryEntry>,
    writes: AtomicUsize,
    sweep_every: usize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            writes: AtomicUsize::new(0),
            sweep_every: SWEEP_EVERY,
        }
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sweep_every(mut self, writes: usize) -> Self {
        self.sweep_every = writes.max(1);
        self
    }

    /// Drop every expired entry and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "Cache SWEEP");
        }
        removed
    }

    /// TTL requested by the latest write of `key`, if it is still live.
    pub fn ttl_seconds(&self, key: &str) -> Option<u64> {
        self.live(key).map(|entry| entry.ttl_seconds)
    }

    /// Raw bytes stored under `key`, if still live.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.live(key).map(|entry| entry.bytes)
    }

    /// Write bytes without going through the record layer.
    pub fn insert_raw(&self, key: &str, bytes: Vec<u8>, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                bytes,
                expires_at: Instant::now() + ttl,
                ttl_seconds: ttl.as_secs(),
            },
        );

        let writes = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if writes % self.sweep_every == 0 {
            self.purge_expired();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn live(&self, key: &str) -> Option<MemoryEntry> {
        let entry = self.entries.get(key)?.clone();
        if entry.expires_at <= Instant::now() {
            self.entries.remove(key);
            debug!("Cache EXPIRED: {}", key);
            return None;
        }
        Some(entry)
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.live(key).map(|entry| entry.bytes))
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: u64,
    ) -> Result<(), BackendError> {
        self.insert_raw(key, value, Duration::from_secs(ttl_seconds));
        Ok(())
    }

    async fn ping(&self) -> Result<(), BackendError> {
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
