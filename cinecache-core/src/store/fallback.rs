use tracing::warn;

use crate::error::StoreResult;

/// Degrade store failures instead of failing the request.
///
/// Reads turn into misses and writes into no-ops; both are logged at `warn`.
pub trait StoreFallback<T> {
    /// A failed read behaves like an absent record.
    fn or_miss(self, what: &str) -> T
    where
        T: Default;

    /// A failed write is dropped; the caller keeps its in-memory value.
    fn or_skip(self, what: &str) -> Option<T>;
}

impl<T> StoreFallback<T> for StoreResult<T> {
    fn or_miss(self, what: &str) -> T
    where
        T: Default,
    {
        self.unwrap_or_else(|err| {
            warn!(what, error = %err, "store read failed, treating as miss");
            T::default()
        })
    }

    fn or_skip(self, what: &str) -> Option<T> {
        self.map_err(|err| {
            warn!(what, error = %err, "store write failed, serving fetched data");
        })
        .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BackendError, StoreError};

    fn down<T>() -> StoreResult<T> {
        Err(StoreError::Backend(BackendError::Unavailable("down".into())))
    }

    #[test]
    fn failed_reads_become_misses() {
        assert_eq!(down::<Option<u8>>().or_miss("movie"), None);
        assert!(down::<Vec<u8>>().or_miss("seasons").is_empty());
        assert_eq!(Ok::<_, StoreError>(Some(3)).or_miss("movie"), Some(3));
    }

    #[test]
    fn failed_writes_are_skipped() {
        assert_eq!(down::<u8>().or_skip("movie"), None);
        assert_eq!(Ok::<_, StoreError>(7).or_skip("movie"), Some(7));
    }
}
