pub mod tmdb;
pub mod traits;
pub mod types;

pub use tmdb::TmdbClient;
#[cfg(test)]
pub use traits::MockMetadataSource;
pub use traits::{MetadataSource, ProviderError};
pub use types::*;
