use std::{fmt, sync::Arc};

use cinecache_core::MetadataService;

use crate::infra::config::Config;
use crate::stream::{RedirectResolver, StreamSigner};

#[derive(Clone)]
pub struct AppState {
    pub metadata: Arc<MetadataService>,
    pub signer: Arc<StreamSigner>,
    pub resolver: Arc<RedirectResolver>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.metadata.store().backend_kind())
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        metadata: MetadataService,
        signer: StreamSigner,
        resolver: RedirectResolver,
        config: Config,
    ) -> Self {
        Self {
            metadata: Arc::new(metadata),
            signer: Arc::new(signer),
            resolver: Arc::new(resolver),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
