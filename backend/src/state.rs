use std::sync::Arc;

use crate::ai::{BraceMatchExtractor, CompletionGateway, JsonExtractor};
use crate::config::ClientConfig;
use crate::store::Store;

/// Shared by every handler; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub gateway: Arc<dyn CompletionGateway>,
    pub extractor: Arc<dyn JsonExtractor>,
    pub client: Arc<ClientConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        gateway: Arc<dyn CompletionGateway>,
        client: ClientConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            extractor: Arc::new(BraceMatchExtractor),
            client: Arc::new(client),
        }
    }
}
