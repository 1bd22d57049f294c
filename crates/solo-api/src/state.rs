//! Application state.

use std::sync::Arc;

use solo_store::{BidRepository, JobRepository, Store};

use crate::auth::SessionKeys;
use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub keys: Arc<SessionKeys>,
    pub jobs: JobRepository,
    pub bids: BidRepository,
}

impl AppState {
    /// Create application state over an injected store handle.
    ///
    /// The store is opened once at startup by the caller and shared by
    /// both repositories; nothing here holds ambient global state.
    pub fn new(config: ApiConfig, store: Store) -> Self {
        let keys = SessionKeys::new(&config.session_secret, config.session_ttl_days);
        Self {
            keys: Arc::new(keys),
            jobs: JobRepository::new(store.clone()),
            bids: BidRepository::new(store),
            config,
        }
    }
}
