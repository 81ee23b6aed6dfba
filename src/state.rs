use std::sync::Arc;

use crate::cache::{Clock, SystemClock};
use crate::config::Config;
use crate::db::Store;
use crate::services::{ListingCache, RequirementService, SeaOrmRequirementService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub clock: Arc<dyn Clock>,

    pub listing_cache: Arc<ListingCache>,

    pub requirement_service: Arc<dyn RequirementService>,
}

impl SharedState {
    /// Connects to the configured database, retrying per `general` settings.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::connect_with_retry(&config.general).await?;
        Ok(Self::with_store(config, store, Arc::new(SystemClock)))
    }

    /// Wires the services around an already connected store.
    #[must_use]
    pub fn with_store(config: Config, store: Store, clock: Arc<dyn Clock>) -> Self {
        let listing_cache = Arc::new(ListingCache::new(config.cache.ttl(), clock.clone()));

        let requirement_service = Arc::new(SeaOrmRequirementService::new(
            store.clone(),
            listing_cache.clone(),
            clock.clone(),
            &config,
        )) as Arc<dyn RequirementService>;

        Self {
            config: Arc::new(config),
            store,
            clock,
            listing_cache,
            requirement_service,
        }
    }
}
