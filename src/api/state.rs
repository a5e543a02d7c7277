use std::sync::Arc;

use crate::cache::ModeCache;
use crate::config::AppConfig;
use crate::fetch::CompsSource;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub source: Arc<dyn CompsSource>,
    pub cache: Arc<tokio::sync::RwLock<ModeCache>>,
}

impl AppState {
    pub fn new(config: AppConfig, source: Arc<dyn CompsSource>) -> Self {
        let cache = ModeCache::new(config.pipeline.cache_ttl());
        Self {
            config: Arc::new(config),
            source,
            cache: Arc::new(tokio::sync::RwLock::new(cache)),
        }
    }
}
