use moka::future::Cache;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::oura::OuraClient;

/// Serialized response body kept for repeat range queries
#[derive(Clone)]
pub struct CachedResponse {
    pub data: Arc<Vec<u8>>,
}

/// Cache for API responses. Key is request params, value is the serialized body.
/// Weighted by byte size to enforce memory limit.
pub type ResponseCache = Cache<String, CachedResponse>;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub oura_client: Arc<OuraClient>,
    pub response_cache: ResponseCache,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config, oura_client: OuraClient) -> Self {
        let cache: ResponseCache = Cache::builder()
            .weigher(|_key: &String, value: &CachedResponse| -> u32 {
                value.data.len().try_into().unwrap_or(u32::MAX)
            })
            .max_capacity(config.cache_max_bytes)
            .time_to_live(Duration::from_secs(config.cache_ttl_seconds))
            .build();

        Self {
            db,
            config: Arc::new(config),
            oura_client: Arc::new(oura_client),
            response_cache: cache,
        }
    }
}
