//! Response caching for sleep range queries.
//!
//! Entries live until their TTL expires or until a write lands in
//! `sleep_data`. The sync scheduler and the insert endpoint both call
//! [`invalidate_all`] after writing, so a cached range is never older than
//! the last successful write.
//!
//! # Usage
//!
//! ```text
//! let key = cache::cache_key("sleep", &[&start, &end, "json"]);
//!
//! if let Some(cached) = cache::get_cached(&state, &key).await {
//!     return cache::json_response((*cached).to_vec(), true);
//! }
//!
//! // ... compute response ...
//!
//! cache::cache_and_respond(&state, key, &response).await
//! ```

use axum::{
    http::{header, HeaderValue},
    response::Response,
};
use serde::Serialize;
use std::sync::Arc;

use crate::common::{AppState, CachedResponse};
use crate::error::{AppError, AppResult};

/// Build a cache key from a prefix and components.
///
/// Components are joined with `:` separator. Empty components are included
/// to ensure different queries produce different keys.
pub fn cache_key(prefix: &str, components: &[&str]) -> String {
    let mut key = prefix.to_string();
    for c in components {
        key.push(':');
        key.push_str(c);
    }
    key
}

/// Try to get a cached response body.
pub async fn get_cached(state: &AppState, cache_key: &str) -> Option<Arc<Vec<u8>>> {
    let cached = state.response_cache.get(cache_key).await?;
    tracing::debug!(cache_key = %cache_key, "cache_hit");
    Some(cached.data)
}

/// Store a response body in cache.
pub async fn store_cached(state: &AppState, cache_key: String, data: Vec<u8>) {
    state
        .response_cache
        .insert(
            cache_key,
            CachedResponse {
                data: Arc::new(data),
            },
        )
        .await;
}

/// Build a JSON response with an `X-Cache` header.
///
/// # Errors
///
/// Returns `AppError::Internal` if the response cannot be built.
pub fn json_response(data: Vec<u8>, cache_hit: bool) -> AppResult<Response> {
    let cache_header = if cache_hit { "HIT" } else { "MISS" };
    Response::builder()
        .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .header("X-Cache", HeaderValue::from_static(cache_header))
        .body(axum::body::Body::from(data))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Serialize and cache a response, then return it.
///
/// # Errors
///
/// Returns `AppError::Internal` if serialization fails.
pub async fn cache_and_respond<T: Serialize>(
    state: &AppState,
    cache_key: String,
    response: &T,
) -> AppResult<Response> {
    let json_bytes =
        serde_json::to_vec(response).map_err(|e| AppError::Internal(e.to_string()))?;

    store_cached(state, cache_key, json_bytes.clone()).await;

    json_response(json_bytes, false)
}

/// Drop every cached range after `sleep_data` changed.
pub fn invalidate_all(state: &AppState, reason: &'static str) {
    state.response_cache.invalidate_all();
    tracing::debug!(reason, "cache_invalidated");
}
