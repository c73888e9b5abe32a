pub mod batch;
pub mod cache;
pub mod diet_store;
pub mod rate_limit;
pub mod sleep_store;
