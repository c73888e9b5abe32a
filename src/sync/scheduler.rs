use std::time::Duration;
use tokio::time::interval;

use crate::common::AppState;
use crate::error::AppResult;
use crate::services::cache;
use crate::sync::worker::{self, SyncReport};

/// Run one sync pass, retrying with a fixed delay on failure.
///
/// # Errors
///
/// Returns the last error once `sync_retry_max` retries are exhausted.
pub async fn sync_with_retries(state: &AppState) -> AppResult<SyncReport> {
    let retry_delay_secs = state.config.sync_retry_delay_seconds;
    let max_retries = state.config.sync_retry_max;

    let mut retries = 0;
    loop {
        match worker::sync_sleep(&state.db, &state.oura_client, &state.config).await {
            Ok(report) => {
                if report.written > 0 {
                    cache::invalidate_all(state, "sync");
                }
                return Ok(report);
            }
            Err(e) => {
                retries += 1;
                if retries > max_retries {
                    tracing::error!(
                        error = %e,
                        max_retries,
                        "Sleep sync failed after max retries"
                    );
                    return Err(e);
                }

                if e.is_rate_limited() {
                    tracing::warn!(
                        retry = retries,
                        max_retries,
                        delay_secs = retry_delay_secs,
                        "Sleep sync rate limited, retrying"
                    );
                } else {
                    tracing::error!(
                        error = %e,
                        retry = retries,
                        max_retries,
                        "Sleep sync failed, retrying"
                    );
                }
                tokio::time::sleep(Duration::from_secs(retry_delay_secs)).await;
            }
        }
    }
}

/// Sync once and return; the default entrypoint behavior.
///
/// # Errors
///
/// Returns the sync error if every attempt failed.
pub async fn run_once(state: AppState) -> AppResult<SyncReport> {
    tracing::info!("Running one-shot sleep sync");
    sync_with_retries(&state).await
}

/// Run the sleep sync task on a schedule.
///
/// The first pass runs immediately; failures are logged and the loop carries
/// on at the next tick.
pub async fn run_sleep_sync(state: AppState) {
    let interval_secs = state.config.sync_interval_seconds;

    tracing::info!(interval_secs, "Starting sleep sync scheduler");

    let mut ticker = interval(Duration::from_secs(interval_secs));

    loop {
        ticker.tick().await;

        tracing::debug!("Running scheduled sleep sync...");
        if sync_with_retries(&state).await.is_ok() {
            tracing::debug!("Scheduled sleep sync completed successfully");
        }
    }
}
