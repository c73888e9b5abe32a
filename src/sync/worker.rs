use chrono::{Days, NaiveDate, Utc};
use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::error::AppResult;
use crate::oura::OuraClient;
use crate::services::sleep_store;
use crate::sync::transform;

/// Date window passed to the Oura sleep endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Outcome of one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub written: u64,
    pub skipped_duplicates: u64,
    pub rejected: usize,
}

/// Work out which days to request.
///
/// Explicit `SYNC_START_DATE` / `SYNC_END_DATE` always win. Otherwise the
/// window starts `sync_overlap_days` before the latest stored day (so late
/// edits upstream are picked up), or `sync_lookback_days` before today when
/// the table is empty. The end is tomorrow so sessions ending today are included.
#[must_use]
pub fn sync_window(config: &Config, latest_day: Option<NaiveDate>, today: NaiveDate) -> SyncWindow {
    let end = config
        .sync_end_date
        .unwrap_or_else(|| today.checked_add_days(Days::new(1)).unwrap_or(today));

    let start = config.sync_start_date.unwrap_or_else(|| match latest_day {
        Some(day) => days_before(day, config.sync_overlap_days),
        None => days_before(today, config.sync_lookback_days),
    });

    // A stale latest_day can never push the start past the end
    SyncWindow {
        start: start.min(end),
        end,
    }
}

/// `day` minus `days`, saturating at the earliest representable date.
fn days_before(day: NaiveDate, days: i64) -> NaiveDate {
    day.checked_sub_days(Days::new(days.max(0).unsigned_abs()))
        .unwrap_or(NaiveDate::MIN)
}

/// Run one fetch-transform-write pass.
///
/// Documents that fail validation are logged and skipped; they never abort the pass.
///
/// # Errors
///
/// Returns an error if the Oura API or database operations fail.
pub async fn sync_sleep(
    db: &DatabaseConnection,
    oura: &OuraClient,
    config: &Config,
) -> AppResult<SyncReport> {
    let latest = sleep_store::latest_day(db).await?;
    let window = sync_window(config, latest, Utc::now().date_naive());

    tracing::info!(
        start = %window.start,
        end = %window.end,
        latest_stored = ?latest,
        write_mode = ?config.write_mode,
        "Syncing sleep data"
    );

    let documents = oura.get_sleep(window.start, window.end).await?;
    let fetched = documents.len();

    let mut records = Vec::with_capacity(fetched);
    let mut rejected = 0;
    for doc in &documents {
        match transform::to_record(doc) {
            Ok(record) => records.push(record),
            Err(e) => {
                rejected += 1;
                tracing::warn!(
                    error = %e,
                    id = doc.id.as_deref().unwrap_or("<none>"),
                    day = doc.day.as_deref().unwrap_or("<none>"),
                    "Rejected sleep document"
                );
            }
        }
    }

    let outcome = sleep_store::write(db, config.write_mode, records).await?;

    let report = SyncReport {
        fetched,
        written: outcome.written,
        skipped_duplicates: outcome.skipped_duplicates,
        rejected,
    };

    tracing::info!(
        fetched = report.fetched,
        written = report.written,
        skipped_duplicates = report.skipped_duplicates,
        rejected = report.rejected,
        "Synced sleep data"
    );

    Ok(report)
}
