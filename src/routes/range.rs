use chrono::{Days, NaiveDate};

use crate::error::{AppError, AppResult};

/// Days covered by a range query when `start` is omitted
pub const DEFAULT_RANGE_DAYS: u64 = 30;

/// Fill in an open-ended `[start, end]` query.
///
/// `end` defaults to `today`, `start` to `DEFAULT_RANGE_DAYS` days ending at `end`.
///
/// # Errors
///
/// Returns `AppError::BadRequest` when the default start would fall outside
/// the representable date range.
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> AppResult<(NaiveDate, NaiveDate)> {
    let end = end.unwrap_or(today);
    let start = match start {
        Some(start) => start,
        None => end
            .checked_sub_days(Days::new(DEFAULT_RANGE_DAYS - 1))
            .ok_or_else(|| AppError::BadRequest(format!("end date {end} is out of range")))?,
    };
    Ok((start, end))
}
