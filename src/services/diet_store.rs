//! Storage and unit handling for daily dietary energy.
//!
//! Health exports report energy in kilojoules with a local timestamp; the
//! `diet` table keeps one kilocalorie total per calendar day.

use chrono::{DateTime, NaiveDate};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::entity::diet;
use crate::error::{AppError, AppResult};
use crate::services::batch::{keep_last_by, BATCH_SIZE};

/// Kilojoules in one kilocalorie
pub const KJ_PER_KCAL: f64 = 4.184;

/// Timestamp layout used by health exports, e.g. `2024-08-18 00:00:00 +0200`
const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

#[must_use]
pub fn kj_to_kcal(kj: f64) -> f64 {
    kj / KJ_PER_KCAL
}

/// Calendar day of an export timestamp, in the timestamp's own offset.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if `value` does not match the export layout.
pub fn parse_export_date(value: &str) -> AppResult<NaiveDate> {
    DateTime::parse_from_str(value.trim(), EXPORT_DATE_FORMAT)
        .map(|ts| ts.date_naive())
        .map_err(|e| AppError::BadRequest(format!("invalid date '{value}': {e}")))
}

/// Insert or overwrite daily totals, keyed on `date`.
///
/// Returns the number of distinct days written.
///
/// # Errors
///
/// Returns `AppError::Database` if a batch fails.
pub async fn upsert_many<C>(db: &C, rows: Vec<diet::Model>) -> AppResult<u64>
where
    C: ConnectionTrait,
{
    let rows = keep_last_by(rows, |row| row.date);
    let mut written = 0;

    for chunk in rows.chunks(BATCH_SIZE) {
        let models: Vec<diet::ActiveModel> = chunk
            .iter()
            .cloned()
            .map(|row| diet::ActiveModel::from(row).reset_all())
            .collect();

        diet::Entity::insert_many(models)
            .on_conflict(
                OnConflict::column(diet::Column::Date)
                    .update_column(diet::Column::DietaryEnergy)
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        written += chunk.len() as u64;
    }

    Ok(written)
}

/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn find_by_date<C>(db: &C, date: NaiveDate) -> AppResult<Option<diet::Model>>
where
    C: ConnectionTrait,
{
    Ok(diet::Entity::find_by_id(date).one(db).await?)
}

/// Daily totals in `[start, end]`, oldest first.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if `end` is before `start`, or
/// `AppError::Database` if the query fails.
pub async fn find_by_range<C>(db: &C, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<diet::Model>>
where
    C: ConnectionTrait,
{
    if end < start {
        return Err(AppError::BadRequest(
            "end date must not be before start date".to_string(),
        ));
    }

    Ok(diet::Entity::find()
        .filter(diet::Column::Date.between(start, end))
        .order_by_asc(diet::Column::Date)
        .all(db)
        .await?)
}
