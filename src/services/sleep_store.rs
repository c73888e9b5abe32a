//! Storage operations over `sleep_data`.
//!
//! The primary key is the only constraint the table carries, so the write
//! paths lean on it for conflict handling:
//!
//! | Operation | On existing `id` |
//! |-----------|------------------|
//! | `insert_one` | `AppError::Conflict` |
//! | `insert_many` | row skipped and counted |
//! | `upsert_many` | every non-key column overwritten |
//!
//! Records repeating an `id` within one `upsert_many` call collapse to the
//! last occurrence before anything is sent to the database.

use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::config::WriteMode;
use crate::entity::sleep_data;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::services::batch::{keep_last_by, BATCH_SIZE};
use crate::sync::transform::{ValidationError, MAX_TYPE_LEN};

/// Counts reported by the bulk write paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub written: u64,
    pub skipped_duplicates: u64,
}

/// SQLite ignores `varchar` lengths, so the bound is checked here for every backend.
fn check_type_len(record: &sleep_data::Model) -> AppResult<()> {
    match &record.sleep_type {
        Some(label) if label.chars().count() > MAX_TYPE_LEN => {
            Err(ValidationError::TypeTooLong {
                len: label.chars().count(),
            }
            .into())
        }
        _ => Ok(()),
    }
}

fn to_active(record: sleep_data::Model) -> sleep_data::ActiveModel {
    // `From<Model>` marks values Unchanged; an insert needs them Set
    sleep_data::ActiveModel::from(record).reset_all()
}

/// Insert a single record.
///
/// # Errors
///
/// Returns `AppError::Conflict` if a row with the same `id` exists,
/// `AppError::Validation` if `type` is too long, or `AppError::Database`
/// for any other database failure.
pub async fn insert_one<C>(db: &C, record: sleep_data::Model) -> AppResult<sleep_data::Model>
where
    C: ConnectionTrait,
{
    check_type_len(&record)?;
    let id = record.id;
    match to_active(record).insert(db).await {
        Ok(model) => Ok(model),
        Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
            "Sleep record '{id}' already exists"
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Insert records one at a time, skipping those whose `id` already exists.
///
/// # Errors
///
/// Returns the first error that is not a duplicate key; earlier rows stay written.
pub async fn insert_many<C>(db: &C, records: Vec<sleep_data::Model>) -> AppResult<WriteOutcome>
where
    C: ConnectionTrait,
{
    let mut outcome = WriteOutcome::default();

    for record in records {
        let id = record.id;
        match insert_one(db, record).await {
            Ok(_) => outcome.written += 1,
            Err(AppError::Conflict(_)) => {
                tracing::debug!(id = %id, "Sleep record already stored, skipping");
                outcome.skipped_duplicates += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(outcome)
}

/// Insert records, overwriting every non-key column of rows that already exist.
///
/// `written` counts distinct ids.
///
/// # Errors
///
/// Returns `AppError::Validation` if any record's `type` is too long (nothing
/// is written), or `AppError::Database` if a batch fails.
pub async fn upsert_many<C>(db: &C, records: Vec<sleep_data::Model>) -> AppResult<WriteOutcome>
where
    C: ConnectionTrait,
{
    for record in &records {
        check_type_len(record)?;
    }

    let received = records.len();
    let records = keep_last_by(records, |record| record.id);
    if records.len() < received {
        tracing::debug!(
            received,
            distinct = records.len(),
            "Collapsed repeated sleep ids before upsert"
        );
    }

    let mut outcome = WriteOutcome::default();

    for chunk in records.chunks(BATCH_SIZE) {
        let models: Vec<sleep_data::ActiveModel> = chunk.iter().cloned().map(to_active).collect();

        let rows = sleep_data::Entity::insert_many(models)
            .on_conflict(
                OnConflict::column(sleep_data::Column::Id)
                    .update_columns(sleep_data::UPSERT_COLUMNS)
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        tracing::debug!(batch_size = chunk.len(), rows, "Upserted sleep batch");
        outcome.written += chunk.len() as u64;
    }

    Ok(outcome)
}

/// Write records with the configured conflict policy.
///
/// # Errors
///
/// Propagates errors from `insert_many` or `upsert_many`.
pub async fn write<C>(
    db: &C,
    mode: WriteMode,
    records: Vec<sleep_data::Model>,
) -> AppResult<WriteOutcome>
where
    C: ConnectionTrait,
{
    if records.is_empty() {
        return Ok(WriteOutcome::default());
    }

    match mode {
        WriteMode::Insert => insert_many(db, records).await,
        WriteMode::Upsert => upsert_many(db, records).await,
    }
}

/// Fetch a record by its primary key.
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn find_by_id<C>(db: &C, id: Uuid) -> AppResult<Option<sleep_data::Model>>
where
    C: ConnectionTrait,
{
    Ok(sleep_data::Entity::find_by_id(id).one(db).await?)
}

/// All records attributed to `day`, earliest bedtime first.
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn find_by_day<C>(db: &C, day: NaiveDate) -> AppResult<Vec<sleep_data::Model>>
where
    C: ConnectionTrait,
{
    Ok(sleep_data::Entity::find()
        .filter(sleep_data::Column::Day.eq(day))
        .order_by_asc(sleep_data::Column::BedtimeStart)
        .all(db)
        .await?)
}

/// Records whose `day` falls in `[start, end]`, ordered by day then bedtime.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if `end` is before `start`, or
/// `AppError::Database` if the query fails.
pub async fn find_by_range<C>(
    db: &C,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<sleep_data::Model>>
where
    C: ConnectionTrait,
{
    if end < start {
        return Err(AppError::BadRequest(
            "end date must not be before start date".to_string(),
        ));
    }

    Ok(sleep_data::Entity::find()
        .filter(sleep_data::Column::Day.between(start, end))
        .order_by_asc(sleep_data::Column::Day)
        .order_by_asc(sleep_data::Column::BedtimeStart)
        .all(db)
        .await?)
}

#[derive(Debug, FromQueryResult)]
struct LatestDayRow {
    latest: Option<NaiveDate>,
}

/// Most recent `day` stored, if any.
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn latest_day<C>(db: &C) -> AppResult<Option<NaiveDate>>
where
    C: ConnectionTrait,
{
    let row = sleep_data::Entity::find()
        .select_only()
        .column_as(Expr::col(sleep_data::Column::Day).max(), "latest")
        .into_model::<LatestDayRow>()
        .one(db)
        .await?;

    Ok(row.and_then(|r| r.latest))
}

/// Total number of stored records.
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn count<C>(db: &C) -> AppResult<u64>
where
    C: ConnectionTrait,
{
    Ok(sleep_data::Entity::find().count(db).await?)
}
