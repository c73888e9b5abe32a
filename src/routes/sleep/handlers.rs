use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{
        header::{self, HeaderMap, HeaderValue},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::oura::models::SleepDocument;
use crate::routes::range::resolve_range;
use crate::services::{cache, sleep_store};
use crate::sync::transform;

use super::types::{SleepRangeQuery, SleepRangeResponse, SleepRecordResponse};

/// Column order of CSV exports, matching `sleep_data`
const CSV_HEADER: [&str; 19] = [
    "id",
    "day",
    "average_breath",
    "average_heart_rate",
    "average_hrv",
    "awake_time",
    "bedtime_start",
    "bedtime_end",
    "deep_sleep_duration",
    "efficiency",
    "latency",
    "light_sleep_duration",
    "lowest_heart_rate",
    "rem_sleep_duration",
    "restless_periods",
    "sleep_score_delta",
    "time_in_bed",
    "total_sleep_duration",
    "type",
];

fn determine_format(query_format: &str, headers: &HeaderMap) -> AppResult<&'static str> {
    match query_format.to_lowercase().as_str() {
        "csv" => return Ok("csv"),
        "json" => {}
        other => {
            return Err(AppError::BadRequest(format!(
                "unsupported format '{other}', expected json or csv"
            )));
        }
    }

    if let Some(accept) = headers.get(header::ACCEPT)
        && let Ok(accept_str) = accept.to_str()
        && accept_str.contains("text/csv")
    {
        return Ok("csv");
    }

    Ok("json")
}

fn build_csv_response(records: &[SleepRecordResponse]) -> AppResult<Response> {
    // Header written by hand so an empty range still carries the columns
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(CSV_HEADER)
        .map_err(|e| AppError::Internal(format!("CSV encoding failed: {e}")))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| AppError::Internal(format!("CSV encoding failed: {e}")))?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV encoding failed: {e}")))?;

    Response::builder()
        .header(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"))
        .body(axum::body::Body::from(body))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// List sleep records in a date range
///
/// Returns every record whose `day` falls in `[start, end]`.
/// Supports JSON and CSV formats.
#[utoipa::path(
    get,
    path = "/api/sleep",
    params(SleepRangeQuery),
    responses(
        (status = 200, description = "Records retrieved successfully", body = SleepRangeResponse),
        (status = 400, description = "Invalid query parameters"),
    ),
    tag = "sleep"
)]
pub async fn list_sleep(
    State(state): State<AppState>,
    Query(query): Query<SleepRangeQuery>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let format = determine_format(&query.format, &headers)?;

    let (start, end) = resolve_range(query.start, query.end, Utc::now().date_naive())?;

    let cache_key = cache::cache_key("sleep", &[&start.to_string(), &end.to_string(), format]);
    if format == "json"
        && let Some(cached) = cache::get_cached(&state, &cache_key).await
    {
        return cache::json_response((*cached).to_vec(), true);
    }

    let records: Vec<SleepRecordResponse> = sleep_store::find_by_range(&state.db, start, end)
        .await?
        .into_iter()
        .map(SleepRecordResponse::from)
        .collect();

    if format == "csv" {
        return build_csv_response(&records);
    }

    let response = SleepRangeResponse {
        start,
        end,
        count: records.len(),
        records,
    };
    cache::cache_and_respond(&state, cache_key, &response).await
}

/// List sleep records for one day
#[utoipa::path(
    get,
    path = "/api/sleep/day/{day}",
    params(
        ("day" = String, Path, description = "Day (YYYY-MM-DD)"),
    ),
    responses(
        (status = 200, description = "Records retrieved successfully", body = Vec<SleepRecordResponse>),
        (status = 400, description = "Invalid day"),
    ),
    tag = "sleep"
)]
pub async fn get_sleep_by_day(
    State(state): State<AppState>,
    Path(day): Path<NaiveDate>,
) -> AppResult<Json<Vec<SleepRecordResponse>>> {
    let records = sleep_store::find_by_day(&state.db, day)
        .await?
        .into_iter()
        .map(SleepRecordResponse::from)
        .collect();

    Ok(Json(records))
}

/// Get a sleep record by id
#[utoipa::path(
    get,
    path = "/api/sleep/{id}",
    params(
        ("id" = Uuid, Path, description = "Record UUID"),
    ),
    responses(
        (status = 200, description = "Record retrieved successfully", body = SleepRecordResponse),
        (status = 404, description = "Record not found"),
    ),
    tag = "sleep"
)]
pub async fn get_sleep(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SleepRecordResponse>> {
    sleep_store::find_by_id(&state.db, id)
        .await?
        .map(|m| Json(m.into()))
        .ok_or_else(|| AppError::NotFound(format!("Sleep record '{id}' not found")))
}

/// Insert one sleep record
///
/// Accepts the same document shape the Oura API returns and applies the
/// same validation as the sync worker. Never overwrites an existing record.
#[utoipa::path(
    post,
    path = "/api/sleep",
    request_body = SleepDocument,
    responses(
        (status = 201, description = "Record created", body = SleepRecordResponse),
        (status = 400, description = "Malformed body or record failed validation"),
        (status = 409, description = "A record with this id already exists"),
    ),
    tag = "sleep"
)]
pub async fn create_sleep(
    State(state): State<AppState>,
    payload: Result<Json<SleepDocument>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(document) = payload?;
    let record = transform::to_record(&document)?;
    let stored = sleep_store::insert_one(&state.db, record).await?;

    cache::invalidate_all(&state, "insert");
    tracing::info!(id = %stored.id, day = ?stored.day, "Inserted sleep record");

    Ok((StatusCode::CREATED, Json(SleepRecordResponse::from(stored))))
}
