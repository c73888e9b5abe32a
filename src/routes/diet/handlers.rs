use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::common::AppState;
use crate::entity::diet;
use crate::error::{AppError, AppResult};
use crate::routes::range::resolve_range;
use crate::services::diet_store;

use super::types::{
    DietDayResponse, DietIngestResponse, DietRangeQuery, EnergyPoint, HealthExport, DIETARY_ENERGY,
};

/// Daily kilocalorie rows from every `dietary_energy` point in an export.
fn dietary_energy_rows(export: HealthExport) -> AppResult<Vec<diet::Model>> {
    let mut rows = Vec::new();

    for metric in export.data.metrics {
        if metric.name != DIETARY_ENERGY {
            continue;
        }
        if let Some(units) = metric.units.as_deref()
            && units != "kJ"
        {
            tracing::warn!(units, "Unexpected dietary energy units, treating as kJ");
        }

        for point in metric.data {
            let point: EnergyPoint = serde_json::from_value(point)
                .map_err(|e| AppError::BadRequest(format!("invalid {DIETARY_ENERGY} point: {e}")))?;
            rows.push(diet::Model {
                date: diet_store::parse_export_date(&point.date)?,
                dietary_energy: Some(diet_store::kj_to_kcal(point.qty)),
            });
        }
    }

    Ok(rows)
}

/// Ingest dietary energy from a health export
///
/// Converts each `dietary_energy` point from kJ to kcal and stores it under
/// its local calendar day, replacing any earlier value for that day. Other
/// metrics are ignored. Nothing is written if any point is invalid.
#[utoipa::path(
    post,
    path = "/dietary-energy/",
    request_body = HealthExport,
    responses(
        (status = 200, description = "Export processed", body = DietIngestResponse),
        (status = 400, description = "Malformed export or invalid point"),
    ),
    tag = "diet"
)]
pub async fn ingest_dietary_energy(
    State(state): State<AppState>,
    payload: Result<Json<HealthExport>, JsonRejection>,
) -> AppResult<Json<DietIngestResponse>> {
    let Json(export) = payload?;
    let rows = dietary_energy_rows(export)?;
    let written = diet_store::upsert_many(&state.db, rows).await?;

    tracing::info!(written, "Stored dietary energy");

    Ok(Json(DietIngestResponse {
        message: "Data processed successfully".to_string(),
        written,
    }))
}

/// Echo a JSON body
///
/// Logs the body and returns it unchanged; used to inspect what an export
/// client actually sends.
#[utoipa::path(
    post,
    path = "/echo/",
    responses(
        (status = 200, description = "The request body, unchanged"),
        (status = 400, description = "Body is not JSON"),
    ),
    tag = "diet"
)]
pub async fn echo(payload: Result<Json<Value>, JsonRejection>) -> AppResult<Json<Value>> {
    let Json(body) = payload?;
    tracing::info!(body = %body, "Echo");
    Ok(Json(body))
}

/// List daily dietary energy in a date range
#[utoipa::path(
    get,
    path = "/api/diet",
    params(DietRangeQuery),
    responses(
        (status = 200, description = "Daily totals, oldest first", body = Vec<DietDayResponse>),
        (status = 400, description = "Invalid query parameters"),
    ),
    tag = "diet"
)]
pub async fn list_diet(
    State(state): State<AppState>,
    Query(query): Query<DietRangeQuery>,
) -> AppResult<Json<Vec<DietDayResponse>>> {
    let (start, end) = resolve_range(query.start, query.end, Utc::now().date_naive())?;
    let days = diet_store::find_by_range(&state.db, start, end)
        .await?
        .into_iter()
        .map(DietDayResponse::from)
        .collect();

    Ok(Json(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn export(metrics: Value) -> HealthExport {
        serde_json::from_value(json!({ "data": { "metrics": metrics } })).unwrap()
    }

    #[test]
    fn keeps_only_dietary_energy() {
        let rows = dietary_energy_rows(export(json!([
            { "name": "step_count", "units": "count", "data": [{ "date": "2024-08-18 00:00:00 +0200", "qty": 9000 }] },
            { "name": "sleep_analysis", "data": [{ "date": "2024-08-18 00:00:00 +0200", "asleep": 7.1 }] },
            { "name": "dietary_energy", "units": "kJ", "data": [
                { "date": "2024-08-18 00:00:00 +0200", "qty": 8368.0 },
                { "date": "2024-08-19 00:00:00 +0200", "qty": 4184 }
            ] }
        ])))
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 8, 18).unwrap());
        assert!((rows[0].dietary_energy.unwrap() - 2000.0).abs() < 1e-9);
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2024, 8, 19).unwrap());
        assert!((rows[1].dietary_energy.unwrap() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn empty_export_yields_nothing() {
        let empty: HealthExport = serde_json::from_value(json!({})).unwrap();
        assert!(dietary_energy_rows(empty).unwrap().is_empty());
    }

    #[test]
    fn point_without_quantity_is_rejected() {
        let result = dietary_energy_rows(export(json!([
            { "name": "dietary_energy", "data": [{ "date": "2024-08-18 00:00:00 +0200" }] }
        ])));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn bad_date_is_rejected() {
        let result = dietary_energy_rows(export(json!([
            { "name": "dietary_energy", "data": [{ "date": "18/08/2024", "qty": 1.0 }] }
        ])));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
