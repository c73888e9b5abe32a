use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::entity::diet;

/// Metric name carrying dietary energy in a health export
pub const DIETARY_ENERGY: &str = "dietary_energy";

/// Body posted by the health export webhook.
///
/// Only `data.metrics` is read; everything else in the export is ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct HealthExport {
    #[serde(default)]
    pub data: ExportData,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ExportData {
    #[serde(default)]
    pub metrics: Vec<ExportMetric>,
}

/// One metric series. Points stay untyped because each metric has its own shape.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExportMetric {
    pub name: String,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
}

/// A `dietary_energy` point
#[derive(Debug, Deserialize)]
pub struct EnergyPoint {
    /// `YYYY-MM-DD HH:MM:SS +ZZZZ`
    pub date: String,
    /// Kilojoules
    pub qty: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DietIngestResponse {
    pub message: String,
    /// Distinct days written
    pub written: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DietDayResponse {
    pub date: NaiveDate,
    /// Kilocalories
    pub dietary_energy: Option<f64>,
}

impl From<diet::Model> for DietDayResponse {
    fn from(m: diet::Model) -> Self {
        Self {
            date: m.date,
            dietary_energy: m.dietary_energy,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DietRangeQuery {
    /// First day (YYYY-MM-DD, inclusive). Defaults to 29 days before `end`.
    pub start: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD, inclusive). Defaults to today (UTC).
    pub end: Option<NaiveDate>,
}
