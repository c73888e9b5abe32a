use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entity::sleep_data;

fn default_format() -> String {
    "json".to_string()
}

/// One row of `sleep_data`. Durations are in seconds.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SleepRecordResponse {
    pub id: Uuid,
    pub day: Option<NaiveDate>,
    pub average_breath: Option<f64>,
    pub average_heart_rate: Option<f64>,
    pub average_hrv: Option<i32>,
    pub awake_time: Option<i32>,
    pub bedtime_start: Option<DateTime<FixedOffset>>,
    pub bedtime_end: Option<DateTime<FixedOffset>>,
    pub deep_sleep_duration: Option<i32>,
    pub efficiency: Option<i32>,
    pub latency: Option<i32>,
    pub light_sleep_duration: Option<i32>,
    pub lowest_heart_rate: Option<i32>,
    pub rem_sleep_duration: Option<i32>,
    pub restless_periods: Option<i32>,
    pub sleep_score_delta: Option<i32>,
    pub time_in_bed: Option<i32>,
    pub total_sleep_duration: Option<i32>,
    #[serde(rename = "type")]
    pub sleep_type: Option<String>,
}

impl From<sleep_data::Model> for SleepRecordResponse {
    fn from(m: sleep_data::Model) -> Self {
        Self {
            id: m.id,
            day: m.day,
            average_breath: m.average_breath,
            average_heart_rate: m.average_heart_rate,
            average_hrv: m.average_hrv,
            awake_time: m.awake_time,
            bedtime_start: m.bedtime_start,
            bedtime_end: m.bedtime_end,
            deep_sleep_duration: m.deep_sleep_duration,
            efficiency: m.efficiency,
            latency: m.latency,
            light_sleep_duration: m.light_sleep_duration,
            lowest_heart_rate: m.lowest_heart_rate,
            rem_sleep_duration: m.rem_sleep_duration,
            restless_periods: m.restless_periods,
            sleep_score_delta: m.sleep_score_delta,
            time_in_bed: m.time_in_bed,
            total_sleep_duration: m.total_sleep_duration,
            sleep_type: m.sleep_type,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SleepRangeResponse {
    /// First day of the requested range (inclusive)
    pub start: NaiveDate,
    /// Last day of the requested range (inclusive)
    pub end: NaiveDate,
    pub count: usize,
    pub records: Vec<SleepRecordResponse>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SleepRangeQuery {
    /// First day (YYYY-MM-DD, inclusive). Defaults to 29 days before `end`.
    pub start: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD, inclusive). Defaults to today (UTC).
    pub end: Option<NaiveDate>,
    /// Response format: json (default) or csv
    #[serde(default = "default_format")]
    pub format: String,
}
