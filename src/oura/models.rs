use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Paged response from `/v2/usercollection/sleep`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepResponse {
    #[serde(default)]
    pub data: Vec<SleepDocument>,
    /// Opaque cursor for the next page; absent on the last page
    #[serde(default)]
    pub next_token: Option<String>,
}

/// A single sleep period as returned by Oura.
///
/// Only the fields persisted to `sleep_data` are modelled; everything else
/// (heart rate series, hypnogram strings, readiness) is ignored on parse.
/// All metrics are optional because Oura omits them for short or deleted periods.
/// The same shape is accepted by `POST /api/sleep`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SleepDocument {
    #[serde(default)]
    pub id: Option<String>,
    /// Calendar day the period is attributed to, `YYYY-MM-DD`
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default)]
    pub average_breath: Option<f64>,
    #[serde(default)]
    pub average_heart_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub average_hrv: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub awake_time: Option<i64>,
    /// RFC 3339 with the wearer's local offset
    #[serde(default)]
    pub bedtime_start: Option<String>,
    #[serde(default)]
    pub bedtime_end: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub deep_sleep_duration: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub efficiency: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub latency: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub light_sleep_duration: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub lowest_heart_rate: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub rem_sleep_duration: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub restless_periods: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub sleep_score_delta: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub time_in_bed: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub total_sleep_duration: Option<i64>,
    /// "long_sleep", "late_nap", "rest", "sleep", "deleted", ...
    #[serde(default, rename = "type")]
    pub sleep_type: Option<String>,
}

/// Integer metrics occasionally arrive as floats (`12.0`); truncate them the same way.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    Ok(Option::<Number>::deserialize(deserializer)?.map(|n| match n {
        Number::Int(i) => i,
        Number::Float(f) => f as i64,
    }))
}
