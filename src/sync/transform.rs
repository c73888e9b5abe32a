//! Conversion of Oura sleep documents into `sleep_data` rows.
//!
//! The table itself only enforces the primary key. Everything else that makes
//! a row meaningful is checked here, before anything is written:
//!
//! - `id` present and a UUID
//! - `day` and bedtimes parse
//! - `bedtime_end` is not before `bedtime_start`
//! - durations are non-negative
//! - `type` fits in 50 characters (rejected, never truncated)

use chrono::{DateTime, NaiveDate};
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use crate::entity::sleep_data;
use crate::oura::models::SleepDocument;

/// Maximum length of the `type` label, matching the `varchar(50)` column.
pub const MAX_TYPE_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("record has no id")]
    MissingId,

    #[error("id {0:?} is not a UUID")]
    InvalidId(String),

    #[error("{field} {value:?} is not a valid date or timestamp")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("bedtime_end is before bedtime_start")]
    BedtimeOrder,

    #[error("{field} must be non-negative, got {value}")]
    NegativeDuration { field: &'static str, value: i64 },

    #[error("{field} value {value} does not fit in a 32-bit integer")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("type is {len} characters, at most {MAX_TYPE_LEN} allowed")]
    TypeTooLong { len: usize },
}

/// Validate a document and build the row it maps to.
///
/// # Errors
///
/// Returns the first `ValidationError` the document violates.
pub fn to_record(doc: &SleepDocument) -> Result<sleep_data::Model, ValidationError> {
    let raw_id = doc
        .id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingId)?;
    let id = Uuid::parse_str(raw_id).map_err(|_| ValidationError::InvalidId(raw_id.to_string()))?;

    let day = doc
        .day
        .as_deref()
        .map(|d| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|_| ValidationError::InvalidTimestamp {
                field: "day",
                value: d.to_string(),
            })
        })
        .transpose()?;

    let bedtime_start = parse_timestamp("bedtime_start", doc.bedtime_start.as_deref())?;
    let bedtime_end = parse_timestamp("bedtime_end", doc.bedtime_end.as_deref())?;
    if let (Some(start), Some(end)) = (bedtime_start, bedtime_end)
        && end < start
    {
        return Err(ValidationError::BedtimeOrder);
    }

    if let Some(label) = &doc.sleep_type {
        let len = label.chars().count();
        if len > MAX_TYPE_LEN {
            return Err(ValidationError::TypeTooLong { len });
        }
    }

    Ok(sleep_data::Model {
        id,
        day,
        average_breath: doc.average_breath,
        average_heart_rate: doc.average_heart_rate,
        average_hrv: int("average_hrv", doc.average_hrv)?,
        awake_time: duration("awake_time", doc.awake_time)?,
        bedtime_start,
        bedtime_end,
        deep_sleep_duration: duration("deep_sleep_duration", doc.deep_sleep_duration)?,
        efficiency: int("efficiency", doc.efficiency)?,
        latency: duration("latency", doc.latency)?,
        light_sleep_duration: duration("light_sleep_duration", doc.light_sleep_duration)?,
        lowest_heart_rate: int("lowest_heart_rate", doc.lowest_heart_rate)?,
        rem_sleep_duration: duration("rem_sleep_duration", doc.rem_sleep_duration)?,
        restless_periods: int("restless_periods", doc.restless_periods)?,
        sleep_score_delta: int("sleep_score_delta", doc.sleep_score_delta)?,
        time_in_bed: duration("time_in_bed", doc.time_in_bed)?,
        total_sleep_duration: duration("total_sleep_duration", doc.total_sleep_duration)?,
        sleep_type: doc.sleep_type.clone(),
    })
}

fn parse_timestamp(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTimeWithTimeZone>, ValidationError> {
    value
        .map(|v| {
            DateTime::parse_from_rfc3339(v).map_err(|_| ValidationError::InvalidTimestamp {
                field,
                value: v.to_string(),
            })
        })
        .transpose()
}

fn int(field: &'static str, value: Option<i64>) -> Result<Option<i32>, ValidationError> {
    value
        .map(|v| i32::try_from(v).map_err(|_| ValidationError::OutOfRange { field, value: v }))
        .transpose()
}

fn duration(field: &'static str, value: Option<i64>) -> Result<Option<i32>, ValidationError> {
    if let Some(v) = value
        && v < 0
    {
        return Err(ValidationError::NegativeDuration { field, value: v });
    }
    int(field, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> SleepDocument {
        SleepDocument {
            id: Some("8f9a5221-639e-4a85-81cb-4065ef23f979".to_string()),
            day: Some("2024-01-15".to_string()),
            average_breath: Some(14.625),
            average_heart_rate: Some(58.3),
            average_hrv: Some(41),
            awake_time: Some(2_460),
            bedtime_start: Some("2024-01-14T23:10:00-08:00".to_string()),
            bedtime_end: Some("2024-01-15T07:31:00-08:00".to_string()),
            deep_sleep_duration: Some(4_800),
            efficiency: Some(91),
            latency: Some(540),
            light_sleep_duration: Some(14_400),
            lowest_heart_rate: Some(49),
            rem_sleep_duration: Some(6_000),
            restless_periods: Some(212),
            sleep_score_delta: Some(-2),
            time_in_bed: Some(30_060),
            total_sleep_duration: Some(25_200),
            sleep_type: Some("long_sleep".to_string()),
        }
    }

    #[test]
    fn valid_document_maps_every_field() {
        let record = to_record(&document()).unwrap();

        assert_eq!(record.id.to_string(), "8f9a5221-639e-4a85-81cb-4065ef23f979");
        assert_eq!(record.day, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(record.average_heart_rate, Some(58.3));
        assert_eq!(record.total_sleep_duration, Some(25_200));
        assert_eq!(record.sleep_score_delta, Some(-2));
        assert_eq!(record.sleep_type.as_deref(), Some("long_sleep"));
        let start = record.bedtime_start.unwrap();
        assert_eq!(start.offset().local_minus_utc(), -8 * 3600);
    }

    #[test]
    fn missing_or_blank_id_is_rejected() {
        let mut doc = document();
        doc.id = None;
        assert_eq!(to_record(&doc), Err(ValidationError::MissingId));

        doc.id = Some("   ".to_string());
        assert_eq!(to_record(&doc), Err(ValidationError::MissingId));
    }

    #[test]
    fn non_uuid_id_is_rejected() {
        let mut doc = document();
        doc.id = Some("not-a-uuid".to_string());
        assert_eq!(
            to_record(&doc),
            Err(ValidationError::InvalidId("not-a-uuid".to_string()))
        );
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut doc = document();
        doc.bedtime_end = Some("2024-01-14T22:00:00-08:00".to_string());
        assert_eq!(to_record(&doc), Err(ValidationError::BedtimeOrder));
    }

    #[test]
    fn equal_bedtimes_are_accepted() {
        let mut doc = document();
        doc.bedtime_end = doc.bedtime_start.clone();
        assert!(to_record(&doc).is_ok());
    }

    #[test]
    fn bedtimes_compare_as_instants_across_offsets() {
        let mut doc = document();
        // 07:00Z is 23:00 the previous evening at -08:00, i.e. the same instant
        doc.bedtime_start = Some("2024-01-14T23:00:00-08:00".to_string());
        doc.bedtime_end = Some("2024-01-15T07:00:00Z".to_string());
        assert!(to_record(&doc).is_ok());
    }

    #[test]
    fn negative_duration_is_rejected() {
        let mut doc = document();
        doc.latency = Some(-1);
        assert_eq!(
            to_record(&doc),
            Err(ValidationError::NegativeDuration {
                field: "latency",
                value: -1
            })
        );
    }

    #[test]
    fn negative_score_delta_is_not_a_duration() {
        let mut doc = document();
        doc.sleep_score_delta = Some(-15);
        assert!(to_record(&doc).is_ok());
    }

    #[test]
    fn type_length_is_counted_in_characters() {
        let mut doc = document();
        doc.sleep_type = Some("x".repeat(MAX_TYPE_LEN));
        assert!(to_record(&doc).is_ok());

        doc.sleep_type = Some("é".repeat(MAX_TYPE_LEN));
        assert!(to_record(&doc).is_ok());

        doc.sleep_type = Some("x".repeat(MAX_TYPE_LEN + 1));
        assert_eq!(
            to_record(&doc),
            Err(ValidationError::TypeTooLong { len: 51 })
        );
    }

    #[test]
    fn oversized_integer_is_rejected() {
        let mut doc = document();
        doc.restless_periods = Some(i64::from(i32::MAX) + 1);
        assert!(matches!(
            to_record(&doc),
            Err(ValidationError::OutOfRange {
                field: "restless_periods",
                ..
            })
        ));
    }

    #[test]
    fn bad_day_is_rejected() {
        let mut doc = document();
        doc.day = Some("15/01/2024".to_string());
        assert!(matches!(
            to_record(&doc),
            Err(ValidationError::InvalidTimestamp { field: "day", .. })
        ));
    }

    #[test]
    fn sparse_document_keeps_missing_metrics_null() {
        let doc = SleepDocument {
            id: Some("0b6c2f4e-2d44-4d8f-9a43-3f1f6b1c2a10".to_string()),
            ..SleepDocument::default()
        };
        let record = to_record(&doc).unwrap();
        assert_eq!(record.day, None);
        assert_eq!(record.total_sleep_duration, None);
        assert_eq!(record.sleep_type, None);
    }
}
