use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One aggregated sleep session. Durations are in seconds.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sleep_data")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub day: Option<Date>,
    pub average_breath: Option<f64>,
    pub average_heart_rate: Option<f64>,
    pub average_hrv: Option<i32>,
    pub awake_time: Option<i32>,
    pub bedtime_start: Option<DateTimeWithTimeZone>,
    pub bedtime_end: Option<DateTimeWithTimeZone>,
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
    #[sea_orm(column_name = "type", column_type = "String(StringLen::N(50))", nullable)]
    #[serde(rename = "type")]
    pub sleep_type: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Every column an upsert overwrites: all of them except the key.
pub const UPSERT_COLUMNS: [Column; 18] = [
    Column::Day,
    Column::AverageBreath,
    Column::AverageHeartRate,
    Column::AverageHrv,
    Column::AwakeTime,
    Column::BedtimeStart,
    Column::BedtimeEnd,
    Column::DeepSleepDuration,
    Column::Efficiency,
    Column::Latency,
    Column::LightSleepDuration,
    Column::LowestHeartRate,
    Column::RemSleepDuration,
    Column::RestlessPeriods,
    Column::SleepScoreDelta,
    Column::TimeInBed,
    Column::TotalSleepDuration,
    Column::SleepType,
];
