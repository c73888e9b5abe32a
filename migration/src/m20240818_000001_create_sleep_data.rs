use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Column order is part of the persisted layout; keep it stable.
        // No server-side id default: ids come from the upstream provider
        // or from the caller, and the table must also build on SQLite.
        manager
            .create_table(
                Table::create()
                    .table(SleepData::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SleepData::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SleepData::Day).date())
                    .col(ColumnDef::new(SleepData::AverageBreath).double())
                    .col(ColumnDef::new(SleepData::AverageHeartRate).double())
                    .col(ColumnDef::new(SleepData::AverageHrv).integer())
                    .col(ColumnDef::new(SleepData::AwakeTime).integer())
                    .col(ColumnDef::new(SleepData::BedtimeStart).timestamp_with_time_zone())
                    .col(ColumnDef::new(SleepData::BedtimeEnd).timestamp_with_time_zone())
                    .col(ColumnDef::new(SleepData::DeepSleepDuration).integer())
                    .col(ColumnDef::new(SleepData::Efficiency).integer())
                    .col(ColumnDef::new(SleepData::Latency).integer())
                    .col(ColumnDef::new(SleepData::LightSleepDuration).integer())
                    .col(ColumnDef::new(SleepData::LowestHeartRate).integer())
                    .col(ColumnDef::new(SleepData::RemSleepDuration).integer())
                    .col(ColumnDef::new(SleepData::RestlessPeriods).integer())
                    .col(ColumnDef::new(SleepData::SleepScoreDelta).integer())
                    .col(ColumnDef::new(SleepData::TimeInBed).integer())
                    .col(ColumnDef::new(SleepData::TotalSleepDuration).integer())
                    .col(ColumnDef::new(SleepData::Type).string_len(50))
                    .to_owned(),
            )
            .await?;

        // Day lookups and range scans; deliberately not unique
        manager
            .create_index(
                Index::create()
                    .name("idx_sleep_data_day")
                    .table(SleepData::Table)
                    .col(SleepData::Day)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_sleep_data_day")
                    .table(SleepData::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(SleepData::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SleepData {
    Table,
    Id,
    Day,
    AverageBreath,
    AverageHeartRate,
    AverageHrv,
    AwakeTime,
    BedtimeStart,
    BedtimeEnd,
    DeepSleepDuration,
    Efficiency,
    Latency,
    LightSleepDuration,
    LowestHeartRate,
    RemSleepDuration,
    RestlessPeriods,
    SleepScoreDelta,
    TimeInBed,
    TotalSleepDuration,
    Type,
}
