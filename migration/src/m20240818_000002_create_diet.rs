use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per calendar day; later exports for the same day overwrite it
        manager
            .create_table(
                Table::create()
                    .table(Diet::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Diet::Date).date().not_null().primary_key())
                    .col(ColumnDef::new(Diet::DietaryEnergy).double())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Diet::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Diet {
    Table,
    Date,
    /// Kilocalories
    DietaryEnergy,
}
