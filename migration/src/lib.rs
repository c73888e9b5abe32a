pub use sea_orm_migration::prelude::*;

mod m20240818_000001_create_sleep_data;
mod m20240818_000002_create_diet;

pub use m20240818_000001_create_sleep_data::SleepData;
pub use m20240818_000002_create_diet::Diet;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240818_000001_create_sleep_data::Migration),
            Box::new(m20240818_000002_create_diet::Migration),
        ]
    }
}
