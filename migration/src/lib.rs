pub use sea_orm_migration::prelude::*;

mod iden;
mod m20251101_000001_create_guest_tables;
mod m20251120_000002_add_structured_config;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251101_000001_create_guest_tables::Migration),
            Box::new(m20251120_000002_add_structured_config::Migration),
        ]
    }
}
