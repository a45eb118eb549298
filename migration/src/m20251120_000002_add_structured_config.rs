use sea_orm_migration::{prelude::*, schema::*};

use crate::iden::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite only accepts one column per ALTER TABLE statement.
        for column in [
            EventConfig::ContributionSuggestions,
            EventConfig::BuffetConfig,
            EventConfig::Activities,
        ] {
            manager
                .alter_table(
                    Table::alter()
                        .table(EventConfig::Table)
                        .add_column(json_null(column))
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for column in [
            EventConfig::Activities,
            EventConfig::BuffetConfig,
            EventConfig::ContributionSuggestions,
        ] {
            manager
                .alter_table(
                    Table::alter()
                        .table(EventConfig::Table)
                        .drop_column(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}
