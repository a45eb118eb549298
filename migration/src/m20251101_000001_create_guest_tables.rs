use sea_orm_migration::{prelude::*, schema::*};

use crate::iden::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create Participants Table
        let table = table_auto(Participants::Table)
            .col(string(Participants::Id).primary_key())
            .col(string(Participants::Name))
            .col(string(Participants::Email))
            .col(string(Participants::Status).default("pending"))
            .col(string_null(Participants::AvatarStyle))
            .col(string_null(Participants::AvatarSeed))
            .col(text_null(Participants::AvatarImage))
            .col(string_null(Participants::PlusOne))
            .col(string_null(Participants::PlusOneAllergies))
            .col(string_null(Participants::FoodName))
            .col(string_null(Participants::FoodCategory))
            .col(text_null(Participants::FoodDescription))
            .col(boolean_null(Participants::FoodIsVegan))
            .col(boolean_null(Participants::FoodIsGlutenFree))
            .col(boolean_null(Participants::FoodIsLactoseFree))
            .col(boolean_null(Participants::FoodContainsAlcohol))
            .col(boolean_null(Participants::FoodContainsNuts))
            .col(boolean_null(Participants::ShowNameInBuffet))
            .col(text_null(Participants::Allergies))
            .col(boolean_null(Participants::IsSecretSanta))
            .col(boolean_null(Participants::WantsInvoice))
            .col(text_null(Participants::Contribution))
            .col(text_null(Participants::Notes))
            .col(timestamp_with_time_zone_null(Participants::LastUpdated))
            .to_owned();
        manager.create_table(table).await?;

        // Create EventConfig Table (singleton row, id = 1)
        let table = table_auto(EventConfig::Table)
            .col(integer(EventConfig::Id).primary_key())
            .col(string(EventConfig::Title))
            .col(string_null(EventConfig::Subtitle))
            .col(string_null(EventConfig::Date))
            .col(string_null(EventConfig::Time))
            .col(string_null(EventConfig::Location))
            .col(integer_null(EventConfig::MaxGuests))
            .col(boolean_null(EventConfig::AllowPlusOne))
            .col(integer_null(EventConfig::SecretSantaLimit))
            .col(json_null(EventConfig::DietaryOptions))
            .col(string_null(EventConfig::Cost))
            .col(string_null(EventConfig::Hosts))
            .col(json_null(EventConfig::Program))
            .col(string_null(EventConfig::ContactEmail))
            .col(string_null(EventConfig::RsvpDeadline))
            .to_owned();
        manager.create_table(table).await?;

        // Create EmailTemplates Table
        let table = table_auto(EmailTemplates::Table)
            .col(string(EmailTemplates::Id).primary_key())
            .col(string(EmailTemplates::Name))
            .col(string(EmailTemplates::Subject))
            .col(text(EmailTemplates::Body))
            .col(string(EmailTemplates::Trigger).default("manual"))
            .col(text_null(EmailTemplates::Description))
            .to_owned();
        manager.create_table(table).await?;

        // Create EmailLogs Table
        let table = table_auto(EmailLogs::Table)
            .col(string(EmailLogs::Id).primary_key())
            .col(timestamp_with_time_zone(EmailLogs::Date))
            .col(string(EmailLogs::TemplateName))
            .col(integer(EmailLogs::RecipientCount))
            .col(text_null(EmailLogs::RecipientsPreview))
            .col(string(EmailLogs::Status))
            .to_owned();
        manager.create_table(table).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_participants_status")
                    .table(Participants::Table)
                    .col(Participants::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmailLogs::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(EmailTemplates::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(EventConfig::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Participants::Table).to_owned())
            .await?;

        Ok(())
    }
}
