use sea_orm_migration::prelude::*;

// Define table names
#[derive(DeriveIden)]
pub enum Participants {
    Table,
    Id,
    Name,
    Email,
    Status,
    AvatarStyle,
    AvatarSeed,
    AvatarImage,
    PlusOne,
    PlusOneAllergies,
    FoodName,
    FoodCategory,
    FoodDescription,
    FoodIsVegan,
    FoodIsGlutenFree,
    FoodIsLactoseFree,
    FoodContainsAlcohol,
    FoodContainsNuts,
    ShowNameInBuffet,
    Allergies,
    IsSecretSanta,
    WantsInvoice,
    Contribution,
    Notes,
    LastUpdated,
}

#[derive(DeriveIden)]
pub enum EventConfig {
    Table,
    Id,
    Title,
    Subtitle,
    Date,
    Time,
    Location,
    MaxGuests,
    AllowPlusOne,
    SecretSantaLimit,
    DietaryOptions,
    ContributionSuggestions,
    Cost,
    Hosts,
    Program,
    BuffetConfig,
    Activities,
    ContactEmail,
    RsvpDeadline,
}

#[derive(DeriveIden)]
pub enum EmailTemplates {
    Table,
    Id,
    Name,
    Subject,
    Body,
    Trigger,
    Description,
}

#[derive(DeriveIden)]
pub enum EmailLogs {
    Table,
    Id,
    Date,
    TemplateName,
    RecipientCount,
    RecipientsPreview,
    Status,
}
