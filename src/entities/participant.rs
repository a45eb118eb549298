//! One row per invitee. Food is flattened into `food_*` columns.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: String,
    pub avatar_style: Option<String>,
    pub avatar_seed: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub avatar_image: Option<String>,
    pub plus_one: Option<String>,
    pub plus_one_allergies: Option<String>,
    pub food_name: Option<String>,
    pub food_category: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub food_description: Option<String>,
    pub food_is_vegan: Option<bool>,
    pub food_is_gluten_free: Option<bool>,
    pub food_is_lactose_free: Option<bool>,
    pub food_contains_alcohol: Option<bool>,
    pub food_contains_nuts: Option<bool>,
    pub show_name_in_buffet: Option<bool>,
    #[sea_orm(column_type = "Text", nullable)]
    pub allergies: Option<String>,
    pub is_secret_santa: Option<bool>,
    pub wants_invoice: Option<bool>,
    #[sea_orm(column_type = "Text", nullable)]
    pub contribution: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub last_updated: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
