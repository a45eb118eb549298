//! Append-only audit of batch sends. References the template by name and the
//! recipients only by count, so it cannot be joined back.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "email_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub date: DateTimeUtc,
    pub template_name: String,
    pub recipient_count: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub recipients_preview: Option<String>,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
