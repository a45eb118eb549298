//! Singleton settings row. Structured collections live in JSON columns and may
//! hold a JSON array, JSON text, or (for `program`) a legacy comma list.

use sea_orm::entity::prelude::*;
use serde::Serialize;

pub const SINGLETON_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "event_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub title: String,
    pub subtitle: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub max_guests: Option<i32>,
    pub allow_plus_one: Option<bool>,
    pub secret_santa_limit: Option<i32>,
    pub dietary_options: Option<Json>,
    pub contribution_suggestions: Option<Json>,
    pub cost: Option<String>,
    pub hosts: Option<String>,
    pub program: Option<Json>,
    pub buffet_config: Option<Json>,
    pub activities: Option<Json>,
    pub contact_email: Option<String>,
    pub rsvp_deadline: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
