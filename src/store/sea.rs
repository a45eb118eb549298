use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, QueryOrder,
    sea_query::OnConflict,
};
use tracing::{debug, error};

use super::{Store, StoreError};
use crate::entities::{email_log, email_template, event_config, participant};
use crate::mapper;
use crate::model::{EmailLog, EmailTemplate, EventConfig, Participant};

#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn participant_active(p: &Participant) -> participant::ActiveModel {
    mapper::participant::to_row(p).into_active_model().reset_all()
}

#[async_trait]
impl Store for SeaOrmStore {
    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError> {
        let rows = participant::Entity::find()
            .order_by_asc(participant::Column::Name)
            .all(&self.db)
            .await?;
        debug!(count = rows.len(), "loaded participants");

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                match mapper::participant::from_row(row) {
                    Ok(decoded) => Some(decoded.logged("participants", &id)),
                    Err(err) => {
                        error!(%err, "skipping unreadable participant row");
                        None
                    }
                }
            })
            .collect())
    }

    async fn find_participant(&self, id: &str) -> Result<Option<Participant>, StoreError> {
        let row = participant::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(row.and_then(|row| match mapper::participant::from_row(row) {
            Ok(decoded) => Some(decoded.logged("participants", id)),
            Err(err) => {
                error!(%err, "unreadable participant row");
                None
            }
        }))
    }

    async fn insert_participants(&self, participants: &[Participant]) -> Result<(), StoreError> {
        if participants.is_empty() {
            return Ok(());
        }
        participant::Entity::insert_many(participants.iter().map(participant_active))
            .exec_without_returning(&self.db)
            .await?;
        debug!(count = participants.len(), "inserted participants");
        Ok(())
    }

    async fn update_participant(
        &self,
        participant: &Participant,
    ) -> Result<Participant, StoreError> {
        let mut stamped = participant.clone();
        stamped.last_updated = Utc::now();

        match participant_active(&stamped).update(&self.db).await {
            Ok(_) => {
                debug!(id = %stamped.id, status = %stamped.status, "updated participant");
                Ok(stamped)
            }
            Err(DbErr::RecordNotUpdated) => Err(StoreError::NotFound(stamped.id)),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_participant(&self, id: &str) -> Result<(), StoreError> {
        let result = participant::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(StoreError::DeleteNotApplied { id: id.to_string() });
        }
        debug!(id, "deleted participant");
        Ok(())
    }

    async fn load_config(&self) -> Result<EventConfig, StoreError> {
        let row = event_config::Entity::find_by_id(event_config::SINGLETON_ID)
            .one(&self.db)
            .await?;
        Ok(mapper::config::from_row(row).logged("event_config", "1"))
    }

    async fn save_config(&self, config: &EventConfig) -> Result<(), StoreError> {
        use event_config::Column;

        let active = mapper::config::to_row(config)
            .into_active_model()
            .reset_all();
        event_config::Entity::insert(active)
            .on_conflict(
                OnConflict::column(Column::Id)
                    .update_columns([
                        Column::Title,
                        Column::Subtitle,
                        Column::Date,
                        Column::Time,
                        Column::Location,
                        Column::MaxGuests,
                        Column::AllowPlusOne,
                        Column::SecretSantaLimit,
                        Column::DietaryOptions,
                        Column::ContributionSuggestions,
                        Column::Cost,
                        Column::Hosts,
                        Column::Program,
                        Column::BuffetConfig,
                        Column::Activities,
                        Column::ContactEmail,
                        Column::RsvpDeadline,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        debug!("saved event config");
        Ok(())
    }

    async fn list_templates(&self) -> Result<Vec<EmailTemplate>, StoreError> {
        let rows = email_template::Entity::find()
            .order_by_asc(email_template::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                mapper::email::template_from_row(row)
                    .inspect_err(|err| error!(%err, "skipping unreadable template row"))
                    .ok()
                    .map(|decoded| decoded.logged("email_templates", &id))
            })
            .collect())
    }

    async fn save_template(&self, template: &EmailTemplate) -> Result<(), StoreError> {
        use email_template::Column;

        let active = mapper::email::template_to_row(template)
            .into_active_model()
            .reset_all();
        email_template::Entity::insert(active)
            .on_conflict(
                OnConflict::column(Column::Id)
                    .update_columns([
                        Column::Name,
                        Column::Subject,
                        Column::Body,
                        Column::Trigger,
                        Column::Description,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        debug!(id = %template.id, "saved template");
        Ok(())
    }

    async fn seed_templates(&self, templates: &[EmailTemplate]) -> Result<(), StoreError> {
        if templates.is_empty() {
            return Ok(());
        }
        let rows = templates
            .iter()
            .map(|t| mapper::email::template_to_row(t).into_active_model().reset_all());
        email_template::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::column(email_template::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        debug!(count = templates.len(), "seeded templates");
        Ok(())
    }

    async fn list_logs(&self) -> Result<Vec<EmailLog>, StoreError> {
        let rows = email_log::Entity::find()
            .order_by_desc(email_log::Column::Date)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                mapper::email::log_from_row(row)
                    .inspect_err(|err| error!(%err, "skipping unreadable log row"))
                    .ok()
                    .map(|decoded| decoded.logged("email_logs", &id))
            })
            .collect())
    }

    async fn append_log(&self, log: &EmailLog) -> Result<(), StoreError> {
        let active = mapper::email::log_to_row(log).into_active_model().reset_all();
        email_log::Entity::insert(active)
            .exec_without_returning(&self.db)
            .await?;
        debug!(template = %log.template_name, status = %log.status, "appended email log");
        Ok(())
    }
}
