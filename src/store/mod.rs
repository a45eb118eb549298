//! Persistence seam. Controllers talk to a [`Store`] and never to sea-orm
//! directly, so the in-memory implementation can stand in for tests.

mod memory;
mod sea;

pub use memory::MemoryStore;
pub use sea::SeaOrmStore;

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

use crate::model::{EmailLog, EmailTemplate, EventConfig, Participant};

pub type SharedStore = Arc<dyn Store>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(DbErr),

    #[error("participant {0} not found")]
    NotFound(String),

    #[error("deleting {id} affected no rows, an access policy may be blocking deletion")]
    DeleteNotApplied { id: String },

    #[error("write rejected by access policy: {0}")]
    PolicyDenied(String),
}

const POLICY_PATTERNS: [&str; 3] = ["permission denied", "row-level security", "42501"];

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        let message = err.to_string();
        let lower = message.to_lowercase();
        if POLICY_PATTERNS.iter().any(|p| lower.contains(p)) {
            StoreError::PolicyDenied(message)
        } else {
            StoreError::Db(err)
        }
    }
}

impl StoreError {
    pub fn is_policy(&self) -> bool {
        matches!(
            self,
            StoreError::PolicyDenied(_) | StoreError::DeleteNotApplied { .. }
        )
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError>;

    async fn find_participant(&self, id: &str) -> Result<Option<Participant>, StoreError>;

    async fn insert_participants(&self, participants: &[Participant]) -> Result<(), StoreError>;

    /// Rewrites the whole row and stamps `last_updated`.
    async fn update_participant(&self, participant: &Participant)
    -> Result<Participant, StoreError>;

    /// Hard delete. Zero affected rows is an error, not a silent success.
    async fn delete_participant(&self, id: &str) -> Result<(), StoreError>;

    async fn load_config(&self) -> Result<EventConfig, StoreError>;

    async fn save_config(&self, config: &EventConfig) -> Result<(), StoreError>;

    async fn list_templates(&self) -> Result<Vec<EmailTemplate>, StoreError>;

    async fn save_template(&self, template: &EmailTemplate) -> Result<(), StoreError>;

    async fn seed_templates(&self, templates: &[EmailTemplate]) -> Result<(), StoreError>;

    /// Newest first.
    async fn list_logs(&self) -> Result<Vec<EmailLog>, StoreError>;

    async fn append_log(&self, log: &EmailLog) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_errors_are_recognised() {
        let err = StoreError::from(DbErr::Custom(
            "new row violates row-level security policy".into(),
        ));
        assert!(matches!(err, StoreError::PolicyDenied(_)));

        let err = StoreError::from(DbErr::Custom("ERROR 42501".into()));
        assert!(err.is_policy());

        let err = StoreError::from(DbErr::Custom("connection reset".into()));
        assert!(matches!(err, StoreError::Db(_)));
    }
}
