use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{Store, StoreError};
use crate::mapper::email::sort_logs;
use crate::model::{EmailLog, EmailTemplate, EventConfig, Participant};

#[derive(Debug, Default)]
struct Tables {
    participants: Vec<Participant>,
    config: Option<EventConfig>,
    templates: Vec<EmailTemplate>,
    logs: Vec<EmailLog>,
}

/// Process-local store. Counts every write so callers can assert how many
/// persistence round trips an action made.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    writes: AtomicUsize,
    block_deletes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_participants(participants: Vec<Participant>) -> Self {
        let store = Self::new();
        store.tables.lock().await.participants = participants;
        store
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes deletes report success without removing anything, the way a
    /// restrictive row policy behaves.
    pub fn block_deletes(&self) {
        self.block_deletes.store(true, Ordering::SeqCst);
    }

    fn count_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError> {
        let mut participants = self.tables.lock().await.participants.clone();
        participants.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(participants)
    }

    async fn find_participant(&self, id: &str) -> Result<Option<Participant>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.participants.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_participants(&self, participants: &[Participant]) -> Result<(), StoreError> {
        self.count_write();
        self.tables
            .lock()
            .await
            .participants
            .extend_from_slice(participants);
        Ok(())
    }

    async fn update_participant(
        &self,
        participant: &Participant,
    ) -> Result<Participant, StoreError> {
        self.count_write();
        let mut tables = self.tables.lock().await;
        let slot = tables
            .participants
            .iter_mut()
            .find(|p| p.id == participant.id)
            .ok_or_else(|| StoreError::NotFound(participant.id.clone()))?;
        *slot = participant.clone();
        slot.last_updated = Utc::now();
        Ok(slot.clone())
    }

    async fn delete_participant(&self, id: &str) -> Result<(), StoreError> {
        self.count_write();
        let mut tables = self.tables.lock().await;
        let before = tables.participants.len();
        if !self.block_deletes.load(Ordering::SeqCst) {
            tables.participants.retain(|p| p.id != id);
        }
        if tables.participants.len() == before {
            return Err(StoreError::DeleteNotApplied { id: id.to_string() });
        }
        Ok(())
    }

    async fn load_config(&self) -> Result<EventConfig, StoreError> {
        Ok(self.tables.lock().await.config.clone().unwrap_or_default())
    }

    async fn save_config(&self, config: &EventConfig) -> Result<(), StoreError> {
        self.count_write();
        self.tables.lock().await.config = Some(config.clone());
        Ok(())
    }

    async fn list_templates(&self) -> Result<Vec<EmailTemplate>, StoreError> {
        let mut templates = self.tables.lock().await.templates.clone();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(templates)
    }

    async fn save_template(&self, template: &EmailTemplate) -> Result<(), StoreError> {
        self.count_write();
        let mut tables = self.tables.lock().await;
        match tables.templates.iter_mut().find(|t| t.id == template.id) {
            Some(slot) => *slot = template.clone(),
            None => tables.templates.push(template.clone()),
        }
        Ok(())
    }

    async fn seed_templates(&self, templates: &[EmailTemplate]) -> Result<(), StoreError> {
        self.count_write();
        let mut tables = self.tables.lock().await;
        for template in templates {
            if !tables.templates.iter().any(|t| t.id == template.id) {
                tables.templates.push(template.clone());
            }
        }
        Ok(())
    }

    async fn list_logs(&self) -> Result<Vec<EmailLog>, StoreError> {
        let mut logs = self.tables.lock().await.logs.clone();
        sort_logs(&mut logs);
        Ok(logs)
    }

    async fn append_log(&self, log: &EmailLog) -> Result<(), StoreError> {
        self.count_write();
        self.tables.lock().await.logs.push(log.clone());
        Ok(())
    }
}
