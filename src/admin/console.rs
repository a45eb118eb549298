use thiserror::Error;
use tracing::{error, info, warn};

use super::csv::{self, ImportCandidate};
use super::recipients::RecipientFilter;
use super::sort::{SortDirection, SortKey, sort_participants};
use super::stats::Stats;
use crate::functions::MailClient;
use crate::model::{
    EmailLog, EmailTemplate, EventConfig, FoodItem, LogStatus, Participant, RsvpStatus,
    default_templates,
};
use crate::placeholders::{RenderedMessage, render_batch, render_message};
use crate::store::{SharedStore, StoreError};

pub const CUSTOM_MESSAGE_LABEL: &str = "Individuelle Nachricht";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name und E-Mail sind erforderlich.")]
    MissingNameOrEmail,

    #[error("Keine Empfänger ausgewählt.")]
    NoRecipients,

    #[error("Die Nachricht ist leer.")]
    EmptyBody,

    #[error("Vorlage {0} existiert nicht.")]
    UnknownTemplate(String),
}

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fields the admin may change on an existing participant.
#[derive(Debug, Clone)]
pub struct ParticipantEdit {
    pub name: String,
    pub email: String,
    pub status: RsvpStatus,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub added: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub enum Composition {
    Template(String),
    Custom { subject: String, body: String },
}

/// A rendered batch waiting for the operator's confirmation.
#[derive(Debug, Clone)]
pub struct PreparedDispatch {
    pub label: String,
    pub messages: Vec<RenderedMessage>,
    pub names: Vec<String>,
}

impl PreparedDispatch {
    pub fn recipient_count(&self) -> usize {
        self.messages.len()
    }

    pub fn confirmation_prompt(&self) -> String {
        format!("Wirklich an {} Empfänger senden?", self.recipient_count())
    }

    pub fn confirm(self) -> ConfirmedDispatch {
        ConfirmedDispatch(self)
    }
}

/// Only obtainable through [`PreparedDispatch::confirm`].
#[derive(Debug, Clone)]
pub struct ConfirmedDispatch(PreparedDispatch);

/// Guest used for template previews when nobody is invited yet.
pub fn sample_participant() -> Participant {
    let mut sample = Participant::new("Max Mustermann", "max@test.de");
    sample.id = "dummy".into();
    sample.food = Some(FoodItem {
        name: "Kartoffelsalat".into(),
        ..Default::default()
    });
    sample.plus_one = "Erika".into();
    sample
}

fn attending_count(participants: &[Participant]) -> usize {
    participants.iter().filter(|p| p.is_attending()).count()
}

#[derive(Clone)]
pub struct AdminConsole {
    store: SharedStore,
    mail: MailClient,
    origin: String,
}

impl AdminConsole {
    pub fn new(store: SharedStore, mail: MailClient, origin: &str) -> Self {
        Self {
            store,
            mail,
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub async fn participants(
        &self,
        key: SortKey,
        direction: SortDirection,
    ) -> Result<Vec<Participant>, AdminError> {
        let mut participants = self.store.list_participants().await?;
        sort_participants(&mut participants, key, direction);
        Ok(participants)
    }

    pub async fn stats(&self) -> Result<Stats, AdminError> {
        let participants = self.store.list_participants().await?;
        let config = self.store.load_config().await?;
        Ok(Stats::compute(&participants, &config))
    }

    pub async fn create(&self, name: &str, email: &str) -> Result<Participant, AdminError> {
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(ValidationError::MissingNameOrEmail.into());
        }
        let participant = Participant::new(name, email);
        self.store
            .insert_participants(std::slice::from_ref(&participant))
            .await?;
        info!(id = %participant.id, "participant created");
        Ok(participant)
    }

    pub async fn import(&self, text: &str) -> Result<ImportReport, AdminError> {
        let candidates = csv::parse_import(text);
        let parsed = candidates.len();
        let existing = self.store.list_participants().await?;
        let fresh: Vec<Participant> = csv::dedupe(candidates, &existing)
            .into_iter()
            .map(|ImportCandidate { name, email }| Participant::new(&name, &email))
            .collect();

        self.store.insert_participants(&fresh).await?;
        let report = ImportReport {
            added: fresh.len(),
            skipped: parsed - fresh.len(),
        };
        info!(added = report.added, skipped = report.skipped, "csv import");
        Ok(report)
    }

    pub async fn update(&self, id: &str, edit: ParticipantEdit) -> Result<Participant, AdminError> {
        if edit.name.trim().is_empty() || edit.email.trim().is_empty() {
            return Err(ValidationError::MissingNameOrEmail.into());
        }
        let mut participant = self
            .store
            .find_participant(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        participant.name = edit.name.trim().to_string();
        participant.email = edit.email.trim().to_string();
        participant.status = edit.status;
        participant.notes = edit.notes;
        if !participant.is_attending() {
            participant.clear_attendance_details();
        }
        Ok(self.store.update_participant(&participant).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AdminError> {
        match self.store.delete_participant(id).await {
            Ok(()) => {
                info!(id, "participant deleted");
                Ok(())
            }
            Err(err) => {
                error!(id, %err, "delete failed");
                Err(err.into())
            }
        }
    }

    pub async fn export(&self) -> Result<String, AdminError> {
        let participants = self.store.list_participants().await?;
        Ok(csv::export(&participants, &self.origin))
    }

    pub async fn config(&self) -> Result<EventConfig, AdminError> {
        Ok(self.store.load_config().await?)
    }

    pub async fn save_config(&self, config: &EventConfig) -> Result<(), AdminError> {
        self.store.save_config(config).await?;
        info!("event config saved");
        Ok(())
    }

    /// Templates, seeding the defaults first when the store has none.
    pub async fn templates(&self) -> Result<Vec<EmailTemplate>, AdminError> {
        let templates = self.store.list_templates().await?;
        if !templates.is_empty() {
            return Ok(templates);
        }
        let defaults = default_templates();
        self.store.seed_templates(&defaults).await?;
        info!(count = defaults.len(), "seeded default templates");
        Ok(self.store.list_templates().await?)
    }

    pub async fn save_template(&self, template: &EmailTemplate) -> Result<(), AdminError> {
        self.store.save_template(template).await?;
        info!(id = %template.id, "template saved");
        Ok(())
    }

    async fn resolve(&self, composition: &Composition) -> Result<(String, String, String), AdminError> {
        match composition {
            Composition::Template(id) => {
                let template = self
                    .templates()
                    .await?
                    .into_iter()
                    .find(|t| &t.id == id)
                    .ok_or_else(|| ValidationError::UnknownTemplate(id.clone()))?;
                Ok((template.name, template.subject, template.body))
            }
            Composition::Custom { subject, body } => Ok((
                CUSTOM_MESSAGE_LABEL.to_string(),
                subject.clone(),
                body.clone(),
            )),
        }
    }

    /// Renders against the first participant, or the sample guest.
    pub async fn preview(&self, subject: &str, body: &str) -> Result<RenderedMessage, AdminError> {
        let participants = self.store.list_participants().await?;
        let config = self.store.load_config().await?;
        let sample = participants.first().cloned().unwrap_or_else(sample_participant);
        Ok(render_message(
            subject,
            body,
            &sample,
            &config,
            &self.origin,
            attending_count(&participants),
        ))
    }

    pub async fn prepare(
        &self,
        composition: &Composition,
        filter: &RecipientFilter,
    ) -> Result<PreparedDispatch, AdminError> {
        let (label, subject, body) = self.resolve(composition).await?;
        if body.trim().is_empty() {
            return Err(ValidationError::EmptyBody.into());
        }

        let participants = self.store.list_participants().await?;
        let recipients: Vec<Participant> = filter
            .resolve(&participants)
            .into_iter()
            .cloned()
            .collect();
        if recipients.is_empty() {
            return Err(ValidationError::NoRecipients.into());
        }

        let config = self.store.load_config().await?;
        let messages = render_batch(
            &subject,
            &body,
            &recipients,
            &config,
            &self.origin,
            attending_count(&participants),
        );
        Ok(PreparedDispatch {
            label,
            messages,
            names: recipients.into_iter().map(|p| p.name).collect(),
        })
    }

    /// Hands the batch to the mail function and records exactly one log
    /// entry, whatever the function reports.
    pub async fn dispatch(&self, confirmed: ConfirmedDispatch) -> Result<EmailLog, AdminError> {
        let ConfirmedDispatch(prepared) = confirmed;

        let status = match self.mail.send_batch(&prepared.messages).await {
            Ok(outcome) if outcome.success => LogStatus::Sent,
            Ok(outcome) => {
                warn!(error = ?outcome.error, "mail function reported failure");
                LogStatus::Failed
            }
            Err(err) => {
                error!(%err, "mail function unreachable");
                LogStatus::Failed
            }
        };

        let names: Vec<&str> = prepared.names.iter().map(String::as_str).collect();
        let log = EmailLog::for_batch(&prepared.label, &names, status);
        self.store.append_log(&log).await?;
        info!(
            template = %log.template_name,
            recipients = log.recipient_count,
            status = %log.status,
            "email batch logged"
        );
        Ok(log)
    }

    pub async fn logs(&self) -> Result<Vec<EmailLog>, AdminError> {
        Ok(self.store.list_logs().await?)
    }
}
