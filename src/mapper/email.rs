use super::{Backfill, DecodeError, Decoded, non_empty};
use crate::entities::{email_log, email_template};
use crate::model::{EmailLog, EmailTemplate, EmailTrigger, LogStatus};

pub fn template_to_row(template: &EmailTemplate) -> email_template::Model {
    email_template::Model {
        id: template.id.clone(),
        name: template.name.clone(),
        subject: template.subject.clone(),
        body: template.body.clone(),
        trigger: template.trigger.as_str().to_string(),
        description: non_empty(&template.description),
    }
}

pub fn template_from_row(row: email_template::Model) -> Result<Decoded<EmailTemplate>, DecodeError> {
    if row.id.trim().is_empty() {
        return Err(DecodeError::MissingId {
            table: "email_templates",
        });
    }

    let mut backfill = Backfill::default();
    let trigger = backfill.or_else("trigger", row.trigger.parse::<EmailTrigger>().ok(), || {
        EmailTrigger::Manual
    });

    Ok(backfill.finish(EmailTemplate {
        id: row.id,
        name: row.name,
        subject: row.subject,
        body: row.body,
        trigger,
        description: row.description.unwrap_or_default(),
    }))
}

pub fn log_to_row(log: &EmailLog) -> email_log::Model {
    email_log::Model {
        id: log.id.clone(),
        date: log.date,
        template_name: log.template_name.clone(),
        recipient_count: i32::try_from(log.recipient_count).unwrap_or(i32::MAX),
        recipients_preview: non_empty(&log.recipients_preview),
        status: log.status.as_str().to_string(),
    }
}

pub fn log_from_row(row: email_log::Model) -> Result<Decoded<EmailLog>, DecodeError> {
    if row.id.trim().is_empty() {
        return Err(DecodeError::MissingId { table: "email_logs" });
    }

    let mut backfill = Backfill::default();
    let status = backfill.or_else(
        "status",
        match row.status.trim() {
            "sent" => Some(LogStatus::Sent),
            "failed" => Some(LogStatus::Failed),
            _ => None,
        },
        || LogStatus::Failed,
    );
    let recipient_count = backfill.or_else(
        "recipient_count",
        u32::try_from(row.recipient_count).ok(),
        || 0,
    );

    Ok(backfill.finish(EmailLog {
        id: row.id,
        date: row.date,
        template_name: row.template_name,
        recipient_count,
        recipients_preview: row.recipients_preview.unwrap_or_default(),
        status,
    }))
}

/// Newest first, as the admin log view lists them.
pub fn sort_logs(logs: &mut [EmailLog]) {
    logs.sort_by(|a, b| b.date.cmp(&a.date));
}
