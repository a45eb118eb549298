use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Informational only; nothing fires templates automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTrigger {
    #[default]
    Manual,
    AutoRegistration,
    Scheduled,
}

impl EmailTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailTrigger::Manual => "manual",
            EmailTrigger::AutoRegistration => "auto_registration",
            EmailTrigger::Scheduled => "scheduled",
        }
    }
}

impl FromStr for EmailTrigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "manual" => Ok(EmailTrigger::Manual),
            "auto_registration" => Ok(EmailTrigger::AutoRegistration),
            "scheduled" => Ok(EmailTrigger::Scheduled),
            other => Err(format!("unknown trigger '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub trigger: EmailTrigger,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Sent,
    Failed,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Sent => "sent",
            LogStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailLog {
    pub id: String,
    pub date: DateTime<Utc>,
    pub template_name: String,
    pub recipient_count: u32,
    pub recipients_preview: String,
    pub status: LogStatus,
}

impl EmailLog {
    const PREVIEW_NAMES: usize = 3;

    pub fn for_batch(template_name: &str, names: &[&str], status: LogStatus) -> Self {
        let mut preview = names
            .iter()
            .take(Self::PREVIEW_NAMES)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        if names.len() > Self::PREVIEW_NAMES {
            preview.push_str("...");
        }

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date: Utc::now(),
            template_name: template_name.to_string(),
            recipient_count: names.len() as u32,
            recipients_preview: preview,
            status,
        }
    }
}

const DEFAULT_TEMPLATES: &[(&str, &str, &str, EmailTrigger, &str, &str)] = &[
    (
        "t1_invite",
        "1. Invitation Email",
        "Einladung: Selbst & Selig Weihnachtsfeier 🎄",
        EmailTrigger::Manual,
        "Initiale Einladung mit dem persönlichen Link.",
        "Hallo {{name}},

Happy (almost) Holidays!
Mit Vergnügen schauen wir den festlichen Tagen entgegen. Weihnachtsfeiern sind eigentlich eine reine Office-Sache, aber das wollen wir ändern!

Du bist herzlich zu unserer Weihnachtsfeier für Solo-Selbstständige eingeladen.

📅 Wann: {{date}}, ab {{time}}
📍 Wo: {{location}}

Hier ist dein persönlicher Link zum Zu-/Absagen und Buffet planen:
{{link}}

Wir freuen uns auf eine entspannte Runde!
{{hosts}}",
    ),
    (
        "t2_confirm",
        "2. Registration Confirmation",
        "Bestätigung: Schön, dass du dabei bist! ✨",
        EmailTrigger::AutoRegistration,
        "Bestätigung nach Klick auf \"Ich komme\".",
        "Hallo {{name}},

Juhu! Wir freuen uns riesig, dass du am {{date}} dabei bist.

Du hast eingetragen:
Mitbringsel: {{food}}
Begleitung: {{plusOne}}

Falls du noch etwas ändern möchtest, nutze einfach deinen Link:
{{link}}

Bis bald,
{{hosts}}",
    ),
    (
        "t3_followup",
        "3. Follow-up (2 Weeks Before)",
        "Bald ist es soweit! 🎅",
        EmailTrigger::Manual,
        "Erinnerung für Unentschlossene oder allgemeines Update.",
        "Hallo {{name}},

In zwei Wochen ist es soweit! Unsere Selbst & Selig Weihnachtsfeier steht vor der Tür.

Aktueller Status:
{{guestCount}} tolle Menschen sind schon dabei!

Falls du noch nicht fest zugesagt hast oder dein Mitbringsel eintragen möchtest, hier nochmal dein Link:
{{link}}

Vorfreudige Grüße,
{{hosts}}",
    ),
    (
        "t4_reminder",
        "4. Reminder (1 Week Before)",
        "Nächste Woche: Weihnachtsfeier! 🎁",
        EmailTrigger::Manual,
        "Letzte Infos und Erinnerung an Wichtelgeschenk.",
        "Hallo {{name}},

Nur noch eine Woche! Wir treffen uns am {{date}} um {{time}} in {{location}}.

Wichtige Reminder:
1. Unkostenbeitrag: {{cost}} (bitte passend mitbringen)
2. Wichteln: Falls du mitmachst, denk an dein Geschenk (max {{secretSantaLimit}}€).
3. Buffet: Du bringst \"{{food}}\" mit. Danke!

Wir freuen uns auf dich!
{{hosts}}",
    ),
    (
        "t5_thankyou",
        "5. Thank You Email",
        "Danke für den schönen Abend! 🌟",
        EmailTrigger::Manual,
        "Nach der Veranstaltung.",
        "Hallo {{name}},

vielen Dank, dass du gestern dabei warst und den Abend so besonders gemacht hast!
Es war wunderschön, mit euch allen zu feiern.

Wir hoffen, du bist gut nach Hause gekommen und hast die Feiertage nun entspannt im Blick.

Frohe Weihnachten!
{{hosts}}",
    ),
];

/// Templates seeded into an empty store.
pub fn default_templates() -> Vec<EmailTemplate> {
    DEFAULT_TEMPLATES
        .iter()
        .map(
            |(id, name, subject, trigger, description, body)| EmailTemplate {
                id: id.to_string(),
                name: name.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
                trigger: *trigger,
                description: description.to_string(),
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_preview_truncates_after_three_names() {
        let log = EmailLog::for_batch("Invite", &["A", "B", "C", "D"], LogStatus::Sent);
        assert_eq!(log.recipient_count, 4);
        assert_eq!(log.recipients_preview, "A, B, C...");

        let log = EmailLog::for_batch("Invite", &["A", "B"], LogStatus::Failed);
        assert_eq!(log.recipients_preview, "A, B");
        assert_eq!(log.status, LogStatus::Failed);
    }

    #[test]
    fn five_default_templates() {
        let templates = default_templates();
        assert_eq!(templates.len(), 5);
        assert_eq!(templates[0].id, "t1_invite");
        assert!(templates[0].body.contains("{{link}}"));
    }
}
