use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::{FunctionError, FunctionsClient};
use crate::model::{EventConfig, Participant};

const FUNCTION: &str = "gemini-ai";

pub const GREETING: &str =
    "Ho ho ho! 🎅 Ich bin Rudolph. Wie kann ich dir bei der Weihnachtsfeier helfen?";
pub const EMPTY_ANSWER: &str = "Mein Rentier-Navi spinnt.";
pub const TRANSPORT_FAILURE: &str = "Gerade zu viel Glühwein...";
pub const AVATAR_FAILURE: &str = "Ups, das hat leider nicht geklappt. Versuch es später nochmal.";

#[derive(Debug, Serialize)]
struct Invocation<P> {
    action: &'static str,
    payload: P,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatPayload<'a> {
    message: &'a str,
    system_instruction: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatAnswer {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvatarAnswer {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AiClient {
    functions: FunctionsClient,
}

impl AiClient {
    pub fn new(functions: FunctionsClient) -> Self {
        Self { functions }
    }

    /// Raw chat call. An empty answer comes back as an empty string.
    pub async fn chat(&self, message: &str, system_instruction: &str) -> Result<String, FunctionError> {
        let answer: ChatAnswer = self
            .functions
            .invoke(
                FUNCTION,
                &Invocation {
                    action: "chat",
                    payload: ChatPayload {
                        message,
                        system_instruction,
                    },
                },
            )
            .await?;
        Ok(answer.text.unwrap_or_default())
    }

    /// Chat with the assistant's fallback lines applied. Never fails.
    pub async fn reply(&self, message: &str, system_instruction: &str) -> String {
        match self.chat(message, system_instruction).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => EMPTY_ANSWER.to_string(),
            Err(err) => {
                error!(%err, "chat function failed");
                TRANSPORT_FAILURE.to_string()
            }
        }
    }

    /// Base64 PNG for the given description.
    pub async fn generate_avatar(&self, prompt: &str) -> Result<String, FunctionError> {
        let answer: AvatarAnswer = self
            .functions
            .invoke(
                FUNCTION,
                &Invocation {
                    action: "generate-avatar",
                    payload: json!({ "prompt": prompt }),
                },
            )
            .await?;

        match answer.image {
            Some(image) if answer.success && !image.is_empty() => Ok(image),
            _ => Err(FunctionError::NoImage),
        }
    }
}

/// Live event facts handed to the assistant with every message.
pub fn system_prompt(config: &EventConfig, participants: &[Participant]) -> String {
    let attending: Vec<&Participant> = participants.iter().filter(|p| p.is_attending()).collect();
    let buffet = attending
        .iter()
        .filter_map(|p| p.dish())
        .map(|food| format!("- {} ({})", food.name, food.category))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Du bist Rudolph, der KI-Assistent für die \"{title}\".\n\
         Fakten: Datum {date}, Ort {location}, Gäste {count}/{max}.\n\
         Buffet: {buffet}.\n\
         Programm: {program}.\n\
         Sei kurz, hilfreich und weihnachtlich.",
        title = config.title,
        date = config.date,
        location = config.location,
        count = attending.len(),
        max = config.max_guests,
        buffet = buffet,
        program = config.program_titles(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FoodItem, RsvpStatus};

    #[test]
    fn prompt_lists_attending_dishes_only() {
        let config = EventConfig::default();
        let mut anna = Participant::new("Anna", "anna@example.com");
        anna.status = RsvpStatus::Attending;
        anna.food = Some(FoodItem {
            name: "Brownies".into(),
            category: "Dessert".into(),
            ..Default::default()
        });
        let mut ben = Participant::new("Ben", "ben@example.com");
        ben.status = RsvpStatus::Declined;
        ben.food = Some(FoodItem {
            name: "Chili".into(),
            category: "Hauptgericht".into(),
            ..Default::default()
        });

        let prompt = system_prompt(&config, &[anna, ben]);
        assert!(prompt.starts_with("Du bist Rudolph, der KI-Assistent für die \"Selbst & Selig\"."));
        assert!(prompt.contains("Gäste 1/30"));
        assert!(prompt.contains("- Brownies (Dessert)"));
        assert!(!prompt.contains("Chili"));
        assert!(prompt.contains("Programm: Glühwein-Empfang, Gemeinsames Buffet"));
    }
}
