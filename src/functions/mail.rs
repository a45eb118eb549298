use serde::{Deserialize, Serialize};
use tracing::info;

use super::{FunctionError, FunctionsClient};
use crate::placeholders::RenderedMessage;

const FUNCTION: &str = "send-email";

#[derive(Debug, Serialize)]
struct OutgoingEmail<'a> {
    to: &'a str,
    subject: &'a str,
    html: String,
}

#[derive(Debug, Serialize)]
struct Batch<'a> {
    emails: Vec<OutgoingEmail<'a>>,
}

/// Aggregate result reported by the mail function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MailOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MailClient {
    functions: FunctionsClient,
}

impl MailClient {
    pub fn new(functions: FunctionsClient) -> Self {
        Self { functions }
    }

    /// Sends already rendered messages. The function does no substitution.
    pub async fn send_batch(&self, messages: &[RenderedMessage]) -> Result<MailOutcome, FunctionError> {
        let batch = Batch {
            emails: messages
                .iter()
                .map(|m| OutgoingEmail {
                    to: &m.to,
                    subject: &m.subject,
                    html: m.html(),
                })
                .collect(),
        };

        let outcome: MailOutcome = self.functions.invoke(FUNCTION, &batch).await?;
        info!(
            requested = messages.len(),
            sent = outcome.count,
            success = outcome.success,
            "mail batch handed off"
        );
        Ok(outcome)
    }
}
