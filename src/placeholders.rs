//! `{{token}}` substitution for email subjects and bodies.
//!
//! Plain substring replacement over a fixed token set. Every token resolves to
//! a readable value: missing facts fall back to a German placeholder phrase
//! instead of an empty string.

use std::collections::HashMap;

use crate::model::{EventConfig, Participant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Name,
    FullName,
    Email,
    Link,
    Date,
    Time,
    Location,
    Cost,
    Hosts,
    GuestCount,
    Food,
    PlusOne,
    SecretSantaLimit,
}

impl Token {
    pub const ALL: [Token; 13] = [
        Token::Name,
        Token::FullName,
        Token::Email,
        Token::Link,
        Token::Date,
        Token::Time,
        Token::Location,
        Token::Cost,
        Token::Hosts,
        Token::GuestCount,
        Token::Food,
        Token::PlusOne,
        Token::SecretSantaLimit,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Token::Name => "name",
            Token::FullName => "fullname",
            Token::Email => "email",
            Token::Link => "link",
            Token::Date => "date",
            Token::Time => "time",
            Token::Location => "location",
            Token::Cost => "cost",
            Token::Hosts => "hosts",
            Token::GuestCount => "guestCount",
            Token::Food => "food",
            Token::PlusOne => "plusOne",
            Token::SecretSantaLimit => "secretSantaLimit",
        }
    }

    pub fn marker(&self) -> String {
        format!("{{{{{}}}}}", self.key())
    }

    pub fn fallback(&self) -> &'static str {
        match self {
            Token::Name | Token::FullName => "liebe Gäste",
            Token::Food => "noch nichts eingetragen",
            Token::PlusOne => "keine",
            Token::GuestCount | Token::SecretSantaLimit => "0",
            _ => "noch offen",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FactSheet {
    facts: HashMap<Token, String>,
}

impl FactSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, token: Token, value: impl Into<String>) -> &mut Self {
        self.facts.insert(token, value.into());
        self
    }

    /// The fact for `token`, or its fallback when missing or blank.
    pub fn value(&self, token: Token) -> &str {
        self.facts
            .get(&token)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| token.fallback())
    }

    pub fn for_recipient(
        recipient: &Participant,
        config: &EventConfig,
        origin: &str,
        guest_count: usize,
    ) -> Self {
        let mut sheet = Self::new();
        sheet
            .set(Token::Name, recipient.first_name())
            .set(Token::FullName, recipient.name.as_str())
            .set(Token::Email, recipient.email.as_str())
            .set(Token::Link, deep_link(origin, &recipient.id))
            .set(Token::Date, config.date.as_str())
            .set(Token::Time, config.time.as_str())
            .set(Token::Location, config.location.as_str())
            .set(Token::Cost, config.cost.as_str())
            .set(Token::Hosts, config.hosts.as_str())
            .set(Token::GuestCount, guest_count.to_string())
            .set(Token::PlusOne, recipient.plus_one.as_str())
            .set(Token::SecretSantaLimit, config.secret_santa_limit.to_string());
        if let Some(food) = &recipient.food {
            sheet.set(Token::Food, food.name.as_str());
        }
        sheet
    }
}

/// `<origin>/#/p/<id>`, the guest's personal hash-routed page.
pub fn deep_link(origin: &str, participant_id: &str) -> String {
    format!("{}/#/p/{}", origin.trim_end_matches('/'), participant_id)
}

pub fn render(template: &str, facts: &FactSheet) -> String {
    Token::ALL.iter().fold(template.to_string(), |text, token| {
        text.replace(&token.marker(), facts.value(*token))
    })
}

/// Plain-text line breaks become `<br>` for the mail function.
pub fn to_html(body: &str) -> String {
    body.replace("\r\n", "\n").replace('\n', "<br>")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl RenderedMessage {
    pub fn html(&self) -> String {
        to_html(&self.body)
    }
}

pub fn render_message(
    subject: &str,
    body: &str,
    recipient: &Participant,
    config: &EventConfig,
    origin: &str,
    guest_count: usize,
) -> RenderedMessage {
    let facts = FactSheet::for_recipient(recipient, config, origin, guest_count);
    RenderedMessage {
        to: recipient.email.clone(),
        subject: render(subject, &facts),
        body: render(body, &facts),
    }
}

/// Renders one message per recipient, each with its own link.
pub fn render_batch(
    subject: &str,
    body: &str,
    recipients: &[Participant],
    config: &EventConfig,
    origin: &str,
    guest_count: usize,
) -> Vec<RenderedMessage> {
    recipients
        .iter()
        .map(|p| render_message(subject, body, p, config, origin, guest_count))
        .collect()
}
