use chrono::NaiveDate;
use serde_json::Value;

use super::{Backfill, Decoded, decode_json_list, json_list, split_list};
use crate::entities::event_config::{self, SINGLETON_ID};
use crate::model::{
    Activity, BuffetCategory, EventConfig, ProgramItem, default_buffet,
    default_contribution_suggestions, default_dietary_options,
};

const DEADLINE_FORMAT: &str = "%Y-%m-%d";

pub fn to_row(config: &EventConfig) -> event_config::Model {
    event_config::Model {
        id: SINGLETON_ID,
        title: config.title.clone(),
        subtitle: Some(config.subtitle.clone()),
        date: Some(config.date.clone()),
        time: Some(config.time.clone()),
        location: Some(config.location.clone()),
        max_guests: Some(i32::try_from(config.max_guests).unwrap_or(i32::MAX)),
        allow_plus_one: Some(config.allow_plus_one),
        secret_santa_limit: Some(i32::try_from(config.secret_santa_limit).unwrap_or(i32::MAX)),
        dietary_options: Some(json_list(&config.dietary_options)),
        contribution_suggestions: Some(json_list(&config.contribution_suggestions)),
        cost: Some(config.cost.clone()),
        hosts: Some(config.hosts.clone()),
        program: Some(json_list(&config.program)),
        buffet_config: Some(json_list(&config.buffet_config)),
        activities: Some(json_list(&config.activities)),
        contact_email: Some(config.contact_email.clone()),
        // An empty string records "no deadline" so it survives a reload.
        rsvp_deadline: Some(
            config
                .rsvp_deadline
                .map(|d| d.format(DEADLINE_FORMAT).to_string())
                .unwrap_or_default(),
        ),
    }
}

/// Decodes the singleton row. A missing row yields the built-in defaults.
pub fn from_row(row: Option<event_config::Model>) -> Decoded<EventConfig> {
    let defaults = EventConfig::default();
    let Some(row) = row else {
        return Decoded::Defaulted {
            value: defaults,
            fields: vec!["row"],
        };
    };

    let mut backfill = Backfill::default();

    let title = if row.title.trim().is_empty() {
        backfill.mark("title");
        defaults.title.clone()
    } else {
        row.title
    };

    let max_guests = backfill.or_else(
        "max_guests",
        row.max_guests.and_then(|n| u32::try_from(n).ok()),
        || defaults.max_guests,
    );
    let secret_santa_limit = backfill.or_else(
        "secret_santa_limit",
        row.secret_santa_limit.and_then(|n| u32::try_from(n).ok()),
        || defaults.secret_santa_limit,
    );

    let dietary_options = backfill.or_else(
        "dietary_options",
        row.dietary_options.as_ref().and_then(decode_string_list),
        default_dietary_options,
    );
    let contribution_suggestions = backfill.or_else(
        "contribution_suggestions",
        row.contribution_suggestions.as_ref().and_then(decode_string_list),
        default_contribution_suggestions,
    );

    let program = match decode_program(row.program.as_ref()) {
        ProgramShape::Structured(items) => items,
        ProgramShape::Legacy(items) => {
            backfill.mark("program");
            items
        }
        ProgramShape::Unreadable => {
            backfill.mark("program");
            Vec::new()
        }
    };

    let buffet_config = match row.buffet_config.as_ref() {
        None | Some(Value::Null) => {
            backfill.mark("buffet_config");
            default_buffet()
        }
        Some(value) => backfill.or_else(
            "buffet_config",
            decode_json_list::<BuffetCategory>(value),
            Vec::new,
        ),
    };

    let activities = match row.activities.as_ref() {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => {
            backfill.or_else("activities", decode_json_list::<Activity>(value), Vec::new)
        }
    };

    let rsvp_deadline = match row.rsvp_deadline.as_deref().map(str::trim) {
        Some("") => None,
        Some(text) => match NaiveDate::parse_from_str(text, DEADLINE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                backfill.mark("rsvp_deadline");
                defaults.rsvp_deadline
            }
        },
        None => {
            backfill.mark("rsvp_deadline");
            defaults.rsvp_deadline
        }
    };

    let config = EventConfig {
        title,
        subtitle: backfill.or_else("subtitle", row.subtitle, || defaults.subtitle.clone()),
        date: backfill.or_else("date", row.date, || defaults.date.clone()),
        time: backfill.or_else("time", row.time, || defaults.time.clone()),
        location: backfill.or_else("location", row.location, || defaults.location.clone()),
        max_guests,
        allow_plus_one: backfill.or_else("allow_plus_one", row.allow_plus_one, || {
            defaults.allow_plus_one
        }),
        secret_santa_limit,
        dietary_options,
        contribution_suggestions,
        cost: backfill.or_else("cost", row.cost, || defaults.cost.clone()),
        hosts: backfill.or_else("hosts", row.hosts, || defaults.hosts.clone()),
        program,
        buffet_config,
        activities,
        contact_email: backfill.or_else("contact_email", row.contact_email, || {
            defaults.contact_email.clone()
        }),
        rsvp_deadline,
    };

    backfill.finish(config)
}

#[derive(Debug, PartialEq)]
pub(crate) enum ProgramShape {
    Structured(Vec<ProgramItem>),
    Legacy(Vec<ProgramItem>),
    Unreadable,
}

/// Accepts a native array, JSON text, or the old comma-separated title list.
pub(crate) fn decode_program(value: Option<&Value>) -> ProgramShape {
    match value {
        None | Some(Value::Null) => ProgramShape::Unreadable,
        Some(Value::Array(_)) => match value.and_then(decode_json_list) {
            Some(items) => ProgramShape::Structured(items),
            None => ProgramShape::Unreadable,
        },
        Some(Value::String(text)) => {
            if let Ok(items) = serde_json::from_str::<Vec<ProgramItem>>(text) {
                return ProgramShape::Structured(items);
            }
            let titles = split_list(text);
            if titles.is_empty() {
                return ProgramShape::Unreadable;
            }
            ProgramShape::Legacy(
                titles
                    .iter()
                    .enumerate()
                    .map(|(i, title)| ProgramItem::from_legacy(i, title))
                    .collect(),
            )
        }
        Some(_) => ProgramShape::Unreadable,
    }
}

fn decode_string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(text) => {
            serde_json::from_str::<Vec<String>>(text).ok().or_else(|| Some(split_list(text)))
        }
        other => decode_json_list(other),
    }
}
