//! Conversion between domain shapes and flat store rows.
//!
//! Readers never fail on shape drift. A missing or malformed column is
//! replaced by its default and the column name is reported through
//! [`Decoded::Defaulted`]; only rows without an identity are rejected.

pub mod config;
pub mod email;
pub mod participant;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{table} row has an empty id")]
    MissingId { table: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    Clean(T),
    Defaulted {
        value: T,
        fields: Vec<&'static str>,
    },
}

impl<T> Decoded<T> {
    pub fn value(&self) -> &T {
        match self {
            Decoded::Clean(value) | Decoded::Defaulted { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Decoded::Clean(value) | Decoded::Defaulted { value, .. } => value,
        }
    }

    pub fn defaulted_fields(&self) -> &[&'static str] {
        match self {
            Decoded::Clean(_) => &[],
            Decoded::Defaulted { fields, .. } => fields,
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Decoded::Clean(_))
    }

    /// Unwraps the value, logging any backfilled columns.
    pub fn logged(self, table: &'static str, id: &str) -> T {
        if let Decoded::Defaulted { fields, .. } = &self {
            tracing::warn!(table, id, ?fields, "row decoded with defaults");
        }
        self.into_value()
    }
}

/// Collects the names of columns that had to be defaulted while decoding.
#[derive(Debug, Default)]
pub(crate) struct Backfill {
    fields: Vec<&'static str>,
}

impl Backfill {
    pub(crate) fn mark(&mut self, field: &'static str) {
        if !self.fields.contains(&field) {
            self.fields.push(field);
        }
    }

    pub(crate) fn or_else<T>(
        &mut self,
        field: &'static str,
        value: Option<T>,
        default: impl FnOnce() -> T,
    ) -> T {
        match value {
            Some(value) => value,
            None => {
                self.mark(field);
                default()
            }
        }
    }

    pub(crate) fn finish<T>(self, value: T) -> Decoded<T> {
        if self.fields.is_empty() {
            Decoded::Clean(value)
        } else {
            Decoded::Defaulted {
                value,
                fields: self.fields,
            }
        }
    }
}

pub(crate) fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub(crate) fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Decodes a list stored either as a native JSON array or as JSON text.
pub(crate) fn decode_json_list<T: DeserializeOwned>(value: &Value) -> Option<Vec<T>> {
    match value {
        Value::Array(_) => serde_json::from_value(value.clone()).ok(),
        Value::String(text) => serde_json::from_str(text).ok(),
        _ => None,
    }
}

pub(crate) fn json_list<T: serde::Serialize>(items: &[T]) -> Value {
    serde_json::to_value(items).unwrap_or_else(|_| Value::Array(Vec::new()))
}
