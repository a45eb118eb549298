//! Splits an allergy free-text list into known dietary options and leftover
//! custom text, and joins the two back together on save. Used the same way for
//! a guest and for their plus-one.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllergySplit {
    /// Entries that exactly match a known option, in the order they appeared.
    pub selection: Vec<String>,
    /// Everything else, rejoined with `, `.
    pub custom: String,
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|s| !s.is_empty())
}

pub fn parse(text: &str, known: &[String]) -> AllergySplit {
    let (selection, custom): (Vec<&str>, Vec<&str>) =
        tokens(text).partition(|token| known.iter().any(|option| option.as_str() == *token));

    AllergySplit {
        selection: selection.into_iter().map(String::from).collect(),
        custom: custom.join(", "),
    }
}

/// Selection first, then custom entries not already selected (exact match).
pub fn build(selection: &[String], custom: &str) -> String {
    let mut parts: Vec<&str> = selection.iter().map(String::as_str).collect();
    parts.extend(tokens(custom).filter(|token| !selection.iter().any(|s| s.as_str() == *token)));
    parts.join(", ")
}

/// Adds the option when absent and removes it when present.
pub fn toggle(selection: &mut Vec<String>, option: &str) {
    if let Some(pos) = selection.iter().position(|s| s.as_str() == option) {
        selection.remove(pos);
    } else {
        selection.push(option.to_string());
    }
}

impl AllergySplit {
    pub fn build(&self) -> String {
        build(&self.selection, &self.custom)
    }
}
