use std::fmt;
use std::str::FromStr;

use crate::model::{Participant, RsvpStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientFilter {
    All,
    Attending,
    Pending,
    Declined,
    Single(String),
}

impl RecipientFilter {
    pub fn resolve<'a>(&self, participants: &'a [Participant]) -> Vec<&'a Participant> {
        participants
            .iter()
            .filter(|p| match self {
                RecipientFilter::All => true,
                RecipientFilter::Attending => p.status == RsvpStatus::Attending,
                RecipientFilter::Pending => p.status == RsvpStatus::Pending,
                RecipientFilter::Declined => p.status == RsvpStatus::Declined,
                RecipientFilter::Single(id) => &p.id == id,
            })
            .collect()
    }

    /// Builds a filter from the form's `filter` select and optional single id.
    pub fn from_form(filter: &str, single_id: Option<&str>) -> Option<Self> {
        match filter {
            "single" => single_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| RecipientFilter::Single(id.to_string())),
            other => other.parse().ok(),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            RecipientFilter::All => "all",
            RecipientFilter::Attending => "attending",
            RecipientFilter::Pending => "pending",
            RecipientFilter::Declined => "declined",
            RecipientFilter::Single(_) => "single",
        }
    }
}

impl fmt::Display for RecipientFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipientFilter::Single(id) => write!(f, "single:{id}"),
            other => f.write_str(other.key()),
        }
    }
}

impl FromStr for RecipientFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(RecipientFilter::All),
            "attending" => Ok(RecipientFilter::Attending),
            "pending" => Ok(RecipientFilter::Pending),
            "declined" => Ok(RecipientFilter::Declined),
            other => match other.strip_prefix("single:") {
                Some(id) if !id.is_empty() => Ok(RecipientFilter::Single(id.to_string())),
                _ => Err(format!("unknown recipient filter '{other}'")),
            },
        }
    }
}
