use std::cmp::Ordering;
use std::str::FromStr;

use crate::model::Participant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    Email,
    Status,
    Food,
    SecretSanta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Email => "email",
            SortKey::Status => "status",
            SortKey::Food => "food",
            SortKey::SecretSanta => "secret_santa",
        }
    }

    fn compare(&self, a: &Participant, b: &Participant) -> Ordering {
        let food = |p: &Participant| {
            p.food
                .as_ref()
                .map(|f| f.name.to_lowercase())
                .unwrap_or_default()
        };
        match self {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Email => a.email.to_lowercase().cmp(&b.email.to_lowercase()),
            SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
            SortKey::Food => food(a).cmp(&food(b)),
            SortKey::SecretSanta => a.is_secret_santa.cmp(&b.is_secret_santa),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortKey::Name),
            "email" => Ok(SortKey::Email),
            "status" => Ok(SortKey::Status),
            "food" => Ok(SortKey::Food),
            "secret_santa" => Ok(SortKey::SecretSanta),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

/// Stable, case-insensitive sort of the admin guest list.
pub fn sort_participants(participants: &mut [Participant], key: SortKey, direction: SortDirection) {
    participants.sort_by(|a, b| {
        let ordering = key.compare(a, b);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}
