use chrono::{DateTime, Utc};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    #[default]
    Pending,
    Attending,
    Declined,
    Maybe,
}

impl RsvpStatus {
    pub const ALL: [RsvpStatus; 4] = [
        RsvpStatus::Pending,
        RsvpStatus::Attending,
        RsvpStatus::Declined,
        RsvpStatus::Maybe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Pending => "pending",
            RsvpStatus::Attending => "attending",
            RsvpStatus::Declined => "declined",
            RsvpStatus::Maybe => "maybe",
        }
    }

    /// Label shown in the admin list and the CSV export.
    pub fn label(&self) -> &'static str {
        match self {
            RsvpStatus::Pending => "Offen",
            RsvpStatus::Attending => "Zusage",
            RsvpStatus::Declined => "Absage",
            RsvpStatus::Maybe => "Vielleicht",
        }
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RsvpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(RsvpStatus::Pending),
            "attending" => Ok(RsvpStatus::Attending),
            "declined" => Ok(RsvpStatus::Declined),
            "maybe" => Ok(RsvpStatus::Maybe),
            other => Err(format!("unknown RSVP status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarStyle {
    Adventurer,
    #[default]
    Micah,
    Notionists,
    Avataaars,
    Bottts,
    Shapes,
}

impl AvatarStyle {
    pub const ALL: [AvatarStyle; 6] = [
        AvatarStyle::Adventurer,
        AvatarStyle::Micah,
        AvatarStyle::Notionists,
        AvatarStyle::Avataaars,
        AvatarStyle::Bottts,
        AvatarStyle::Shapes,
    ];

    /// Styles handed out at random to newly created guests.
    pub const PALETTE: [AvatarStyle; 4] = [
        AvatarStyle::Adventurer,
        AvatarStyle::Micah,
        AvatarStyle::Notionists,
        AvatarStyle::Bottts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AvatarStyle::Adventurer => "adventurer",
            AvatarStyle::Micah => "micah",
            AvatarStyle::Notionists => "notionists",
            AvatarStyle::Avataaars => "avataaars",
            AvatarStyle::Bottts => "bottts",
            AvatarStyle::Shapes => "shapes",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AvatarStyle::Adventurer => "Abenteurer",
            AvatarStyle::Micah => "Künstlerisch",
            AvatarStyle::Notionists => "Skizze",
            AvatarStyle::Avataaars => "Comic",
            AvatarStyle::Bottts => "Roboter",
            AvatarStyle::Shapes => "Abstrakt",
        }
    }

    pub fn random() -> Self {
        let idx = rand::thread_rng().gen_range(0..Self::PALETTE.len());
        Self::PALETTE[idx]
    }
}

impl FromStr for AvatarStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AvatarStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == s.trim())
            .ok_or_else(|| format!("unknown avatar style '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DietaryTags {
    pub is_vegan: bool,
    pub is_gluten_free: bool,
    pub is_lactose_free: bool,
    pub contains_alcohol: bool,
    pub contains_nuts: bool,
}

/// The dish a guest brings to the buffet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub category: String,
    pub description: String,
    #[serde(flatten)]
    pub tags: DietaryTags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: RsvpStatus,
    pub avatar_style: AvatarStyle,
    pub avatar_seed: String,
    /// Base64 PNG from the avatar generator, stored verbatim.
    pub avatar_image: Option<String>,
    pub plus_one: String,
    pub plus_one_allergies: String,
    /// Only meaningful while `status` is attending.
    pub food: Option<FoodItem>,
    pub show_name_in_buffet: bool,
    pub allergies: String,
    pub is_secret_santa: bool,
    pub wants_invoice: bool,
    pub contribution: String,
    pub notes: String,
    pub last_updated: DateTime<Utc>,
}

impl Participant {
    /// A fresh invitee: random id, random avatar style, status pending.
    pub fn new(name: &str, email: &str) -> Self {
        let name = name.trim();
        Self {
            id: random_id(),
            name: name.to_string(),
            email: email.trim().to_string(),
            status: RsvpStatus::Pending,
            avatar_style: AvatarStyle::random(),
            avatar_seed: name.to_string(),
            avatar_image: None,
            plus_one: String::new(),
            plus_one_allergies: String::new(),
            food: None,
            show_name_in_buffet: true,
            allergies: String::new(),
            is_secret_santa: false,
            wants_invoice: false,
            contribution: String::new(),
            notes: String::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn first_name(&self) -> &str {
        self.name.split(' ').next().unwrap_or_default()
    }

    pub fn is_attending(&self) -> bool {
        self.status == RsvpStatus::Attending
    }

    pub fn has_plus_one(&self) -> bool {
        !self.plus_one.trim().is_empty()
    }

    /// Drops everything that only applies to attending guests: dish,
    /// plus-one, secret santa, invoice and contribution.
    pub fn clear_attendance_details(&mut self) {
        self.food = None;
        self.plus_one.clear();
        self.plus_one_allergies.clear();
        self.show_name_in_buffet = true;
        self.is_secret_santa = false;
        self.wants_invoice = false;
        self.contribution.clear();
    }

    /// Dish name if the guest is attending and has entered one.
    pub fn dish(&self) -> Option<&FoodItem> {
        if !self.is_attending() {
            return None;
        }
        self.food.as_ref().filter(|f| !f.name.trim().is_empty())
    }

    pub fn avatar_url(&self) -> String {
        match &self.avatar_image {
            Some(image) if !image.is_empty() => format!("data:image/png;base64,{image}"),
            _ => format!(
                "https://api.dicebear.com/9.x/{}/svg?seed={}&backgroundColor=transparent",
                self.avatar_style.as_str(),
                utf8_percent_encode(&self.avatar_seed, NON_ALPHANUMERIC)
            ),
        }
    }
}

fn random_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect()
}
