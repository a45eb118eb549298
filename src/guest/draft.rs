use serde::Serialize;

use crate::allergies::{self, AllergySplit};
use crate::model::{AvatarStyle, EventConfig, FoodItem, Participant, RsvpStatus};

/// The guest's editable form state, independent of what was last persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuestDraft {
    pub status: RsvpStatus,
    pub avatar_style: AvatarStyle,
    pub avatar_seed: String,
    pub avatar_image: String,
    pub has_plus_one: bool,
    pub plus_one: String,
    pub plus_one_allergies: AllergySplit,
    pub food: FoodItem,
    pub show_name_in_buffet: bool,
    pub allergies: AllergySplit,
    pub is_secret_santa: bool,
    pub wants_invoice: bool,
    pub contribution: String,
    pub notes: String,
}

impl GuestDraft {
    pub fn from_participant(p: &Participant, config: &EventConfig) -> Self {
        let default_category = config
            .active_categories()
            .next()
            .map(|c| c.name.clone())
            .unwrap_or_default();
        let food = p.food.clone().unwrap_or_else(|| FoodItem {
            category: default_category,
            ..Default::default()
        });

        Self {
            status: p.status,
            avatar_style: p.avatar_style,
            avatar_seed: p.avatar_seed.clone(),
            avatar_image: p.avatar_image.clone().unwrap_or_default(),
            has_plus_one: p.has_plus_one(),
            plus_one: p.plus_one.clone(),
            plus_one_allergies: allergies::parse(&p.plus_one_allergies, &config.dietary_options),
            food,
            show_name_in_buffet: p.show_name_in_buffet,
            allergies: allergies::parse(&p.allergies, &config.dietary_options),
            is_secret_santa: p.is_secret_santa,
            wants_invoice: p.wants_invoice,
            contribution: p.contribution.clone(),
            notes: p.notes.clone(),
        }
    }

    pub fn has_dish(&self) -> bool {
        !self.food.name.trim().is_empty()
    }

    /// Attending requires a dish; every other status is always savable.
    pub fn is_valid(&self) -> bool {
        self.status != RsvpStatus::Attending || self.has_dish()
    }

    /// The row this draft would persist as `target` on top of `base`.
    ///
    /// Attendance-only data (dish, plus-one, secret santa, invoice,
    /// contribution) is cleared for every other status.
    pub fn to_participant(
        &self,
        base: &Participant,
        target: RsvpStatus,
        allow_plus_one: bool,
    ) -> Participant {
        let attending = target == RsvpStatus::Attending;
        let with_plus_one = attending && allow_plus_one && self.has_plus_one;

        let food = attending.then(|| FoodItem {
            name: self.food.name.trim().to_string(),
            ..self.food.clone()
        });

        Participant {
            status: target,
            avatar_style: self.avatar_style,
            avatar_seed: self.avatar_seed.clone(),
            avatar_image: Some(self.avatar_image.clone()).filter(|i| !i.is_empty()),
            plus_one: if with_plus_one {
                self.plus_one.trim().to_string()
            } else {
                String::new()
            },
            plus_one_allergies: if with_plus_one {
                self.plus_one_allergies.build()
            } else {
                String::new()
            },
            food,
            show_name_in_buffet: !attending || self.show_name_in_buffet,
            allergies: self.allergies.build(),
            is_secret_santa: attending && self.is_secret_santa,
            wants_invoice: attending && self.wants_invoice,
            contribution: if attending {
                self.contribution.clone()
            } else {
                String::new()
            },
            notes: self.notes.clone(),
            ..base.clone()
        }
    }

    /// Whether saving this draft would write anything different from what
    /// `baseline` (the draft of the last persisted row) would.
    pub fn has_changes(
        &self,
        baseline: &GuestDraft,
        base: &Participant,
        allow_plus_one: bool,
    ) -> bool {
        self.to_participant(base, self.status, allow_plus_one)
            != baseline.to_participant(base, baseline.status, allow_plus_one)
    }

    /// Picking a preset style drops any generated image.
    pub fn choose_style(&mut self, style: AvatarStyle) {
        self.avatar_style = style;
        self.avatar_image.clear();
    }
}
