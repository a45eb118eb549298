use chrono::{DateTime, Utc};

use super::{Backfill, DecodeError, Decoded, non_empty};
use crate::entities::participant;
use crate::model::{AvatarStyle, DietaryTags, FoodItem, Participant, RsvpStatus};

pub fn to_row(p: &Participant) -> participant::Model {
    let food = p.food.as_ref();
    participant::Model {
        id: p.id.clone(),
        name: p.name.clone(),
        email: p.email.clone(),
        status: p.status.as_str().to_string(),
        avatar_style: Some(p.avatar_style.as_str().to_string()),
        avatar_seed: Some(p.avatar_seed.clone()),
        avatar_image: p.avatar_image.as_deref().and_then(non_empty),
        plus_one: non_empty(&p.plus_one),
        plus_one_allergies: non_empty(&p.plus_one_allergies),
        food_name: food.map(|f| f.name.clone()),
        food_category: food.map(|f| f.category.clone()),
        food_description: food.and_then(|f| non_empty(&f.description)),
        food_is_vegan: food.map(|f| f.tags.is_vegan),
        food_is_gluten_free: food.map(|f| f.tags.is_gluten_free),
        food_is_lactose_free: food.map(|f| f.tags.is_lactose_free),
        food_contains_alcohol: food.map(|f| f.tags.contains_alcohol),
        food_contains_nuts: food.map(|f| f.tags.contains_nuts),
        show_name_in_buffet: Some(p.show_name_in_buffet),
        allergies: non_empty(&p.allergies),
        is_secret_santa: Some(p.is_secret_santa),
        wants_invoice: Some(p.wants_invoice),
        contribution: non_empty(&p.contribution),
        notes: non_empty(&p.notes),
        last_updated: Some(p.last_updated),
    }
}

pub fn from_row(row: participant::Model) -> Result<Decoded<Participant>, DecodeError> {
    if row.id.trim().is_empty() {
        return Err(DecodeError::MissingId {
            table: "participants",
        });
    }

    let mut backfill = Backfill::default();

    let status = backfill.or_else("status", row.status.parse::<RsvpStatus>().ok(), || {
        RsvpStatus::Pending
    });
    let avatar_style = backfill.or_else(
        "avatar_style",
        row.avatar_style.as_deref().and_then(|s| s.parse::<AvatarStyle>().ok()),
        || AvatarStyle::Micah,
    );
    let avatar_seed = backfill.or_else(
        "avatar_seed",
        row.avatar_seed.filter(|s| !s.trim().is_empty()),
        || row.name.clone(),
    );
    let last_updated = backfill.or_else("last_updated", row.last_updated, DateTime::<Utc>::default);

    let food = row
        .food_name
        .filter(|name| !name.trim().is_empty())
        .map(|name| FoodItem {
            name,
            category: row.food_category.unwrap_or_default(),
            description: row.food_description.unwrap_or_default(),
            tags: DietaryTags {
                is_vegan: row.food_is_vegan.unwrap_or(false),
                is_gluten_free: row.food_is_gluten_free.unwrap_or(false),
                is_lactose_free: row.food_is_lactose_free.unwrap_or(false),
                contains_alcohol: row.food_contains_alcohol.unwrap_or(false),
                contains_nuts: row.food_contains_nuts.unwrap_or(false),
            },
        });

    let participant = Participant {
        id: row.id,
        name: row.name,
        email: row.email,
        status,
        avatar_style,
        avatar_seed,
        avatar_image: row.avatar_image.filter(|image| !image.is_empty()),
        plus_one: row.plus_one.unwrap_or_default(),
        plus_one_allergies: row.plus_one_allergies.unwrap_or_default(),
        food,
        show_name_in_buffet: row.show_name_in_buffet.unwrap_or(true),
        allergies: row.allergies.unwrap_or_default(),
        is_secret_santa: row.is_secret_santa.unwrap_or(false),
        wants_invoice: row.wants_invoice.unwrap_or(false),
        contribution: row.contribution.unwrap_or_default(),
        notes: row.notes.unwrap_or_default(),
        last_updated,
    };

    Ok(backfill.finish(participant))
}
