use serde::Serialize;

use crate::model::{DietaryTags, EventConfig, Participant};

pub const UNSORTED_CATEGORY: &str = "Sonstiges";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuffetEntry {
    pub dish: String,
    pub description: String,
    pub tags: DietaryTags,
    /// `None` when the guest chose to stay anonymous on the board.
    pub contributor: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuffetSection {
    pub category: String,
    pub entries: Vec<BuffetEntry>,
}

/// Attending guests' dishes grouped by the configured categories, in config
/// order. Dishes in unknown categories are collected under "Sonstiges".
pub fn board(participants: &[Participant], config: &EventConfig) -> Vec<BuffetSection> {
    let mut sections: Vec<BuffetSection> = config
        .buffet_config
        .iter()
        .map(|c| BuffetSection {
            category: c.name.clone(),
            entries: Vec::new(),
        })
        .collect();

    for p in participants {
        let Some(food) = p.dish() else {
            continue;
        };
        let entry = BuffetEntry {
            dish: food.name.clone(),
            description: food.description.clone(),
            tags: food.tags,
            contributor: p.show_name_in_buffet.then(|| p.name.clone()),
            avatar_url: p.show_name_in_buffet.then(|| p.avatar_url()),
        };
        let index = match sections.iter().position(|s| s.category == food.category) {
            Some(index) => index,
            None => {
                if let Some(index) = sections.iter().position(|s| s.category == UNSORTED_CATEGORY) {
                    index
                } else {
                    sections.push(BuffetSection {
                        category: UNSORTED_CATEGORY.to_string(),
                        entries: Vec::new(),
                    });
                    sections.len() - 1
                }
            }
        };
        sections[index].entries.push(entry);
    }

    sections.retain(|s| !s.entries.is_empty());
    sections
}

/// Suggestions for a category that nobody has claimed yet.
pub fn inspirations(category: &str, participants: &[Participant], config: &EventConfig) -> Vec<String> {
    let Some(category) = config.category(category).filter(|c| c.active) else {
        return Vec::new();
    };
    let claimed: Vec<String> = participants
        .iter()
        .filter_map(|p| p.dish())
        .map(|f| f.name.trim().to_lowercase())
        .collect();

    category
        .inspirations
        .iter()
        .filter(|s| !claimed.contains(&s.trim().to_lowercase()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FoodItem, RsvpStatus};

    fn bringing(name: &str, status: RsvpStatus, dish: &str, category: &str) -> Participant {
        let mut p = Participant::new(name, &format!("{}@example.com", name.to_lowercase()));
        p.status = status;
        p.food = Some(FoodItem {
            name: dish.into(),
            category: category.into(),
            ..Default::default()
        });
        p
    }

    #[test]
    fn board_groups_attending_dishes() {
        let config = EventConfig::default();
        let mut shy = bringing("Ida", RsvpStatus::Attending, "Brownies", "Dessert");
        shy.show_name_in_buffet = false;
        let guests = vec![
            bringing("Max", RsvpStatus::Attending, "Chili con Carne", "Hauptgericht"),
            shy,
            bringing("Ole", RsvpStatus::Declined, "Tiramisu", "Dessert"),
            bringing("Uwe", RsvpStatus::Attending, "Käseplatte", "Snacks"),
        ];

        let sections = board(&guests, &config);
        let names: Vec<&str> = sections.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(names, vec!["Hauptgericht", "Dessert", UNSORTED_CATEGORY]);
        assert_eq!(sections[1].entries.len(), 1);
        assert_eq!(sections[1].entries[0].contributor, None);
        assert_eq!(sections[0].entries[0].contributor.as_deref(), Some("Max"));
    }

    #[test]
    fn claimed_dishes_are_not_suggested() {
        let config = EventConfig::default();
        let guests = vec![bringing("Eva", RsvpStatus::Attending, " tiramisu ", "Dessert")];
        let ideas = inspirations("Dessert", &guests, &config);
        assert!(!ideas.iter().any(|i| i == "Tiramisu"));
        assert!(ideas.iter().any(|i| i == "Brownies"));
    }

    #[test]
    fn inactive_category_has_no_inspirations() {
        let mut config = EventConfig::default();
        config.buffet_config[3].active = false;
        assert!(inspirations("Dessert", &[], &config).is_empty());
    }
}
