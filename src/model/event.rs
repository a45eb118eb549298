use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROGRAM_ICON: &str = "sparkles";
pub const DEFAULT_PROGRAM_COLOR: &str = "text-amber-500 bg-amber-50";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub color: String,
}

impl ProgramItem {
    /// Item upgraded from a legacy comma-separated program string.
    pub fn from_legacy(position: usize, title: &str) -> Self {
        Self {
            id: (position + 1).to_string(),
            title: title.to_string(),
            description: String::new(),
            icon: DEFAULT_PROGRAM_ICON.to_string(),
            color: DEFAULT_PROGRAM_COLOR.to_string(),
        }
    }
}

/// A named buffet grouping guests assign their dish to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuffetCategory {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub inspirations: Vec<String>,
}

impl Default for BuffetCategory {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            active: true,
            inspirations: Vec::new(),
        }
    }
}

/// An interactive vote item shown to guests.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub active: bool,
    /// Ids of participants who voted for this activity.
    pub votes: Vec<String>,
}

impl Activity {
    pub fn toggle_vote(&mut self, participant_id: &str) -> bool {
        if let Some(pos) = self.votes.iter().position(|v| v == participant_id) {
            self.votes.remove(pos);
            false
        } else {
            self.votes.push(participant_id.to_string());
            true
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub max_guests: u32,
    pub allow_plus_one: bool,
    pub secret_santa_limit: u32,
    pub dietary_options: Vec<String>,
    pub contribution_suggestions: Vec<String>,
    pub cost: String,
    pub hosts: String,
    pub program: Vec<ProgramItem>,
    pub buffet_config: Vec<BuffetCategory>,
    pub activities: Vec<Activity>,
    pub contact_email: String,
    pub rsvp_deadline: Option<NaiveDate>,
}

impl EventConfig {
    pub fn active_categories(&self) -> impl Iterator<Item = &BuffetCategory> {
        self.buffet_config.iter().filter(|c| c.active)
    }

    pub fn category(&self, name: &str) -> Option<&BuffetCategory> {
        self.buffet_config.iter().find(|c| c.name == name)
    }

    pub fn program_titles(&self) -> String {
        self.program
            .iter()
            .map(|item| item.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn deadline_passed(&self, today: NaiveDate) -> bool {
        self.rsvp_deadline.is_some_and(|deadline| today > deadline)
    }
}

const DEFAULT_PROGRAM: &[(&str, &str, &str, &str)] = &[
    (
        "Glühwein-Empfang",
        "Wir starten gemütlich am Feuer mit heißen Getränken.",
        "wine",
        "text-red-500 bg-red-50",
    ),
    (
        "Gemeinsames Buffet",
        "Jeder steuert etwas bei – von Herzhaft bis Süß.",
        "utensils",
        "text-amber-500 bg-amber-50",
    ),
    (
        "Fackelwanderung",
        "Ein stimmungsvoller Spaziergang durch die Winternacht.",
        "flame",
        "text-orange-500 bg-orange-50",
    ),
    (
        "Ugly Christmas Sweater Wettbewerb",
        "Zieh dein schrägstes Teil an und gewinne Ruhm & Ehre!",
        "snowflake",
        "text-blue-500 bg-blue-50",
    ),
    (
        "Musik & Feuerschale",
        "Ausklang mit guten Gesprächen und Knistern.",
        "music",
        "text-purple-500 bg-purple-50",
    ),
];

const DEFAULT_BUFFET: &[(&str, &str, &[&str])] = &[
    (
        "appetizer",
        "Vorspeise & Salat",
        &[
            "Tomate-Mozzarella Spieße",
            "Gemüsesticks mit Dip",
            "Blätterteigschnecken",
            "Bruschetta",
            "Gefüllte Eier",
            "Antipasti-Platte",
            "Käsewürfel & Trauben",
        ],
    ),
    (
        "main",
        "Hauptgericht",
        &[
            "Chili con Carne",
            "Linseneintopf",
            "Party-Frikadellen",
            "Gemüselasagne",
            "Herzhafte Quiche",
            "Currywurst-Topf",
            "Falafel-Bällchen",
        ],
    ),
    (
        "side",
        "Beilage",
        &[
            "Kartoffelsalat",
            "Nudelsalat",
            "Frisches Baguette & Kräuterbutter",
            "Couscous-Salat",
            "Rosmarinkartoffeln",
            "Focaccia",
            "Krautsalat",
        ],
    ),
    (
        "dessert",
        "Dessert",
        &[
            "Tiramisu",
            "Mousse au Chocolat",
            "Obstsalat",
            "Brownies",
            "Weihnachtsplätzchen",
            "Panna Cotta",
            "Zimt-Schnecken",
            "Lebkuchen",
        ],
    ),
    (
        "drink",
        "Getränk",
        &[
            "Kiste Bier",
            "Flasche Rotwein",
            "Flasche Weißwein",
            "Alkoholfreier Punsch",
            "Cola/Limo Kasten",
            "Sekt zum Anstoßen",
            "Selbstgemachter Eistee",
        ],
    ),
];

pub fn default_program() -> Vec<ProgramItem> {
    DEFAULT_PROGRAM
        .iter()
        .enumerate()
        .map(|(i, (title, description, icon, color))| ProgramItem {
            id: (i + 1).to_string(),
            title: title.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
        })
        .collect()
}

pub fn default_buffet() -> Vec<BuffetCategory> {
    DEFAULT_BUFFET
        .iter()
        .map(|(id, name, inspirations)| BuffetCategory {
            id: id.to_string(),
            name: name.to_string(),
            active: true,
            inspirations: inspirations.iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}

pub fn default_dietary_options() -> Vec<String> {
    [
        "Vegetarisch",
        "Vegan",
        "Glutenfrei",
        "Laktosefrei",
        "Nussallergie",
        "Alkoholfrei",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn default_contribution_suggestions() -> Vec<String> {
    ["Fotografieren", "Musik", "Deko", "Aufbau", "Abbau"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            title: "Selbst & Selig".into(),
            subtitle: "Die Weihnachtsfeier 2025".into(),
            date: "18. Dezember 2025".into(),
            time: "17:00 Uhr".into(),
            location: "Judiths Gasthof, Weissenstadt".into(),
            max_guests: 30,
            allow_plus_one: false,
            secret_santa_limit: 15,
            dietary_options: default_dietary_options(),
            contribution_suggestions: default_contribution_suggestions(),
            cost: "25 € pro Person".into(),
            hosts: "Holger, Daniela, Finn und Judith".into(),
            program: default_program(),
            buffet_config: default_buffet(),
            activities: Vec::new(),
            contact_email: "info@selbst-und-selig.de".into(),
            rsvp_deadline: NaiveDate::from_ymd_opt(2025, 12, 10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_is_exclusive() {
        let config = EventConfig::default();
        let deadline = NaiveDate::from_ymd_opt(2025, 12, 10).unwrap();
        assert!(!config.deadline_passed(deadline));
        assert!(config.deadline_passed(deadline.succ_opt().unwrap()));
    }

    #[test]
    fn no_deadline_never_passes() {
        let config = EventConfig {
            rsvp_deadline: None,
            ..Default::default()
        };
        assert!(!config.deadline_passed(NaiveDate::MAX));
    }

    #[test]
    fn activity_vote_toggles() {
        let mut activity = Activity::default();
        assert!(activity.toggle_vote("p1"));
        assert_eq!(activity.votes, vec!["p1".to_string()]);
        assert!(!activity.toggle_vote("p1"));
        assert!(activity.votes.is_empty());
    }
}
