//! Guest list CSV in and out.
//!
//! Import is forgiving: `;` or `,` per line, an optional header line, swapped
//! name/email columns, and quoted cells are all accepted. Export wraps every
//! cell in double quotes without escaping embedded quotes.

use crate::model::Participant;
use crate::placeholders::deep_link;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportCandidate {
    pub name: String,
    pub email: String,
}

fn strip_quotes(cell: &str) -> &str {
    let cell = cell.strip_prefix(['"', '\'']).unwrap_or(cell);
    cell.strip_suffix(['"', '\'']).unwrap_or(cell)
}

fn looks_like_header(name: &str, email: &str) -> bool {
    name.to_lowercase().contains("name") || email.to_lowercase().contains("email")
}

/// Turns uploaded text into name/email pairs. Lines without an `@` in the
/// email cell are dropped.
pub fn parse_import(text: &str) -> Vec<ImportCandidate> {
    let mut candidates = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let separator = if line.contains(';') { ';' } else { ',' };
        let mut cells = line.split(separator);
        let (Some(first), Some(second)) = (cells.next(), cells.next()) else {
            continue;
        };
        let (mut name, mut email) = (first.trim(), second.trim());

        if index == 0 && looks_like_header(name, email) {
            continue;
        }
        if name.contains('@') && !email.contains('@') {
            std::mem::swap(&mut name, &mut email);
        }
        let name = strip_quotes(name);
        let email = strip_quotes(email);

        if !name.is_empty() && !email.is_empty() && email.contains('@') {
            candidates.push(ImportCandidate {
                name: name.to_string(),
                email: email.to_string(),
            });
        }
    }

    candidates
}

/// Drops candidates whose email (case-insensitive) is already taken, either
/// by an existing participant or by an earlier candidate.
pub fn dedupe(candidates: Vec<ImportCandidate>, existing: &[Participant]) -> Vec<ImportCandidate> {
    let mut seen: Vec<String> = existing.iter().map(|p| p.email.to_lowercase()).collect();
    candidates
        .into_iter()
        .filter(|c| {
            let key = c.email.to_lowercase();
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        })
        .collect()
}

pub const EXPORT_HEADERS: [&str; 14] = [
    "Name",
    "Email",
    "Status",
    "Begleitung",
    "Begleitung Ernährung",
    "Essen",
    "Kategorie",
    "Beschreibung",
    "Wichteln",
    "Ernährung/Allergien",
    "Zahlung",
    "Beiträge",
    "Notizen",
    "Link",
];

pub const EXPORT_FILENAME: &str = "weihnachtsfeier_teilnehmer.csv";

fn export_row(p: &Participant, origin: &str) -> [String; 14] {
    let food = p.food.as_ref();
    [
        p.name.clone(),
        p.email.clone(),
        p.status.as_str().to_string(),
        p.plus_one.clone(),
        p.plus_one_allergies.clone(),
        food.map(|f| f.name.clone()).unwrap_or_default(),
        food.map(|f| f.category.clone()).unwrap_or_default(),
        food.map(|f| f.description.clone()).unwrap_or_default(),
        if p.is_secret_santa { "Ja" } else { "Nein" }.to_string(),
        p.allergies.clone(),
        if p.wants_invoice { "Rechnung" } else { "Bar" }.to_string(),
        p.contribution.clone(),
        p.notes.clone(),
        deep_link(origin, &p.id),
    ]
}

pub fn export(participants: &[Participant], origin: &str) -> String {
    let mut lines = vec![EXPORT_HEADERS.join(",")];
    lines.extend(participants.iter().map(|p| {
        export_row(p, origin)
            .iter()
            .map(|cell| format!("\"{cell}\""))
            .collect::<Vec<_>>()
            .join(",")
    }));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FoodItem, RsvpStatus};

    #[test]
    fn header_is_skipped_and_swapped_columns_fixed() {
        let parsed = parse_import("Name,Email\nAnna,anna@x.de\nanna@x.de,Anna B");
        assert_eq!(
            parsed,
            vec![
                ImportCandidate {
                    name: "Anna".into(),
                    email: "anna@x.de".into()
                },
                ImportCandidate {
                    name: "Anna B".into(),
                    email: "anna@x.de".into()
                },
            ]
        );
        assert!(parsed.iter().all(|c| c.email.contains('@')));
    }

    #[test]
    fn semicolons_quotes_and_bad_rows() {
        let parsed = parse_import("\"Berta\";\"berta@x.de\"\r\nohne mail;irgendwas\n\nnur eine spalte\n'Carl',carl@x.de");
        let names: Vec<&str> = parsed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Berta", "Carl"]);
        assert_eq!(parsed[0].email, "berta@x.de");
    }

    #[test]
    fn header_detection_only_applies_to_first_line() {
        let parsed = parse_import("Anna,anna@x.de\nNamensvetter,namen@x.de");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn duplicates_within_batch_and_store_are_dropped() {
        let existing = vec![Participant::new("Dora", "DORA@x.de")];
        let candidates = parse_import("Dora,dora@x.de\nEmil,emil@x.de\nEmil Zwei,EMIL@x.de");
        let fresh = dedupe(candidates, &existing);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].name, "Emil");
    }

    #[test]
    fn export_quotes_every_cell() {
        let mut p = Participant::new("Frieda", "frieda@x.de");
        p.id = "f1".into();
        p.status = RsvpStatus::Attending;
        p.food = Some(FoodItem {
            name: "Quiche".into(),
            category: "Hauptgericht".into(),
            ..Default::default()
        });
        p.wants_invoice = true;

        let csv = export(&[p], "https://feier.example");
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(EXPORT_HEADERS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some(
                "\"Frieda\",\"frieda@x.de\",\"attending\",\"\",\"\",\"Quiche\",\"Hauptgericht\",\"\",\"Nein\",\"\",\"Rechnung\",\"\",\"\",\"https://feier.example/#/p/f1\""
            )
        );
    }
}
