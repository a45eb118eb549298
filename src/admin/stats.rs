use serde::Serialize;

use crate::model::{EventConfig, Participant, RsvpStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub attending: usize,
    pub plus_ones: usize,
    pub declined: usize,
    pub pending: usize,
    pub maybe: usize,
    /// Pending and maybe together, the "Offen" slice of the chart.
    pub open: usize,
    pub secret_santa: usize,
    pub headcount: usize,
    pub capacity_left: usize,
    pub dietary: Vec<DietaryCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DietaryCount {
    pub label: String,
    pub count: usize,
}

impl Stats {
    pub fn compute(participants: &[Participant], config: &EventConfig) -> Self {
        let count = |status: RsvpStatus| participants.iter().filter(|p| p.status == status).count();
        let attending: Vec<&Participant> = participants.iter().filter(|p| p.is_attending()).collect();

        let plus_ones = attending.iter().filter(|p| p.has_plus_one()).count();
        let pending = count(RsvpStatus::Pending);
        let maybe = count(RsvpStatus::Maybe);
        let headcount = attending.len() + plus_ones;

        Self {
            attending: attending.len(),
            plus_ones,
            declined: count(RsvpStatus::Declined),
            pending,
            maybe,
            open: pending + maybe,
            secret_santa: attending.iter().filter(|p| p.is_secret_santa).count(),
            headcount,
            capacity_left: (config.max_guests as usize).saturating_sub(headcount),
            dietary: dietary_tally(&attending),
        }
    }
}

/// Counts each allergy token of attending guests and their plus-ones,
/// most frequent first.
fn dietary_tally(attending: &[&Participant]) -> Vec<DietaryCount> {
    let mut counts: Vec<DietaryCount> = Vec::new();
    let mut add = |text: &str| {
        for token in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match counts.iter_mut().find(|c| c.label == token) {
                Some(entry) => entry.count += 1,
                None => counts.push(DietaryCount {
                    label: token.to_string(),
                    count: 1,
                }),
            }
        }
    };

    for p in attending {
        add(&p.allergies);
        if p.has_plus_one() {
            add(&p.plus_one_allergies);
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    counts
}
