use chrono::NaiveDate;
use thiserror::Error;

use super::GuestDraft;
use crate::model::{EventConfig, Participant, RsvpStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Profile = 1,
    Buffet = 2,
    Details = 3,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Profile => "Dein Profil",
            WizardStep::Buffet => "Dein Buffet-Beitrag",
            WizardStep::Details => "Details & Abschluss",
        }
    }

    fn next(self) -> Self {
        match self {
            WizardStep::Profile => WizardStep::Buffet,
            WizardStep::Buffet | WizardStep::Details => WizardStep::Details,
        }
    }

    fn previous(self) -> Self {
        match self {
            WizardStep::Profile | WizardStep::Buffet => WizardStep::Profile,
            WizardStep::Details => WizardStep::Buffet,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Bitte trage ein Gericht ein.")]
    DishRequired,

    #[error("Die Anmeldefrist ist abgelaufen.")]
    Locked,

    #[error("Die Anmeldung ist gerade nicht geöffnet.")]
    NotOnboarding,
}

/// Guest self-service state machine. Pure: every transition that should be
/// persisted returns the row to write, and the caller reports back through
/// [`GuestForm::saved`].
#[derive(Debug, Clone)]
pub struct GuestForm {
    snapshot: Participant,
    baseline: GuestDraft,
    draft: GuestDraft,
    onboarding: Option<WizardStep>,
    dish_error: bool,
    held: bool,
    allow_plus_one: bool,
    deadline: Option<NaiveDate>,
    today: NaiveDate,
}

impl GuestForm {
    pub fn new(participant: Participant, config: &EventConfig, today: NaiveDate) -> Self {
        let baseline = GuestDraft::from_participant(&participant, config);
        Self {
            draft: baseline.clone(),
            baseline,
            snapshot: participant,
            onboarding: None,
            dish_error: false,
            held: false,
            allow_plus_one: config.allow_plus_one,
            deadline: config.rsvp_deadline,
            today,
        }
    }

    /// Moves the form's notion of "today" forward, so a long-lived form locks
    /// once the deadline passes.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn participant(&self) -> &Participant {
        &self.snapshot
    }

    pub fn draft(&self) -> &GuestDraft {
        &self.draft
    }

    pub fn step(&self) -> Option<WizardStep> {
        self.onboarding
    }

    pub fn is_onboarding(&self) -> bool {
        self.onboarding.is_some()
    }

    /// Field-level "dish missing" flag shown next to the dish input.
    pub fn dish_error(&self) -> bool {
        self.dish_error
    }

    /// True while the last auto-save check found changes it could not save.
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Past the deadline only attending guests keep edit rights.
    pub fn is_locked(&self) -> bool {
        self.deadline.is_some_and(|deadline| self.today > deadline)
            && self.snapshot.status != RsvpStatus::Attending
    }

    pub fn has_changes(&self) -> bool {
        self.draft
            .has_changes(&self.baseline, &self.snapshot, self.allow_plus_one)
    }

    fn ensure_unlocked(&self) -> Result<(), FormError> {
        if self.is_locked() {
            Err(FormError::Locked)
        } else {
            Ok(())
        }
    }

    fn row_for(&self, target: RsvpStatus) -> Participant {
        self.draft
            .to_participant(&self.snapshot, target, self.allow_plus_one)
    }

    pub fn edit(&mut self, change: impl FnOnce(&mut GuestDraft)) -> Result<(), FormError> {
        self.ensure_unlocked()?;
        change(&mut self.draft);
        if self.dish_error && self.draft.has_dish() {
            self.dish_error = false;
        }
        Ok(())
    }

    pub fn start_onboarding(&mut self) -> Result<(), FormError> {
        self.ensure_unlocked()?;
        self.onboarding = Some(WizardStep::Profile);
        self.dish_error = false;
        Ok(())
    }

    pub fn cancel_onboarding(&mut self) {
        self.onboarding = None;
        self.dish_error = false;
    }

    /// Leaving the buffet step needs a dish; otherwise the step stays put and
    /// the field error is raised.
    pub fn next_step(&mut self) -> Result<WizardStep, FormError> {
        let step = self.onboarding.ok_or(FormError::NotOnboarding)?;
        if step == WizardStep::Buffet && !self.draft.has_dish() {
            self.dish_error = true;
            return Err(FormError::DishRequired);
        }
        let next = step.next();
        self.onboarding = Some(next);
        Ok(next)
    }

    pub fn previous_step(&mut self) -> Result<WizardStep, FormError> {
        let step = self.onboarding.ok_or(FormError::NotOnboarding)?;
        let previous = step.previous();
        self.onboarding = Some(previous);
        Ok(previous)
    }

    /// The one write of the wizard: everything entered, as attending.
    pub fn finish_onboarding(&mut self) -> Result<Participant, FormError> {
        self.onboarding.ok_or(FormError::NotOnboarding)?;
        self.ensure_unlocked()?;
        if !self.draft.has_dish() {
            self.dish_error = true;
            return Err(FormError::DishRequired);
        }
        Ok(self.row_for(RsvpStatus::Attending))
    }

    /// "Ich komme": the first acceptance runs the wizard, later ones save
    /// straight away when a dish is already entered.
    pub fn attend(&mut self) -> Result<Option<Participant>, FormError> {
        self.ensure_unlocked()?;
        if self.snapshot.status == RsvpStatus::Pending || !self.draft.has_dish() {
            self.start_onboarding()?;
            return Ok(None);
        }
        self.onboarding = None;
        Ok(Some(self.row_for(RsvpStatus::Attending)))
    }

    pub fn decline(&mut self) -> Result<Participant, FormError> {
        self.quick_answer(RsvpStatus::Declined)
    }

    pub fn maybe(&mut self) -> Result<Participant, FormError> {
        self.quick_answer(RsvpStatus::Maybe)
    }

    fn quick_answer(&mut self, target: RsvpStatus) -> Result<Participant, FormError> {
        self.ensure_unlocked()?;
        self.onboarding = None;
        self.dish_error = false;
        self.draft.status = target;
        Ok(self.row_for(target))
    }

    /// "Status ändern": back to the answer buttons. Persisted by auto-save.
    pub fn reopen(&mut self) -> Result<(), FormError> {
        self.ensure_unlocked()?;
        self.draft.status = RsvpStatus::Pending;
        Ok(())
    }

    /// The non-debounced save button.
    pub fn manual_save(&mut self) -> Result<Participant, FormError> {
        self.ensure_unlocked()?;
        if !self.draft.is_valid() {
            self.dish_error = true;
            return Err(FormError::DishRequired);
        }
        Ok(self.row_for(self.draft.status))
    }

    /// What the auto-save timer should write, if anything. Invalid drafts are
    /// held back silently.
    pub fn auto_save(&mut self) -> Option<Participant> {
        if self.is_onboarding() || self.is_locked() || !self.has_changes() {
            self.held = false;
            return None;
        }
        if !self.draft.is_valid() {
            self.held = true;
            return None;
        }
        self.held = false;
        Some(self.row_for(self.draft.status))
    }

    /// Records a successful write as the new persisted snapshot.
    pub fn saved(&mut self, participant: Participant, config: &EventConfig) {
        self.baseline = GuestDraft::from_participant(&participant, config);
        self.draft.status = participant.status;
        self.snapshot = participant;
        self.onboarding = None;
        self.dish_error = false;
        self.held = false;
        self.allow_plus_one = config.allow_plus_one;
        self.deadline = config.rsvp_deadline;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
    }

    fn after_deadline() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 11).unwrap()
    }

    fn form_for(status: RsvpStatus, day: NaiveDate) -> GuestForm {
        let mut p = Participant::new("Nora Klein", "nora@example.com");
        p.status = status;
        GuestForm::new(p, &EventConfig::default(), day)
    }

    #[test]
    fn wizard_blocks_buffet_step_without_dish() {
        let mut form = form_for(RsvpStatus::Pending, today());
        assert_eq!(form.attend(), Ok(None));
        assert_eq!(form.step(), Some(WizardStep::Profile));
        assert_eq!(form.next_step(), Ok(WizardStep::Buffet));

        assert_eq!(form.next_step(), Err(FormError::DishRequired));
        assert_eq!(form.step(), Some(WizardStep::Buffet));
        assert!(form.dish_error());

        form.edit(|d| d.food.name = "Kartoffelsalat".into()).unwrap();
        assert!(!form.dish_error());
        assert_eq!(form.next_step(), Ok(WizardStep::Details));
    }

    #[test]
    fn finishing_returns_attending_row() {
        let mut form = form_for(RsvpStatus::Pending, today());
        form.start_onboarding().unwrap();
        form.edit(|d| d.food.name = " Brownies ".into()).unwrap();
        let row = form.finish_onboarding().unwrap();
        assert_eq!(row.status, RsvpStatus::Attending);
        assert_eq!(row.food.unwrap().name, "Brownies");
    }

    #[test]
    fn auto_save_is_off_while_onboarding() {
        let mut form = form_for(RsvpStatus::Maybe, today());
        form.start_onboarding().unwrap();
        form.edit(|d| d.notes = "neu".into()).unwrap();
        assert!(form.auto_save().is_none());
        form.cancel_onboarding();
        assert!(form.auto_save().is_some());
    }

    #[test]
    fn invalid_attending_draft_is_held() {
        let mut p = Participant::new("Nora Klein", "nora@example.com");
        p.status = RsvpStatus::Attending;
        p.food = Some(crate::model::FoodItem {
            name: "Suppe".into(),
            ..Default::default()
        });
        let mut form = GuestForm::new(p, &EventConfig::default(), today());

        form.edit(|d| d.food.name.clear()).unwrap();
        assert!(form.auto_save().is_none());
        assert!(form.is_held());

        form.edit(|d| d.food.name = "Eintopf".into()).unwrap();
        assert!(form.auto_save().is_some());
        assert!(!form.is_held());
    }

    #[test]
    fn deadline_locks_non_attending_guests_only() {
        let mut locked = form_for(RsvpStatus::Pending, after_deadline());
        assert!(locked.is_locked());
        assert_eq!(locked.decline(), Err(FormError::Locked));
        assert_eq!(locked.edit(|d| d.notes.push('x')), Err(FormError::Locked));
        assert_eq!(locked.manual_save(), Err(FormError::Locked));

        let mut p = Participant::new("Nora Klein", "nora@example.com");
        p.status = RsvpStatus::Attending;
        p.food = Some(crate::model::FoodItem {
            name: "Suppe".into(),
            ..Default::default()
        });
        let mut open = GuestForm::new(p, &EventConfig::default(), after_deadline());
        assert!(!open.is_locked());
        assert!(open.edit(|d| d.notes.push('x')).is_ok());
        assert!(open.manual_save().is_ok());
    }

    #[test]
    fn form_locks_when_the_date_moves_past_the_deadline() {
        let mut form = form_for(RsvpStatus::Maybe, today());
        assert!(!form.is_locked());
        form.edit(|d| d.notes = "vielleicht".into()).unwrap();

        form.set_today(after_deadline());
        assert!(form.is_locked());
        assert_eq!(form.decline(), Err(FormError::Locked));
        assert_eq!(form.reopen(), Err(FormError::Locked));
        assert!(form.auto_save().is_none());
    }

    #[test]
    fn saved_resets_snapshot_and_leaves_wizard() {
        let mut form = form_for(RsvpStatus::Pending, today());
        form.start_onboarding().unwrap();
        form.edit(|d| d.food.name = "Tiramisu".into()).unwrap();
        let row = form.finish_onboarding().unwrap();
        form.saved(row, &EventConfig::default());

        assert!(!form.is_onboarding());
        assert_eq!(form.participant().status, RsvpStatus::Attending);
        assert!(!form.has_changes());
    }

    #[test]
    fn returning_guest_with_dish_attends_directly() {
        let mut form = form_for(RsvpStatus::Declined, today());
        form.edit(|d| d.food.name = "Punsch".into()).unwrap();
        let row = form.attend().unwrap().unwrap();
        assert_eq!(row.status, RsvpStatus::Attending);
        assert!(!form.is_onboarding());
    }
}
