use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::{Debouncer, FormError, GuestDraft, GuestForm};
use crate::model::{EventConfig, Participant};
use crate::store::{SharedStore, StoreError};

#[derive(Debug, Error)]
pub enum GuestError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

struct EditorState {
    form: GuestForm,
    config: EventConfig,
}

struct Inner {
    state: Mutex<EditorState>,
    store: SharedStore,
    debouncer: std::sync::Mutex<Debouncer>,
}

/// Owns one guest's form, its auto-save timer and the store handle. Cloning
/// shares the same editor; dropping the last clone cancels a waiting save.
#[derive(Clone)]
pub struct GuestEditor {
    inner: Arc<Inner>,
}

impl GuestEditor {
    pub fn new(
        store: SharedStore,
        participant: Participant,
        config: EventConfig,
        today: NaiveDate,
        delay: Duration,
    ) -> Self {
        let form = GuestForm::new(participant, &config, today);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(EditorState { form, config }),
                store,
                debouncer: std::sync::Mutex::new(Debouncer::new(delay)),
            }),
        }
    }

    /// Loads the participant and the event config, or `None` for an unknown id.
    pub async fn load(
        store: SharedStore,
        id: &str,
        today: NaiveDate,
        delay: Duration,
    ) -> Result<Option<Self>, StoreError> {
        let Some(participant) = store.find_participant(id).await? else {
            return Ok(None);
        };
        let config = store.load_config().await?;
        Ok(Some(Self::new(store, participant, config, today, delay)))
    }

    /// A copy of the current form for rendering.
    pub async fn form(&self) -> GuestForm {
        self.inner.state.lock().await.form.clone()
    }

    /// Re-evaluates the deadline lock against the given date.
    pub async fn set_today(&self, today: NaiveDate) {
        self.inner.state.lock().await.form.set_today(today);
    }

    pub async fn config(&self) -> EventConfig {
        self.inner.state.lock().await.config.clone()
    }

    /// Applies a field edit and restarts the auto-save timer.
    pub async fn edit(&self, change: impl FnOnce(&mut GuestDraft)) -> Result<(), FormError> {
        let onboarding = {
            let mut state = self.inner.state.lock().await;
            state.form.edit(change)?;
            state.form.is_onboarding()
        };
        if !onboarding {
            self.schedule_auto_save();
        }
        Ok(())
    }

    pub async fn start_onboarding(&self) -> Result<(), FormError> {
        self.cancel_auto_save();
        self.inner.state.lock().await.form.start_onboarding()
    }

    pub async fn cancel_onboarding(&self) {
        self.inner.state.lock().await.form.cancel_onboarding();
        self.schedule_auto_save();
    }

    pub async fn next_step(&self) -> Result<super::WizardStep, FormError> {
        self.inner.state.lock().await.form.next_step()
    }

    pub async fn previous_step(&self) -> Result<super::WizardStep, FormError> {
        self.inner.state.lock().await.form.previous_step()
    }

    pub async fn finish_onboarding(&self) -> Result<Participant, GuestError> {
        self.save_with(GuestForm::finish_onboarding).await
    }

    pub async fn decline(&self) -> Result<Participant, GuestError> {
        self.save_with(GuestForm::decline).await
    }

    pub async fn maybe(&self) -> Result<Participant, GuestError> {
        self.save_with(GuestForm::maybe).await
    }

    pub async fn manual_save(&self) -> Result<Participant, GuestError> {
        self.save_with(GuestForm::manual_save).await
    }

    /// `None` when the wizard was opened instead of saving.
    pub async fn attend(&self) -> Result<Option<Participant>, GuestError> {
        self.cancel_auto_save();
        let mut state = self.inner.state.lock().await;
        match state.form.attend()? {
            Some(row) => {
                let saved = self.inner.store.update_participant(&row).await?;
                let EditorState { form, config } = &mut *state;
                form.saved(saved.clone(), config);
                info!(id = %saved.id, "guest attends");
                Ok(Some(saved))
            }
            None => Ok(None),
        }
    }

    pub async fn reopen(&self) -> Result<(), FormError> {
        self.inner.state.lock().await.form.reopen()?;
        self.schedule_auto_save();
        Ok(())
    }

    async fn save_with(
        &self,
        transition: impl FnOnce(&mut GuestForm) -> Result<Participant, FormError>,
    ) -> Result<Participant, GuestError> {
        self.cancel_auto_save();
        let mut state = self.inner.state.lock().await;
        let row = transition(&mut state.form)?;
        let saved = match self.inner.store.update_participant(&row).await {
            Ok(saved) => saved,
            Err(err) => {
                error!(id = %row.id, %err, "guest save failed");
                return Err(err.into());
            }
        };
        let EditorState { form, config } = &mut *state;
        form.saved(saved.clone(), config);
        info!(id = %saved.id, status = %saved.status, "guest saved");
        Ok(saved)
    }

    fn schedule_auto_save(&self) {
        let weak = Arc::downgrade(&self.inner);
        match self.inner.debouncer.lock() {
            Ok(mut debouncer) => debouncer.schedule(auto_save(weak)),
            Err(_) => warn!("auto-save timer poisoned"),
        }
    }

    fn cancel_auto_save(&self) {
        if let Ok(mut debouncer) = self.inner.debouncer.lock() {
            debouncer.cancel();
        }
    }
}

async fn auto_save(inner: Weak<Inner>) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut state = inner.state.lock().await;
    let Some(row) = state.form.auto_save() else {
        if state.form.is_held() {
            debug!(id = %state.form.participant().id, "auto-save held, draft incomplete");
        }
        return;
    };
    match inner.store.update_participant(&row).await {
        Ok(saved) => {
            debug!(id = %saved.id, "auto-saved guest");
            let EditorState { form, config } = &mut *state;
            form.saved(saved, config);
        }
        Err(err) => error!(id = %row.id, %err, "auto-save failed"),
    }
}

/// The date the deadline lock is checked against.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Live editors keyed by participant id, so a guest's pending auto-save
/// survives between requests.
#[derive(Clone)]
pub struct GuestEditors {
    store: SharedStore,
    delay: Duration,
    clock: Clock,
    editors: Arc<Mutex<HashMap<String, GuestEditor>>>,
}

impl GuestEditors {
    pub fn new(store: SharedStore, delay: Duration) -> Self {
        Self::with_clock(store, delay, Arc::new(|| Local::now().date_naive()))
    }

    pub fn with_clock(store: SharedStore, delay: Duration, clock: Clock) -> Self {
        Self {
            store,
            delay,
            clock,
            editors: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The guest's live editor, its lock checked against today's date.
    pub async fn get(&self, id: &str) -> Result<Option<GuestEditor>, StoreError> {
        let today = (self.clock)();
        let cached = self.editors.lock().await.get(id).cloned();
        if let Some(editor) = cached {
            editor.set_today(today).await;
            return Ok(Some(editor));
        }

        let Some(loaded) = GuestEditor::load(self.store.clone(), id, today, self.delay).await?
        else {
            return Ok(None);
        };
        // Another request may have loaded it meanwhile.
        let editor = self
            .editors
            .lock()
            .await
            .entry(id.to_string())
            .or_insert(loaded)
            .clone();
        editor.set_today(today).await;
        Ok(Some(editor))
    }

    /// Drops the cached editor after an admin change to the same row or the
    /// config.
    pub async fn forget(&self, id: &str) {
        self.editors.lock().await.remove(id);
    }

    pub async fn forget_all(&self) {
        self.editors.lock().await.clear();
    }
}
