//! Guest self-service: the editable draft, the RSVP state machine with its
//! onboarding wizard, and the debounced auto-save around them.

mod buffet;
mod debounce;
mod draft;
mod editor;
mod form;

pub use buffet::{BuffetEntry, BuffetSection, UNSORTED_CATEGORY, board, inspirations};
pub use debounce::Debouncer;
pub use draft::GuestDraft;
pub use editor::{Clock, GuestEditor, GuestEditors, GuestError};
pub use form::{FormError, GuestForm, WizardStep};

use tracing::info;

use crate::store::{Store, StoreError};

/// Toggles `participant_id`'s vote on an activity and rewrites the activity
/// list. Returns whether the vote is now set, or `None` for an unknown
/// activity.
pub async fn toggle_activity_vote(
    store: &dyn Store,
    activity_id: &str,
    participant_id: &str,
) -> Result<Option<bool>, StoreError> {
    let mut config = store.load_config().await?;
    let Some(activity) = config
        .activities
        .iter_mut()
        .find(|a| a.id == activity_id && a.active)
    else {
        return Ok(None);
    };
    let voted = activity.toggle_vote(participant_id);
    store.save_config(&config).await?;
    info!(activity_id, participant_id, voted, "activity vote toggled");
    Ok(Some(voted))
}
