use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use guestlist::guest::{Clock, FormError, GuestEditor, GuestEditors, GuestError, WizardStep};
use guestlist::model::{EventConfig, FoodItem, Participant, RsvpStatus};
use guestlist::store::{MemoryStore, SharedStore, Store};

const DELAY: Duration = Duration::from_millis(1000);

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
}

fn after_deadline() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 11).unwrap()
}

fn invitee() -> Participant {
    Participant::new("Mia Schulz", "mia@example.com")
}

fn attendee() -> Participant {
    let mut p = invitee();
    p.status = RsvpStatus::Attending;
    p.food = Some(FoodItem {
        name: "Kartoffelsalat".into(),
        category: "Salate".into(),
        ..Default::default()
    });
    p
}

async fn editor_for(participant: Participant, today: NaiveDate) -> (Arc<MemoryStore>, GuestEditor) {
    let store = Arc::new(MemoryStore::with_participants(vec![participant.clone()]).await);
    let shared: SharedStore = store.clone();
    let editor = GuestEditor::new(shared, participant, EventConfig::default(), today, DELAY);
    (store, editor)
}

async fn stored(store: &MemoryStore, id: &str) -> Participant {
    store.find_participant(id).await.unwrap().unwrap()
}

#[tokio::test(start_paused = true)]
async fn rapid_edits_are_saved_once_after_a_quiet_second() {
    let guest = attendee();
    let (store, editor) = editor_for(guest.clone(), today()).await;

    for note in ["k", "ko", "kom", "komme", "komme später"] {
        editor.edit(|d| d.notes = note.to_string()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    assert_eq!(store.writes(), 0);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(store.writes(), 1);
    assert_eq!(stored(&store, &guest.id).await.notes, "komme später");
    assert!(!editor.form().await.has_changes());
}

#[tokio::test(start_paused = true)]
async fn incomplete_attending_draft_is_held_not_saved() {
    let guest = attendee();
    let (store, editor) = editor_for(guest.clone(), today()).await;

    editor.edit(|d| d.food.name = "  ".into()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(store.writes(), 0);
    assert!(editor.form().await.is_held());

    editor.edit(|d| d.food.name = "Linsensuppe".into()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(store.writes(), 1);
    let saved = stored(&store, &guest.id).await;
    assert_eq!(saved.food.map(|f| f.name).as_deref(), Some("Linsensuppe"));
    assert!(!editor.form().await.is_held());
}

#[tokio::test(start_paused = true)]
async fn manual_save_skips_the_timer() {
    let guest = attendee();
    let (store, editor) = editor_for(guest.clone(), today()).await;

    editor.edit(|d| d.contribution = "Musik".into()).await.unwrap();
    editor.manual_save().await.unwrap();
    assert_eq!(store.writes(), 1);

    // The pending auto-save was cancelled and there is nothing left to write.
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(store.writes(), 1);
}

#[tokio::test(start_paused = true)]
async fn decline_and_maybe_are_single_writes() {
    for (answer, expected) in [("decline", RsvpStatus::Declined), ("maybe", RsvpStatus::Maybe)] {
        for start in [invitee(), attendee()] {
            let (store, editor) = editor_for(start.clone(), today()).await;
            let saved = match answer {
                "decline" => editor.decline().await.unwrap(),
                _ => editor.maybe().await.unwrap(),
            };
            assert_eq!(saved.status, expected);
            assert!(saved.food.is_none());

            tokio::time::sleep(Duration::from_secs(3)).await;
            assert_eq!(store.writes(), 1, "{answer} from {:?}", start.status);
            assert_eq!(stored(&store, &start.id).await.status, expected);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn onboarding_gates_on_the_dish_and_saves_once() {
    let guest = invitee();
    let (store, editor) = editor_for(guest.clone(), today()).await;

    assert!(editor.attend().await.unwrap().is_none());
    assert_eq!(editor.form().await.step(), Some(WizardStep::Profile));

    editor.edit(|d| d.avatar_seed = "Mia!".into()).await.unwrap();
    assert_eq!(editor.next_step().await.unwrap(), WizardStep::Buffet);

    assert_eq!(editor.next_step().await, Err(FormError::DishRequired));
    let form = editor.form().await;
    assert_eq!(form.step(), Some(WizardStep::Buffet));
    assert!(form.dish_error());

    editor.edit(|d| d.food.name = "Zimtsterne".into()).await.unwrap();
    assert!(!editor.form().await.dish_error());
    assert_eq!(editor.next_step().await.unwrap(), WizardStep::Details);
    editor.edit(|d| d.is_secret_santa = true).await.unwrap();

    // Nothing is written while the wizard is open.
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(store.writes(), 0);

    let saved = editor.finish_onboarding().await.unwrap();
    assert_eq!(saved.status, RsvpStatus::Attending);
    assert!(saved.is_secret_santa);
    assert_eq!(saved.avatar_seed, "Mia!");
    assert_eq!(store.writes(), 1);
    assert!(!editor.form().await.is_onboarding());
}

#[tokio::test(start_paused = true)]
async fn cancelling_the_wizard_writes_nothing() {
    let guest = invitee();
    let (store, editor) = editor_for(guest.clone(), today()).await;

    editor.start_onboarding().await.unwrap();
    editor.cancel_onboarding().await;
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(store.writes(), 0);
    assert_eq!(stored(&store, &guest.id).await.status, RsvpStatus::Pending);
}

#[tokio::test(start_paused = true)]
async fn past_the_deadline_only_attendees_may_edit() {
    let (store, editor) = editor_for(invitee(), after_deadline()).await;
    assert!(editor.form().await.is_locked());
    assert_eq!(
        editor.edit(|d| d.notes = "zu spät".into()).await,
        Err(FormError::Locked)
    );
    assert!(matches!(
        editor.decline().await,
        Err(GuestError::Form(FormError::Locked))
    ));
    assert!(matches!(
        editor.attend().await,
        Err(GuestError::Form(FormError::Locked))
    ));
    assert_eq!(store.writes(), 0);

    let guest = attendee();
    let (store, editor) = editor_for(guest.clone(), after_deadline()).await;
    assert!(!editor.form().await.is_locked());
    editor.edit(|d| d.notes = "bringe Servietten".into()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(store.writes(), 1);
    assert_eq!(stored(&store, &guest.id).await.notes, "bringe Servietten");
}

#[tokio::test(start_paused = true)]
async fn dropping_the_editor_cancels_a_waiting_save() {
    let (store, editor) = editor_for(attendee(), today()).await;
    editor.edit(|d| d.notes = "weg".into()).await.unwrap();
    drop(editor);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(store.writes(), 0);
}

#[tokio::test(start_paused = true)]
async fn registry_shares_one_editor_per_guest() {
    let guest = attendee();
    let store = Arc::new(MemoryStore::with_participants(vec![guest.clone()]).await);
    let editors = GuestEditors::new(store.clone(), DELAY);

    assert!(editors.get("unknown").await.unwrap().is_none());

    let first = editors.get(&guest.id).await.unwrap().unwrap();
    first.edit(|d| d.notes = "eins".into()).await.unwrap();
    let second = editors.get(&guest.id).await.unwrap().unwrap();
    assert_eq!(second.form().await.draft().notes, "eins");

    editors.forget(&guest.id).await;
    let fresh = editors.get(&guest.id).await.unwrap().unwrap();
    assert_eq!(fresh.form().await.draft().notes, "");
}

#[tokio::test(start_paused = true)]
async fn cached_editor_locks_once_the_deadline_passes() {
    let guest = invitee();
    let store = Arc::new(MemoryStore::with_participants(vec![guest.clone()]).await);
    let date = Arc::new(std::sync::Mutex::new(today()));
    let clock: Clock = {
        let date = date.clone();
        Arc::new(move || *date.lock().unwrap())
    };
    let editors = GuestEditors::with_clock(store.clone(), DELAY, clock);

    let editor = editors.get(&guest.id).await.unwrap().unwrap();
    assert!(!editor.form().await.is_locked());
    editor.edit(|d| d.notes = "vor der Frist".into()).await.unwrap();

    *date.lock().unwrap() = after_deadline();
    let later = editors.get(&guest.id).await.unwrap().unwrap();
    assert_eq!(later.form().await.draft().notes, "vor der Frist");
    assert!(later.form().await.is_locked());
    assert!(matches!(
        later.decline().await,
        Err(GuestError::Form(FormError::Locked))
    ));
    assert_eq!(later.reopen().await, Err(FormError::Locked));

    // The edit made before the deadline is no longer written either.
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(store.writes(), 0);
    assert_eq!(stored(&store, &guest.id).await.status, RsvpStatus::Pending);
}

#[tokio::test(start_paused = true)]
async fn attendees_stay_editable_through_the_registry_after_the_deadline() {
    let guest = attendee();
    let store = Arc::new(MemoryStore::with_participants(vec![guest.clone()]).await);
    let clock: Clock = Arc::new(after_deadline);
    let editors = GuestEditors::with_clock(store.clone(), DELAY, clock);

    let editor = editors.get(&guest.id).await.unwrap().unwrap();
    assert!(!editor.form().await.is_locked());
    editor.edit(|d| d.notes = "bringe Kerzen".into()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(store.writes(), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_first_loads_share_one_editor() {
    let guest = attendee();
    let store = Arc::new(MemoryStore::with_participants(vec![guest.clone()]).await);
    let editors = GuestEditors::new(store.clone(), DELAY);

    let (first, second) = tokio::join!(editors.get(&guest.id), editors.get(&guest.id));
    let (first, second) = (first.unwrap().unwrap(), second.unwrap().unwrap());
    first.edit(|d| d.notes = "geteilt".into()).await.unwrap();
    assert_eq!(second.form().await.draft().notes, "geteilt");

    let third = editors.get(&guest.id).await.unwrap().unwrap();
    assert_eq!(third.form().await.draft().notes, "geteilt");
}
