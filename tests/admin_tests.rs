use std::sync::Arc;

use guestlist::admin::{
    AdminConsole, AdminError, Composition, ParticipantEdit, RecipientFilter, SortDirection,
    SortKey, ValidationError,
};
use guestlist::functions::{FunctionsClient, MailClient};
use guestlist::model::{FoodItem, LogStatus, Participant, RsvpStatus};
use guestlist::store::{MemoryStore, Store, StoreError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORIGIN: &str = "https://feier.example.org";

fn guest(name: &str, status: RsvpStatus) -> Participant {
    let mut p = Participant::new(name, &format!("{}@example.com", name.to_lowercase()));
    p.status = status;
    if status == RsvpStatus::Attending {
        p.food = Some(FoodItem {
            name: format!("Gericht von {name}"),
            category: "Dessert".into(),
            ..Default::default()
        });
    }
    p
}

async fn console_with(
    participants: Vec<Participant>,
    mail_url: &str,
) -> (Arc<MemoryStore>, AdminConsole) {
    let store = Arc::new(MemoryStore::with_participants(participants).await);
    let mail = MailClient::new(FunctionsClient::new(mail_url, "anon-key"));
    let console = AdminConsole::new(store.clone(), mail, ORIGIN);
    (store, console)
}

#[tokio::test]
async fn successful_dispatch_logs_one_sent_entry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/send-email"))
        .and(header("apikey", "anon-key"))
        .and(body_partial_json(json!({ "emails": [{ "to": "ada@example.com" }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "count": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let ada = guest("Ada", RsvpStatus::Attending);
    let (store, console) = console_with(
        vec![ada.clone(), guest("Bo", RsvpStatus::Declined)],
        &server.uri(),
    )
    .await;

    let prepared = console
        .prepare(
            &Composition::Custom {
                subject: "Hallo {{name}}".into(),
                body: "Dein Link: {{link}}\nDu bringst {{food}}.".into(),
            },
            &RecipientFilter::Attending,
        )
        .await
        .unwrap();
    assert_eq!(prepared.recipient_count(), 1);
    assert_eq!(prepared.confirmation_prompt(), "Wirklich an 1 Empfänger senden?");
    let message = &prepared.messages[0];
    assert_eq!(message.subject, "Hallo Ada");
    assert!(message.body.contains(&format!("{ORIGIN}/#/p/{}", ada.id)));
    assert!(message.html().contains("<br>"));

    let log = console.dispatch(prepared.confirm()).await.unwrap();
    assert_eq!(log.status, LogStatus::Sent);
    assert_eq!(log.recipient_count, 1);
    assert_eq!(log.template_name, "Individuelle Nachricht");
    assert_eq!(store.list_logs().await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_dispatch_still_logs_exactly_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/send-email"))
        .respond_with(ResponseTemplate::new(500).set_body_string("smtp down"))
        .expect(1)
        .mount(&server)
        .await;

    let guests: Vec<Participant> = ["Ada", "Bo", "Cem", "Dana"]
        .into_iter()
        .map(|n| guest(n, RsvpStatus::Pending))
        .collect();
    let (store, console) = console_with(guests, &server.uri()).await;

    let templates = console.templates().await.unwrap();
    let prepared = console
        .prepare(&Composition::Template(templates[0].id.clone()), &RecipientFilter::All)
        .await
        .unwrap();
    let log = console.dispatch(prepared.confirm()).await.unwrap();

    assert_eq!(log.status, LogStatus::Failed);
    assert_eq!(log.recipient_count, 4);
    assert_eq!(log.recipients_preview, "Ada, Bo, Cem...");
    let logs = store.list_logs().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].template_name, templates[0].name);
}

#[tokio::test]
async fn reported_failure_is_logged_as_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/send-email"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": false, "error": "quota" })),
        )
        .mount(&server)
        .await;

    let ada = guest("Ada", RsvpStatus::Pending);
    let (store, console) = console_with(vec![ada.clone()], &server.uri()).await;
    let prepared = console
        .prepare(
            &Composition::Custom {
                subject: "Test".into(),
                body: "Hallo".into(),
            },
            &RecipientFilter::Single(ada.id.clone()),
        )
        .await
        .unwrap();
    let log = console.dispatch(prepared.confirm()).await.unwrap();
    assert_eq!(log.status, LogStatus::Failed);
    assert_eq!(store.list_logs().await.unwrap().len(), 1);
}

#[tokio::test]
async fn empty_recipient_set_and_empty_body_are_rejected_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (store, console) =
        console_with(vec![guest("Ada", RsvpStatus::Pending)], &server.uri()).await;

    let err = console
        .prepare(
            &Composition::Custom {
                subject: "Hallo".into(),
                body: "Text".into(),
            },
            &RecipientFilter::Declined,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Validation(ValidationError::NoRecipients)));

    let err = console
        .prepare(
            &Composition::Custom {
                subject: "Hallo".into(),
                body: "   ".into(),
            },
            &RecipientFilter::All,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Validation(ValidationError::EmptyBody)));

    let err = console
        .prepare(&Composition::Template("nope".into()), &RecipientFilter::All)
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Validation(ValidationError::UnknownTemplate(_))));
    assert!(store.list_logs().await.unwrap().is_empty());
}

#[tokio::test]
async fn import_skips_existing_and_repeated_emails() {
    let existing = Participant::new("Anna", "anna@x.de");
    let (store, console) = console_with(vec![existing], "http://127.0.0.1:9").await;

    let report = console
        .import("Name;Email\nAnna Neu;ANNA@x.de\nBernd;bernd@x.de\nbernd@x.de;Bernd B\nohne-mail;kaputt")
        .await
        .unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(report.skipped, 2);

    let emails: Vec<String> = store
        .list_participants()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.email)
        .collect();
    assert_eq!(emails, vec!["anna@x.de", "bernd@x.de"]);
}

#[tokio::test]
async fn created_guests_start_pending_with_a_palette_style() {
    let (_, console) = console_with(Vec::new(), "http://127.0.0.1:9").await;
    let created = console.create("  Lea Roth ", "lea@example.com").await.unwrap();
    assert_eq!(created.name, "Lea Roth");
    assert_eq!(created.status, RsvpStatus::Pending);
    assert_eq!(created.id.len(), 12);
    assert!(guestlist::model::AvatarStyle::PALETTE.contains(&created.avatar_style));

    let err = console.create("", "x@example.com").await.unwrap_err();
    assert!(matches!(err, AdminError::Validation(ValidationError::MissingNameOrEmail)));
}

#[tokio::test]
async fn blocked_delete_surfaces_the_policy_error() {
    let ada = guest("Ada", RsvpStatus::Pending);
    let (store, console) = console_with(vec![ada.clone()], "http://127.0.0.1:9").await;
    store.block_deletes();

    let err = console.delete(&ada.id).await.unwrap_err();
    match err {
        AdminError::Store(err @ StoreError::DeleteNotApplied { .. }) => {
            assert!(err.to_string().contains("access policy may be blocking deletion"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(store.find_participant(&ada.id).await.unwrap().is_some());
}

#[tokio::test]
async fn admin_edit_to_declined_drops_attendance_details() {
    let mut ada = guest("Ada", RsvpStatus::Attending);
    ada.plus_one = "Grace".into();
    ada.plus_one_allergies = "Nüsse".into();
    ada.show_name_in_buffet = false;
    ada.is_secret_santa = true;
    ada.wants_invoice = true;
    ada.contribution = "Musik".into();
    ada.allergies = "Vegan".into();
    let (_, console) = console_with(vec![ada.clone()], "http://127.0.0.1:9").await;

    let updated = console
        .update(
            &ada.id,
            ParticipantEdit {
                name: "Ada L.".into(),
                email: ada.email.clone(),
                status: RsvpStatus::Declined,
                notes: "abgesagt per Telefon".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Ada L.");
    assert_eq!(updated.notes, "abgesagt per Telefon");
    assert!(updated.food.is_none());
    assert!(updated.plus_one.is_empty());
    assert!(updated.plus_one_allergies.is_empty());
    assert!(updated.show_name_in_buffet);
    assert!(!updated.is_secret_santa);
    assert!(!updated.wants_invoice);
    assert!(updated.contribution.is_empty());
    assert_eq!(updated.allergies, "Vegan");
}

#[tokio::test]
async fn preview_falls_back_to_the_sample_guest() {
    let (_, console) = console_with(Vec::new(), "http://127.0.0.1:9").await;
    let preview = console
        .preview("Hallo {{fullname}}", "Essen: {{food}}, Begleitung: {{plusOne}}, {{link}}")
        .await
        .unwrap();
    assert_eq!(preview.subject, "Hallo Max Mustermann");
    assert_eq!(
        preview.body,
        format!("Essen: Kartoffelsalat, Begleitung: Erika, {ORIGIN}/#/p/dummy")
    );
}

#[tokio::test]
async fn listing_sorts_and_export_has_deep_links() {
    let guests = vec![
        guest("bea", RsvpStatus::Pending),
        guest("Anton", RsvpStatus::Attending),
        guest("Carl", RsvpStatus::Declined),
    ];
    let (_, console) = console_with(guests, "http://127.0.0.1:9").await;

    let names: Vec<String> = console
        .participants(SortKey::Name, SortDirection::Desc)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Carl", "bea", "Anton"]);

    let csv = console.export().await.unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Name,Email,Status"));
    assert!(lines.iter().skip(1).all(|l| l.contains(&format!("{ORIGIN}/#/p/"))));

    let stats = console.stats().await.unwrap();
    assert_eq!(stats.attending, 1);
    assert_eq!(stats.open, 1);
    assert_eq!(stats.declined, 1);
}
