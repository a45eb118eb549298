use guestlist::functions::ai::{EMPTY_ANSWER, TRANSPORT_FAILURE};
use guestlist::functions::{AiClient, FunctionError, FunctionsClient, system_prompt};
use guestlist::model::{EventConfig, FoodItem, Participant, RsvpStatus};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> AiClient {
    AiClient::new(FunctionsClient::new(&server.uri(), "anon-key"))
}

#[tokio::test]
async fn chat_sends_message_and_instruction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/gemini-ai"))
        .and(header("authorization", "Bearer anon-key"))
        .and(body_json(json!({
            "action": "chat",
            "payload": { "message": "Wann geht es los?", "systemInstruction": "Sei nett." }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "Um 17 Uhr!" })))
        .expect(1)
        .mount(&server)
        .await;

    let answer = client(&server).reply("Wann geht es los?", "Sei nett.").await;
    assert_eq!(answer, "Um 17 Uhr!");
}

#[tokio::test]
async fn empty_answer_uses_the_fallback_line() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/gemini-ai"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "  " })))
        .mount(&server)
        .await;

    assert_eq!(client(&server).reply("Hallo?", "").await, EMPTY_ANSWER);
}

#[tokio::test]
async fn transport_failure_uses_the_other_fallback_line() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/gemini-ai"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let ai = client(&server);
    assert!(matches!(
        ai.chat("Hallo?", "").await,
        Err(FunctionError::Status { status, .. }) if status.as_u16() == 503
    ));
    assert_eq!(ai.reply("Hallo?", "").await, TRANSPORT_FAILURE);
}

#[tokio::test]
async fn avatar_image_is_returned_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/gemini-ai"))
        .and(body_json(json!({
            "action": "generate-avatar",
            "payload": { "prompt": "Pinguin mit Mütze" }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "image": "iVBORw0KGgo" })),
        )
        .mount(&server)
        .await;

    let image = client(&server).generate_avatar("Pinguin mit Mütze").await.unwrap();
    assert_eq!(image, "iVBORw0KGgo");
}

#[tokio::test]
async fn avatar_without_image_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/gemini-ai"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&server)
        .await;

    assert!(matches!(
        client(&server).generate_avatar("Rentier").await,
        Err(FunctionError::NoImage)
    ));
}

#[tokio::test]
async fn prompt_reflects_live_event_facts() {
    let mut guest = Participant::new("Nora", "nora@example.com");
    guest.status = RsvpStatus::Attending;
    guest.food = Some(FoodItem {
        name: "Stollen".into(),
        category: "Dessert".into(),
        ..Default::default()
    });
    let config = EventConfig::default();

    let prompt = system_prompt(&config, &[guest]);
    assert!(prompt.contains(&config.location));
    assert!(prompt.contains("- Stollen (Dessert)"));
    assert!(prompt.contains(&format!("1/{}", config.max_guests)));
}
