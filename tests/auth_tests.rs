use axum_login::AuthnBackend;
use guestlist::auth::user::{Backend, Credentials};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials(password: &str) -> Credentials {
    Credentials {
        email: "orga@example.com".into(),
        password: password.into(),
        next: None,
    }
}

#[tokio::test]
async fn password_sign_in_is_delegated_and_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("apikey", "anon-key"))
        .and(body_json(json!({ "email": "orga@example.com", "password": "geheim" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-token",
            "user": { "id": "user-1", "email": "orga@example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = Backend::new(&server.uri(), "anon-key");
    let user = backend
        .authenticate(credentials("geheim"))
        .await
        .unwrap()
        .expect("signed in");
    assert_eq!(user.id, "user-1");
    assert_eq!(user.email, "orga@example.com");

    let restored = backend.get_user(&"user-1".to_string()).await.unwrap();
    assert_eq!(restored.map(|u| u.id).as_deref(), Some("user-1"));
}

#[tokio::test]
async fn wrong_password_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })),
        )
        .mount(&server)
        .await;

    let backend = Backend::new(&server.uri(), "anon-key");
    assert!(backend.authenticate(credentials("falsch")).await.unwrap().is_none());
    assert!(backend.get_user(&"user-1".to_string()).await.unwrap().is_none());
}

#[tokio::test]
async fn sign_out_revokes_and_forgets_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-token",
            "user": { "id": "user-1" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", "Bearer jwt-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let backend = Backend::new(&server.uri(), "anon-key");
    let user = backend.authenticate(credentials("geheim")).await.unwrap().unwrap();
    assert_eq!(user.email, "orga@example.com");

    backend.sign_out(&user).await.unwrap();
    assert!(backend.get_user(&"user-1".to_string()).await.unwrap().is_none());
}
