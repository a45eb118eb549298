use std::collections::HashMap;
use std::sync::Arc;

use async_session::async_trait;
use axum_login::{AuthUser, AuthnBackend, UserId};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// An organizer signed in through the hosted auth provider. Admin access is
/// granted on session presence alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    access_token: String,
}

impl AuthUser for AdminUser {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }

    fn session_auth_hash(&self) -> &[u8] {
        self.access_token.as_bytes()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error("auth provider answered {0}")]
    Status(StatusCode),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: ProviderUser,
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Backend {
    http: reqwest::Client,
    auth_url: String,
    api_key: String,
    users: Arc<RwLock<HashMap<String, AdminUser>>>,
}

impl Backend {
    pub fn new(auth_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_url: auth_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Revokes the provider session and forgets the cached user.
    pub async fn sign_out(&self, user: &AdminUser) -> Result<(), AuthError> {
        self.users.write().await.remove(&user.id);

        let response = self
            .http
            .post(format!("{}/auth/v1/logout", self.auth_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&user.access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AuthError::Status(response.status()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthnBackend for Backend {
    type User = AdminUser;
    type Credentials = Credentials;
    type Error = AuthError;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        let response = self
            .http
            .post(format!("{}/auth/v1/token", self.auth_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({
                "email": creds.email,
                "password": creds.password,
            }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                warn!(email = %creds.email, "sign-in rejected");
                return Ok(None);
            }
            status => return Err(AuthError::Status(status)),
        }

        let token: TokenResponse = response.json().await?;
        let user = AdminUser {
            id: token.user.id,
            email: token.user.email.unwrap_or(creds.email),
            access_token: token.access_token,
        };
        debug!(id = %user.id, "organizer signed in");

        // Kept so `get_user` can restore the session.
        self.users.write().await.insert(user.id.clone(), user.clone());
        Ok(Some(user))
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        Ok(self.users.read().await.get(user_id).cloned())
    }
}

pub type AuthSession = axum_login::AuthSession<Backend>;
