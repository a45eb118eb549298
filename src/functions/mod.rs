//! Clients for the two hosted serverless functions. Both are plain JSON over
//! HTTPS with the project key sent as bearer token and `apikey` header.

pub mod ai;
pub mod mail;

pub use ai::{AiClient, system_prompt};
pub use mail::{MailClient, MailOutcome};

use reqwest::StatusCode;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FunctionError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error("function {name} answered {status}: {body}")]
    Status {
        name: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("avatar generation returned no image")]
    NoImage,
}

#[derive(Debug, Clone)]
pub struct FunctionsClient {
    http: reqwest::Client,
    base_url: String,
    key: String,
}

impl FunctionsClient {
    pub fn new(base_url: &str, key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        }
    }

    async fn invoke<B, R>(&self, name: &'static str, body: &B) -> Result<R, FunctionError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/functions/v1/{}", self.base_url, name);
        debug!(%url, "invoking function");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.key)
            .header("apikey", &self.key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FunctionError::Status { name, status, body });
        }

        Ok(response.json::<R>().await?)
    }
}
