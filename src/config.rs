use std::env;
use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub bind_addr: String,
    /// Base for guest deep links. Derived from the request host when unset.
    pub public_origin: Option<String>,
    pub auth_url: String,
    pub auth_api_key: String,
    pub functions_url: String,
    pub functions_key: String,
    pub autosave_delay: Duration,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // A missing .env file is fine, the variables may come from the process.
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let auth_url = env::var("AUTH_URL").context("AUTH_URL is not set")?;
        let auth_api_key = env::var("AUTH_API_KEY").context("AUTH_API_KEY is not set")?;
        let functions_url = env::var("FUNCTIONS_URL").unwrap_or_else(|_| auth_url.clone());
        let functions_key = env::var("FUNCTIONS_KEY").unwrap_or_else(|_| auth_api_key.clone());

        let autosave_delay = match env::var("AUTOSAVE_DELAY_MS") {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("AUTOSAVE_DELAY_MS is not a number: {raw}"))?,
            Err(_) => DEFAULT_AUTOSAVE_DELAY_MS,
        };

        Ok(Self {
            database_url,
            rust_log: var_or("RUST_LOG", "debug"),
            bind_addr: var_or("BIND_ADDR", DEFAULT_BIND_ADDR),
            public_origin: env::var("PUBLIC_ORIGIN")
                .ok()
                .map(|o| o.trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty()),
            auth_url,
            auth_api_key,
            functions_url,
            functions_key,
            autosave_delay: Duration::from_millis(autosave_delay),
        })
    }
}
