//! HTTP surface. Guests arrive through `<origin>/#/p/<id>` links and the
//! organizer through `#/admin`; the fragment never reaches the server, so the
//! landing page hands it to [`resolve_hash`] which redirects to the real page.

pub mod admin;
pub mod api;
pub mod guest;

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
};
use axum_extra::{TypedHeader, headers::Host};
use minijinja::Value;
use serde::Deserialize;

use crate::error::AppError;
use crate::router::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashRoute {
    Guest(String),
    Admin,
    Home,
}

impl HashRoute {
    /// Parses a location fragment such as `#/p/abc123` or `#/admin`. Anything
    /// unrecognised lands on the home page.
    pub fn parse(fragment: &str) -> Self {
        let path = fragment.trim().trim_start_matches('#').trim_start_matches('/');
        let mut parts = path.split('/').filter(|s| !s.is_empty());
        match (parts.next(), parts.next(), parts.next()) {
            (Some("admin"), None, None) => HashRoute::Admin,
            (Some("p"), Some(id), None) if is_participant_id(id) => HashRoute::Guest(id.to_string()),
            _ => HashRoute::Home,
        }
    }

    pub fn location(&self) -> String {
        match self {
            HashRoute::Guest(id) => format!("/p/{id}"),
            HashRoute::Admin => "/admin".to_string(),
            HashRoute::Home => "/".to_string(),
        }
    }
}

fn is_participant_id(id: &str) -> bool {
    id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[derive(Debug, Deserialize)]
pub struct HashQuery {
    #[serde(default)]
    hash: String,
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state, "index.html", minijinja::context! {})
}

pub async fn resolve_hash(Query(query): Query<HashQuery>) -> impl IntoResponse {
    Redirect::to(&HashRoute::parse(&query.hash).location())
}

pub(crate) fn render(state: &AppState, name: &str, ctx: Value) -> Result<Html<String>, AppError> {
    let html = state.templates.get_template(name)?.render(ctx)?;
    Ok(Html(html))
}

/// Base for deep links: the configured public origin, else the request host.
pub(crate) fn origin(state: &AppState, host: Option<TypedHeader<Host>>) -> String {
    if let Some(origin) = &state.public_origin {
        return origin.clone();
    }
    match host {
        Some(TypedHeader(host)) => {
            let scheme = if host.hostname() == "localhost" || host.hostname() == "127.0.0.1" {
                "http"
            } else {
                "https"
            };
            format!("{scheme}://{host}")
        }
        None => "http://localhost:3000".to_string(),
    }
}
