use axum::{
    Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
};
use minijinja::context;
use serde::Deserialize;
use tracing::error;

use super::user::{AuthSession, Credentials};
use crate::router::AppState;

// This allows us to extract the "next" field from the query string. We use this
// to redirect after log in.
#[derive(Debug, Deserialize)]
pub struct NextUrl {
    next: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(self::post::login))
        .route("/login", get(self::get::login))
        .route("/logout", get(self::get::logout))
}

fn render_login(state: &AppState, next: Option<String>, failed: bool) -> impl IntoResponse + use<> {
    match state
        .templates
        .get_template("login.html")
        .and_then(|tmpl| tmpl.render(context! { next => next, failed => failed }))
    {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!(%err, "login template failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Only same-site paths are followed after sign-in.
fn safe_next(next: Option<String>) -> String {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//"))
        .unwrap_or_else(|| "/admin".to_string())
}

mod post {
    use super::*;

    pub async fn login(
        State(state): State<AppState>,
        mut auth_session: AuthSession,
        Form(creds): Form<Credentials>,
    ) -> impl IntoResponse {
        let next = creds.next.clone();
        let user = match auth_session.authenticate(creds).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return (StatusCode::UNAUTHORIZED, render_login(&state, next, true)).into_response();
            }
            Err(err) => {
                error!(%err, "sign-in failed");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        if auth_session.login(&user).await.is_err() {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }

        Redirect::to(&safe_next(next)).into_response()
    }
}

mod get {
    use super::*;

    pub async fn login(
        State(state): State<AppState>,
        Query(NextUrl { next }): Query<NextUrl>,
    ) -> impl IntoResponse {
        render_login(&state, next, false)
    }

    pub async fn logout(mut auth_session: AuthSession) -> impl IntoResponse {
        if let Some(user) = auth_session.user.clone() {
            if let Err(err) = auth_session.backend.sign_out(&user).await {
                error!(%err, "provider sign-out failed");
            }
        }
        match auth_session.logout().await {
            Ok(_) => Redirect::to("/login").into_response(),
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}
