use crate::{
    auth::{router as auth_router, user::Backend},
    config::Config,
    functions::{AiClient, FunctionsClient, MailClient},
    guest::GuestEditors,
    routes::{admin, api, guest, index, resolve_hash},
    store::SharedStore,
    util::asset_loader::AssetLoader,
};
use axum::{
    Router,
    routing::{get, get_service},
};
use axum_login::{
    AuthManagerLayerBuilder,
    tower_sessions::{
        Expiry, SessionManagerLayer,
        cookie::{SameSite, time},
    },
};
use minijinja::Environment;
use std::sync::Arc;
use tokio::{signal, task::AbortHandle};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub templates: Arc<Environment<'static>>,
    pub ai: AiClient,
    pub mail: MailClient,
    pub editors: GuestEditors,
    pub public_origin: Option<String>,
}

impl AppState {
    pub fn new(store: SharedStore, config: &Config) -> Self {
        let functions = FunctionsClient::new(&config.functions_url, &config.functions_key);
        Self {
            editors: GuestEditors::new(store.clone(), config.autosave_delay),
            store,
            templates: Arc::new(setup_templates()),
            ai: AiClient::new(functions.clone()),
            mail: MailClient::new(functions),
            public_origin: config.public_origin.clone(),
        }
    }
}

pub fn create_router(state: AppState, config: &Config, session_store: PostgresStore) -> Router {
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(1)));

    // Auth service.
    //
    // This combines the session layer with our backend to establish the auth
    // service which will provide the auth session as a request extension.
    let backend = Backend::new(&config.auth_url, &config.auth_api_key);
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    Router::new()
        .route("/", get(index))
        .route("/route", get(resolve_hash))
        .merge(guest::router())
        .nest("/admin", admin::router())
        .route("/api/chat", axum::routing::post(api::chat))
        .merge(auth_router::router())
        .with_state(state)
        .nest_service("/static", get_service(ServeDir::new("static")))
        .layer(auth_layer)
        .layer(TraceLayer::new_for_http())
}

pub fn setup_templates() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(minijinja::path_loader("templates"));
    AssetLoader::default().register(&mut env);
    env
}

pub async fn shutdown_signal(deletion_task_abort_handle: AbortHandle) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(%err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(%err, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { deletion_task_abort_handle.abort() },
        _ = terminate => { deletion_task_abort_handle.abort() },
    }
}
