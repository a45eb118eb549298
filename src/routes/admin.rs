use axum::{
    Router,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::{TypedHeader, extract::Form, headers::Host};
use axum_login::login_required;
use chrono::NaiveDate;
use minijinja::context;
use serde::Deserialize;
use tracing::info;

use super::{origin, render};
use crate::admin::{
    AdminConsole, Composition, ParticipantEdit, RecipientFilter, SortDirection, SortKey,
    csv::EXPORT_FILENAME,
};
use crate::auth::user::{AuthSession, Backend};
use crate::error::AppError;
use crate::model::{Activity, BuffetCategory, EmailTemplate, EventConfig, ProgramItem, RsvpStatus};
use crate::placeholders::Token;
use crate::router::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/participants", post(create))
        .route("/participants/import", post(import))
        .route("/participants/{id}", get(edit_page).post(update))
        .route("/participants/{id}/delete", post(delete))
        .route("/export.csv", get(export))
        .route("/config", get(config_page).post(save_config))
        .route("/templates", get(templates_page))
        .route("/templates/{id}", post(save_template))
        .route("/email", get(compose_page))
        .route("/email/preview", post(preview))
        .route("/email/prepare", post(prepare))
        .route("/email/send", post(send))
        .route_layer(login_required!(Backend, login_url = "/login"))
}

fn console(state: &AppState, host: Option<TypedHeader<Host>>) -> AdminConsole {
    AdminConsole::new(state.store.clone(), state.mail.clone(), &origin(state, host))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    sort: Option<String>,
    dir: Option<String>,
    notice: Option<String>,
}

async fn dashboard(
    State(state): State<AppState>,
    auth_session: AuthSession,
    host: Option<TypedHeader<Host>>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let console = console(&state, host);
    let key: SortKey = query.sort.as_deref().and_then(|s| s.parse().ok()).unwrap_or_default();
    let direction: SortDirection = query.dir.as_deref().and_then(|d| d.parse().ok()).unwrap_or_default();

    let participants = console.participants(key, direction).await?;
    let links: Vec<String> = participants
        .iter()
        .map(|p| crate::placeholders::deep_link(console.origin(), &p.id))
        .collect();

    let html = render(
        &state,
        "admin.html",
        context! {
            user => auth_session.user.map(|u| u.email),
            stats => console.stats().await?,
            participants => participants,
            links => links,
            sort => key.as_str(),
            dir => direction.as_str(),
            flipped => direction.flipped().as_str(),
            statuses => RsvpStatus::ALL.iter().map(|s| context! { value => s.as_str(), label => s.label() }).collect::<Vec<_>>(),
            notice => query.notice,
        },
    )?;
    Ok(html.into_response())
}

#[derive(Debug, Deserialize)]
pub struct NewParticipant {
    name: String,
    email: String,
}

async fn create(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
    Form(form): Form<NewParticipant>,
) -> Result<Redirect, AppError> {
    console(&state, host).create(&form.name, &form.email).await?;
    Ok(Redirect::to("/admin"))
}

#[derive(Debug, Deserialize)]
pub struct ImportForm {
    #[serde(default)]
    csv: String,
}

async fn import(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
    Form(form): Form<ImportForm>,
) -> Result<Redirect, AppError> {
    let report = console(&state, host).import(&form.csv).await?;
    let notice = format!(
        "{} Gäste importiert, {} übersprungen.",
        report.added, report.skipped
    );
    Ok(Redirect::to(&format!(
        "/admin?notice={}",
        percent_encoding::utf8_percent_encode(&notice, percent_encoding::NON_ALPHANUMERIC)
    )))
}

async fn edit_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let participant = state
        .store
        .find_participant(&id)
        .await?
        .ok_or(AppError::NotFound)?;
    let html = render(
        &state,
        "participant.html",
        context! {
            participant => participant,
            statuses => RsvpStatus::ALL.iter().map(|s| context! { value => s.as_str(), label => s.label() }).collect::<Vec<_>>(),
        },
    )?;
    Ok(html.into_response())
}

#[derive(Debug, Deserialize)]
pub struct EditForm {
    name: String,
    email: String,
    status: String,
    #[serde(default)]
    notes: String,
}

async fn update(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
    Path(id): Path<String>,
    Form(form): Form<EditForm>,
) -> Result<Redirect, AppError> {
    let status: RsvpStatus = form.status.parse().map_err(AppError::BadRequest)?;
    let edit = ParticipantEdit {
        name: form.name,
        email: form.email,
        status,
        notes: form.notes,
    };
    console(&state, host).update(&id, edit).await?;
    state.editors.forget(&id).await;
    Ok(Redirect::to("/admin"))
}

async fn delete(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    console(&state, host).delete(&id).await?;
    state.editors.forget(&id).await;
    Ok(Redirect::to("/admin"))
}

async fn export(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
) -> Result<Response, AppError> {
    let body = console(&state, host).export().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        body,
    )
        .into_response())
}

async fn config_page(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
) -> Result<Response, AppError> {
    let config = console(&state, host).config().await?;
    let pretty = |value: serde_json::Result<String>| value.unwrap_or_else(|_| "[]".to_string());
    let html = render(
        &state,
        "config.html",
        context! {
            config => &config,
            deadline => config.rsvp_deadline.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            dietary_options => config.dietary_options.join(", "),
            contribution_suggestions => config.contribution_suggestions.join(", "),
            program => pretty(serde_json::to_string_pretty(&config.program)),
            buffet_config => pretty(serde_json::to_string_pretty(&config.buffet_config)),
            activities => pretty(serde_json::to_string_pretty(&config.activities)),
        },
    )?;
    Ok(html.into_response())
}

/// The event settings form. Collections arrive as JSON and replace the stored
/// arrays whole.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigForm {
    title: String,
    #[serde(default)]
    subtitle: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    time: String,
    #[serde(default)]
    location: String,
    max_guests: u32,
    allow_plus_one: Option<String>,
    secret_santa_limit: u32,
    #[serde(default)]
    dietary_options: String,
    #[serde(default)]
    contribution_suggestions: String,
    #[serde(default)]
    cost: String,
    #[serde(default)]
    hosts: String,
    #[serde(default)]
    contact_email: String,
    #[serde(default)]
    rsvp_deadline: String,
    #[serde(default)]
    program: String,
    #[serde(default)]
    buffet_config: String,
    #[serde(default)]
    activities: String,
}

fn comma_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn json_field<T: serde::de::DeserializeOwned>(label: &str, text: &str) -> Result<Vec<T>, AppError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text)
        .map_err(|err| AppError::BadRequest(format!("{label} ist kein gültiges JSON: {err}")))
}

impl ConfigForm {
    pub fn into_config(self) -> Result<EventConfig, AppError> {
        let rsvp_deadline = match self.rsvp_deadline.trim() {
            "" => None,
            raw => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                AppError::BadRequest(format!("Ungültige Anmeldefrist: {raw}"))
            })?),
        };
        let program: Vec<ProgramItem> = json_field("Programm", &self.program)?;
        let buffet_config: Vec<BuffetCategory> = json_field("Buffet", &self.buffet_config)?;
        let activities: Vec<Activity> = json_field("Aktivitäten", &self.activities)?;

        Ok(EventConfig {
            title: self.title.trim().to_string(),
            subtitle: self.subtitle,
            date: self.date,
            time: self.time,
            location: self.location,
            max_guests: self.max_guests,
            allow_plus_one: self.allow_plus_one.is_some(),
            secret_santa_limit: self.secret_santa_limit,
            dietary_options: comma_list(&self.dietary_options),
            contribution_suggestions: comma_list(&self.contribution_suggestions),
            cost: self.cost,
            hosts: self.hosts,
            program,
            buffet_config,
            activities,
            contact_email: self.contact_email.trim().to_string(),
            rsvp_deadline,
        })
    }
}

async fn save_config(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
    Form(form): Form<ConfigForm>,
) -> Result<Redirect, AppError> {
    let config = form.into_config()?;
    console(&state, host).save_config(&config).await?;
    // Cached editors hold the old config.
    state.editors.forget_all().await;
    Ok(Redirect::to("/admin/config"))
}

async fn templates_page(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
) -> Result<Response, AppError> {
    let templates = console(&state, host).templates().await?;
    let html = render(
        &state,
        "templates.html",
        context! {
            templates => templates,
            tokens => Token::ALL.iter().map(Token::marker).collect::<Vec<_>>(),
        },
    )?;
    Ok(html.into_response())
}

#[derive(Debug, Deserialize)]
pub struct TemplateForm {
    name: String,
    subject: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    trigger: String,
}

async fn save_template(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
    Path(id): Path<String>,
    Form(form): Form<TemplateForm>,
) -> Result<Redirect, AppError> {
    let template = EmailTemplate {
        id,
        name: form.name,
        subject: form.subject,
        body: form.body,
        trigger: form.trigger.parse().unwrap_or_default(),
        description: form.description,
    };
    console(&state, host).save_template(&template).await?;
    Ok(Redirect::to("/admin/templates"))
}

#[derive(Debug, Default, Deserialize)]
pub struct ComposeQuery {
    notice: Option<String>,
}

async fn compose_page(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
    Query(query): Query<ComposeQuery>,
) -> Result<Response, AppError> {
    let console = console(&state, host);
    let html = render(
        &state,
        "email.html",
        context! {
            templates => console.templates().await?,
            participants => console.participants(SortKey::Name, SortDirection::Asc).await?,
            logs => console.logs().await?,
            notice => query.notice,
        },
    )?;
    Ok(html.into_response())
}

#[derive(Debug, Deserialize)]
pub struct PreviewForm {
    #[serde(default)]
    subject: String,
    #[serde(default)]
    body: String,
}

async fn preview(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
    Form(form): Form<PreviewForm>,
) -> Result<Response, AppError> {
    let message = console(&state, host).preview(&form.subject, &form.body).await?;
    let html = render(
        &state,
        "preview.html",
        context! {
            to => &message.to,
            subject => &message.subject,
            body => message.html(),
        },
    )?;
    Ok(html.into_response())
}

/// What to send and to whom; posted by the compose page and carried through
/// the confirmation page unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct ComposeForm {
    #[serde(default)]
    source: String,
    #[serde(default)]
    template_id: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    filter: String,
    single_id: Option<String>,
    confirmed: Option<String>,
}

impl ComposeForm {
    pub fn composition(&self) -> Composition {
        if self.source == "custom" {
            Composition::Custom {
                subject: self.subject.clone(),
                body: self.body.clone(),
            }
        } else {
            Composition::Template(self.template_id.clone())
        }
    }

    pub fn recipients(&self) -> Result<RecipientFilter, AppError> {
        RecipientFilter::from_form(&self.filter, self.single_id.as_deref())
            .ok_or_else(|| AppError::BadRequest("Keine Empfänger ausgewählt.".to_string()))
    }
}

async fn prepare(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
    Form(form): Form<ComposeForm>,
) -> Result<Response, AppError> {
    let prepared = console(&state, host)
        .prepare(&form.composition(), &form.recipients()?)
        .await?;
    let html = render(
        &state,
        "confirm.html",
        context! {
            prompt => prepared.confirmation_prompt(),
            label => &prepared.label,
            names => &prepared.names,
            first => prepared.messages.first().map(|m| context! { subject => &m.subject, body => m.html() }),
            form => context! {
                source => &form.source,
                template_id => &form.template_id,
                subject => &form.subject,
                body => &form.body,
                filter => &form.filter,
                single_id => &form.single_id,
            },
        },
    )?;
    Ok(html.into_response())
}

async fn send(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
    Form(form): Form<ComposeForm>,
) -> Result<Redirect, AppError> {
    if form.confirmed.as_deref() != Some("yes") {
        return Ok(Redirect::to("/admin/email"));
    }
    let console = console(&state, host);
    let prepared = console
        .prepare(&form.composition(), &form.recipients()?)
        .await?;
    let log = console.dispatch(prepared.confirm()).await?;
    info!(status = %log.status, recipients = log.recipient_count, "dispatch finished");
    Ok(Redirect::to(&format!("/admin/email?notice={}", log.status)))
}
