use axum::{
    Router,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::Form;
use chrono::Utc;
use minijinja::context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::render;
use crate::allergies::AllergySplit;
use crate::calendar;
use crate::error::AppError;
use crate::functions::ai::{AVATAR_FAILURE, GREETING};
use crate::guest::{
    FormError, GuestDraft, GuestEditor, GuestError, board, inspirations, toggle_activity_vote,
};
use crate::model::{AvatarStyle, DietaryTags, RsvpStatus};
use crate::router::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/p/{id}", get(page))
        .route("/p/{id}/fields", post(update_fields))
        .route("/p/{id}/save", post(save))
        .route("/p/{id}/attend", post(attend))
        .route("/p/{id}/decline", post(decline))
        .route("/p/{id}/maybe", post(maybe))
        .route("/p/{id}/reopen", post(reopen))
        .route("/p/{id}/wizard/next", post(wizard_next))
        .route("/p/{id}/wizard/back", post(wizard_back))
        .route("/p/{id}/wizard/cancel", post(wizard_cancel))
        .route("/p/{id}/wizard/finish", post(wizard_finish))
        .route("/p/{id}/avatar", post(generate_avatar))
        .route("/p/{id}/activities/{activity_id}/vote", post(vote))
        .route("/p/{id}/calendar.ics", get(download_calendar))
}

async fn editor(state: &AppState, id: &str) -> Result<GuestEditor, AppError> {
    state.editors.get(id).await?.ok_or(AppError::NotFound)
}

fn back_to(id: &str) -> Redirect {
    Redirect::to(&format!("/p/{id}"))
}

#[derive(Debug, Serialize)]
struct StyleOption {
    value: &'static str,
    label: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    notice: Option<String>,
}

fn notice_text(notice: Option<&str>) -> Option<&'static str> {
    match notice? {
        "avatar_failed" => Some(AVATAR_FAILURE),
        "saved" => Some("Gespeichert!"),
        _ => None,
    }
}

async fn page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let editor = editor(&state, &id).await?;
    let form = editor.form().await;
    let participants = state.store.list_participants().await?;
    let config = state.store.load_config().await?;

    let draft = form.draft();
    let preview = draft.to_participant(form.participant(), draft.status, config.allow_plus_one);
    let attending = participants.iter().filter(|p| p.is_attending()).count();
    let styles: Vec<StyleOption> = AvatarStyle::ALL
        .iter()
        .map(|s| StyleOption {
            value: s.as_str(),
            label: s.label(),
        })
        .collect();

    let template = if form.is_onboarding() {
        "wizard.html"
    } else {
        "guest.html"
    };
    let html = render(
        &state,
        template,
        context! {
            participant => form.participant(),
            draft => draft,
            avatar_url => preview.avatar_url(),
            step => form.step().map(|s| context! { number => s.number(), title => s.title() }),
            dish_error => form.dish_error(),
            held => form.is_held(),
            locked => form.is_locked(),
            has_changes => form.has_changes(),
            config => &config,
            categories => config.active_categories().map(|c| c.name.clone()).collect::<Vec<_>>(),
            ideas => inspirations(&draft.food.category, &participants, &config),
            buffet => board(&participants, &config),
            attending => attending,
            styles => styles,
            greeting => GREETING,
            notice => notice_text(query.notice.as_deref()),
        },
    )?;
    Ok(html.into_response())
}

/// A posted guest form. Each form names the `section`s it carries so that
/// unticked checkboxes clear only the fields that were on the page.
#[derive(Debug, Default, Deserialize)]
pub struct GuestFields {
    #[serde(default)]
    section: Vec<String>,
    avatar_style: Option<String>,
    avatar_seed: Option<String>,
    #[serde(default)]
    allergies: Vec<String>,
    #[serde(default)]
    allergies_custom: String,
    has_plus_one: Option<String>,
    #[serde(default)]
    plus_one: String,
    #[serde(default)]
    plus_one_allergies: Vec<String>,
    #[serde(default)]
    plus_one_allergies_custom: String,
    #[serde(default)]
    food_name: String,
    food_category: Option<String>,
    #[serde(default)]
    food_description: String,
    #[serde(default)]
    tags: Vec<String>,
    show_name_in_buffet: Option<String>,
    is_secret_santa: Option<String>,
    wants_invoice: Option<String>,
    #[serde(default)]
    contribution: String,
    #[serde(default)]
    notes: String,
}

impl GuestFields {
    fn carries(&self, section: &str) -> bool {
        self.section.iter().any(|s| s == section)
    }

    pub fn apply(self, draft: &mut GuestDraft) {
        if self.carries("profile") {
            if let Some(style) = self.avatar_style.as_deref().and_then(|s| s.parse().ok()) {
                if style != draft.avatar_style {
                    draft.choose_style(style);
                }
            }
            if let Some(seed) = self.avatar_seed.as_deref().map(str::trim) {
                if !seed.is_empty() {
                    draft.avatar_seed = seed.to_string();
                }
            }
        }
        if self.carries("allergies") {
            draft.allergies = AllergySplit {
                selection: self.allergies.clone(),
                custom: self.allergies_custom.clone(),
            };
        }
        if self.carries("plus_one") {
            draft.has_plus_one = self.has_plus_one.is_some();
            draft.plus_one = self.plus_one.clone();
            draft.plus_one_allergies = AllergySplit {
                selection: self.plus_one_allergies.clone(),
                custom: self.plus_one_allergies_custom.clone(),
            };
        }
        if self.carries("buffet") {
            draft.food.name = self.food_name.clone();
            if let Some(category) = self.food_category.clone() {
                draft.food.category = category;
            }
            draft.food.description = self.food_description.clone();
            let tagged = |tag: &str| self.tags.iter().any(|t| t == tag);
            draft.food.tags = DietaryTags {
                is_vegan: tagged("is_vegan"),
                is_gluten_free: tagged("is_gluten_free"),
                is_lactose_free: tagged("is_lactose_free"),
                contains_alcohol: tagged("contains_alcohol"),
                contains_nuts: tagged("contains_nuts"),
            };
            draft.show_name_in_buffet = self.show_name_in_buffet.is_some();
        }
        if self.carries("details") {
            draft.is_secret_santa = self.is_secret_santa.is_some();
            draft.wants_invoice = self.wants_invoice.is_some();
            draft.contribution = self.contribution;
            draft.notes = self.notes;
        }
    }
}

async fn update_fields(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(fields): Form<GuestFields>,
) -> Result<Redirect, AppError> {
    editor(&state, &id).await?.edit(|draft| fields.apply(draft)).await?;
    Ok(back_to(&id))
}

async fn save(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(fields): Form<GuestFields>,
) -> Result<Redirect, AppError> {
    let editor = editor(&state, &id).await?;
    editor.edit(|draft| fields.apply(draft)).await?;
    match editor.manual_save().await {
        Ok(_) => Ok(Redirect::to(&format!("/p/{id}?notice=saved"))),
        // Shown inline next to the dish field.
        Err(GuestError::Form(FormError::DishRequired)) => Ok(back_to(&id)),
        Err(err) => Err(err.into()),
    }
}

async fn attend(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect, AppError> {
    editor(&state, &id).await?.attend().await?;
    Ok(back_to(&id))
}

async fn decline(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect, AppError> {
    editor(&state, &id).await?.decline().await?;
    Ok(back_to(&id))
}

async fn maybe(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect, AppError> {
    editor(&state, &id).await?.maybe().await?;
    Ok(back_to(&id))
}

async fn reopen(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect, AppError> {
    editor(&state, &id).await?.reopen().await?;
    Ok(back_to(&id))
}

async fn wizard_next(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(fields): Form<GuestFields>,
) -> Result<Redirect, AppError> {
    let editor = editor(&state, &id).await?;
    editor.edit(|draft| fields.apply(draft)).await?;
    match editor.next_step().await {
        Ok(_) | Err(FormError::DishRequired) => Ok(back_to(&id)),
        Err(err) => Err(err.into()),
    }
}

async fn wizard_back(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(fields): Form<GuestFields>,
) -> Result<Redirect, AppError> {
    let editor = editor(&state, &id).await?;
    editor.edit(|draft| fields.apply(draft)).await?;
    editor.previous_step().await?;
    Ok(back_to(&id))
}

async fn wizard_cancel(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect, AppError> {
    editor(&state, &id).await?.cancel_onboarding().await;
    Ok(back_to(&id))
}

async fn wizard_finish(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(fields): Form<GuestFields>,
) -> Result<Redirect, AppError> {
    let editor = editor(&state, &id).await?;
    editor.edit(|draft| fields.apply(draft)).await?;
    match editor.finish_onboarding().await {
        Ok(saved) => {
            info!(id = %saved.id, "onboarding finished");
            Ok(back_to(&id))
        }
        Err(GuestError::Form(FormError::DishRequired)) => Ok(back_to(&id)),
        Err(err) => Err(err.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct AvatarPrompt {
    #[serde(default)]
    prompt: String,
}

async fn generate_avatar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(AvatarPrompt { prompt }): Form<AvatarPrompt>,
) -> Result<Redirect, AppError> {
    let editor = editor(&state, &id).await?;
    if prompt.trim().is_empty() {
        return Ok(back_to(&id));
    }
    match state.ai.generate_avatar(prompt.trim()).await {
        Ok(image) => {
            editor.edit(|draft| draft.avatar_image = image).await?;
            Ok(back_to(&id))
        }
        Err(err) => {
            warn!(%id, %err, "avatar generation failed");
            Ok(Redirect::to(&format!("/p/{id}?notice=avatar_failed")))
        }
    }
}

async fn vote(
    State(state): State<AppState>,
    Path((id, activity_id)): Path<(String, String)>,
) -> Result<Redirect, AppError> {
    let participant = state
        .store
        .find_participant(&id)
        .await?
        .ok_or(AppError::NotFound)?;
    if participant.status != RsvpStatus::Attending {
        return Err(AppError::BadRequest(
            "Abstimmen können nur Gäste, die dabei sind.".to_string(),
        ));
    }
    toggle_activity_vote(state.store.as_ref(), &activity_id, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(back_to(&id))
}

async fn download_calendar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state
        .store
        .find_participant(&id)
        .await?
        .ok_or(AppError::NotFound)?;
    let config = state.store.load_config().await?;
    let body = calendar::ics(&config, Utc::now());
    Ok((
        [
            (header::CONTENT_TYPE, calendar::CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", calendar::FILENAME),
            ),
        ],
        body,
    )
        .into_response())
}
