use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::admin::{AdminError, ValidationError};
use crate::functions::FunctionError;
use crate::guest::{FormError, GuestError};
use crate::store::StoreError;

const TRANSIENT_MESSAGE: &str =
    "Das hat gerade nicht geklappt. Bitte versuche es in einem Moment noch einmal.";
const POLICY_MESSAGE: &str = "Die Datenbank hat die Änderung abgelehnt. Bitte prüfe die \
     Zugriffsregeln (Row Level Security) der Tabelle, sie blockieren vermutlich diese Aktion.";

/// Everything a handler can fail with, mapped to a status code and a message
/// the person in front of the page can act on.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Nicht gefunden.")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Function(#[from] FunctionError),

    #[error(transparent)]
    Template(#[from] minijinja::Error),
}

impl From<GuestError> for AppError {
    fn from(err: GuestError) -> Self {
        match err {
            GuestError::Form(err) => AppError::Form(err),
            GuestError::Store(err) => AppError::Store(err),
        }
    }
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Validation(err) => AppError::Validation(err),
            AdminError::Store(err) => AppError::Store(err),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Form(FormError::Locked) => StatusCode::FORBIDDEN,
            AppError::Form(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(err) if err.is_policy() => StatusCode::FORBIDDEN,
            AppError::Store(_) | AppError::Function(_) => StatusCode::BAD_GATEWAY,
            AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The localized text shown to the user.
    pub fn message(&self) -> String {
        match self {
            AppError::Store(StoreError::NotFound(_)) => AppError::NotFound.to_string(),
            AppError::Store(err) if err.is_policy() => POLICY_MESSAGE.to_string(),
            AppError::Store(_) | AppError::Function(_) | AppError::Template(_) => {
                TRANSIENT_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() || status == StatusCode::FORBIDDEN {
            error!(err = %self, "request failed");
        } else {
            warn!(err = %self, "request rejected");
        }
        (status, self.message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_failures_carry_operator_guidance() {
        let err = AppError::from(StoreError::DeleteNotApplied { id: "abc".into() });
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert!(err.message().contains("Zugriffsregeln"));
    }

    #[test]
    fn validation_messages_are_shown_verbatim() {
        let err = AppError::from(AdminError::Validation(ValidationError::NoRecipients));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message(), "Keine Empfänger ausgewählt.");
    }

    #[test]
    fn missing_rows_are_not_found() {
        let err = AppError::from(GuestError::Store(StoreError::NotFound("x".into())));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Nicht gefunden.");
    }
}
