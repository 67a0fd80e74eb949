// Handler error types
//
// Every handler-local failure ends as a flash notice plus a redirect, never an
// HTTP error status. `AppError` is the taxonomy; `Rejection` pairs an error
// with the notice text and redirect target the user sees.
use axum::response::{IntoResponse, Response};
use std::borrow::Cow;

use crate::database::StoreError;
use crate::middleware::response::redirect_with;
use crate::schema::ValidationError;
use crate::session::Flash;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Required field missing, empty, or not castable
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No signed-in user
    #[error("Not Authorized")]
    Unauthenticated,

    /// Record owned by another user, or not found
    #[error("Not Authorized")]
    Forbidden,

    /// Dependent record requested before an academic year was selected
    #[error("Academic year not selected")]
    YearNotSelected,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Notice text safe to show the user
    pub fn notice(&self) -> Cow<'static, str> {
        match self {
            AppError::Store(_) | AppError::Internal(_) => Cow::Borrowed("Something went wrong, please try again"),
            other => Cow::Owned(other.to_string()),
        }
    }

    pub fn redirect(self, location: impl Into<String>) -> Rejection {
        Rejection {
            notice: self.notice().into_owned(),
            location: location.into(),
            error: self,
        }
    }
}

/// A failed request: logged, then answered with an error notice and a redirect
#[derive(Debug)]
pub struct Rejection {
    pub error: AppError,
    pub notice: String,
    pub location: String,
}

impl Rejection {
    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = notice.into();
        self
    }
}

impl From<AppError> for Rejection {
    fn from(error: AppError) -> Self {
        error.redirect("/")
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match &self.error {
            // Don't expose store errors to clients
            e @ (AppError::Store(_) | AppError::Internal(_)) => {
                tracing::error!("Request failed, redirecting to {}: {}", self.location, e)
            }
            e => tracing::debug!("Request rejected, redirecting to {}: {}", self.location, e),
        }
        redirect_with(Flash::error(self.notice), &self.location)
    }
}

/// Attach a redirect target (and optionally a fixed notice) to a failing result
pub trait ResultExt<T> {
    fn or_redirect(self, location: &str) -> Result<T, Rejection>;
    fn or_redirect_with(self, location: &str, notice: &str) -> Result<T, Rejection>;
}

impl<T, E: Into<AppError>> ResultExt<T> for Result<T, E> {
    fn or_redirect(self, location: &str) -> Result<T, Rejection> {
        self.map_err(|e| e.into().redirect(location))
    }

    fn or_redirect_with(self, location: &str, notice: &str) -> Result<T, Rejection> {
        self.map_err(|e| {
            let error = e.into();
            // Server-side failures keep the generic notice
            if matches!(error, AppError::Store(_) | AppError::Internal(_)) {
                error.redirect(location)
            } else {
                error.redirect(location).with_notice(notice)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use uuid::Uuid;

    #[test]
    fn rejection_is_a_see_other_redirect_with_error_flash() {
        let response = AppError::Forbidden.redirect("/").into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
        assert_eq!(response.extensions().get::<Flash>(), Some(&Flash::error("Not Authorized")));
    }

    #[test]
    fn store_errors_are_not_exposed() {
        let error = AppError::Store(StoreError::NotFound {
            collection: "swayam".into(),
            id: Uuid::nil(),
        });
        assert_eq!(error.notice(), "Something went wrong, please try again");
    }

    #[test]
    fn custom_notice_overrides_validation_message() {
        let result: Result<(), ValidationError> = Err(ValidationError::MissingRequiredField {
            field: "academic_year",
            label: "Academic year",
        });
        let rejection = result.or_redirect_with("/", "Academic year not selected").unwrap_err();
        assert_eq!(rejection.notice, "Academic year not selected");
        assert_eq!(rejection.location, "/");
    }
}
