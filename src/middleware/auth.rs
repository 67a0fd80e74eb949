use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::session::Session;

/// Authentication gate for routes that need a signed-in user
///
/// Proceeds with the [`SessionUser`](crate::session::SessionUser) injected into
/// request extensions, or redirects to `/` with "Not Authorized".
pub async fn ensure_authenticated(Extension(session): Extension<Session>, mut request: Request, next: Next) -> Response {
    match session.user().await {
        Some(user) => {
            tracing::debug!("Authenticated request for user {}", user.id);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => AppError::Unauthenticated.redirect("/").into_response(),
    }
}
