use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::session::Flash;

/// 303 redirect that queues `notice` for the next rendered page.
///
/// The notice travels in the response extensions; the session layer moves it
/// into the session on the way out.
pub fn redirect_with(notice: Flash, location: &str) -> Response {
    let mut response = Redirect::to(location).into_response();
    response.extensions_mut().insert(notice);
    response
}

/// Rendered page or a plain 500 when the renderer fails
pub fn page(rendered: Result<String, crate::views::ViewError>) -> Response {
    match rendered {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            tracing::error!("Failed to render view: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}
