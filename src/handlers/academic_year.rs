// Root resource: academic-year selection
//
// GET  /          list the user's academic years (anonymous: landing page)
// GET  /edit/:id  edit form for an owned year
// POST /          create a year and make it the session's current year
// PUT  /:id       update an owned year and make it current
use axum::{
    extract::{Extension, Path, State},
    response::Response,
    Form,
};
use serde_json::Map;
use std::collections::HashMap;

use super::access::load_owned;
use super::annexure::{carry_year, YEAR_FIELD};
use crate::database::DocumentQuery;
use crate::error::{Rejection, ResultExt};
use crate::middleware::{page, redirect_with};
use crate::schema::catalog::{ACADEMIC_YEAR, TEACHING_LOAD_PATH};
use crate::session::{Flash, Session, SessionUser};
use crate::state::AppState;
use crate::views::ViewContext;

pub async fn index(State(state): State<AppState>, Extension(session): Extension<Session>) -> Response {
    let years = match session.user().await {
        Some(user) => Some(
            state
                .collection(&ACADEMIC_YEAR)
                .list(&DocumentQuery::owned_by(user.id))
                .await,
        ),
        None => None,
    };

    let mut context = ViewContext::from_session(session.take().await);
    match years {
        Some(Ok(years)) => context = context.with("result", years),
        // Rendering here instead of redirecting: the redirect target is this page
        Some(Err(e)) => {
            tracing::error!("Failed to list academic years: {}", e);
            context.error_msg.push(e.notice().into_owned());
        }
        None => {}
    }

    page(state.views.render("index", &context))
}

pub async fn edit(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
) -> Result<Response, Rejection> {
    let years = state.collection(&ACADEMIC_YEAR);
    let record = load_owned(&years, &user, &id).await.or_redirect("/")?;

    let context = ViewContext::from_session(session.take().await).with("editResult", &record);
    Ok(page(state.views.render("index", &context)))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(user): Extension<SessionUser>,
    Form(input): Form<HashMap<String, String>>,
) -> Result<Response, Rejection> {
    let record = state
        .collection(&ACADEMIC_YEAR)
        .create(user.id, &input, Map::new())
        .await
        .or_redirect_with("/", "Academic year not selected")?;

    let year = record.get_str(YEAR_FIELD).unwrap_or_default().to_string();
    tracing::info!("User {} selected academic year {} ({})", user.id, year, record.id);
    session.select_year(year).await;

    Ok(redirect_with(Flash::success("Academic year selected"), TEACHING_LOAD_PATH))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
    Form(input): Form<HashMap<String, String>>,
) -> Result<Response, Rejection> {
    let years = state.collection(&ACADEMIC_YEAR);
    let record = load_owned(&years, &user, &id).await.or_redirect("/")?;
    let previous = record.get_str(YEAR_FIELD).unwrap_or_default().to_string();
    let updated = years.update(&record, &input).await.or_redirect("/")?;

    let year = updated.get_str(YEAR_FIELD).unwrap_or_default().to_string();
    tracing::info!("User {} updated academic year {} to {}", user.id, updated.id, year);
    if year != previous {
        let moved = carry_year(&state, user.id, &previous, &year).await.or_redirect("/")?;
        tracing::debug!("Moved {} entries from {} to {}", moved, previous, year);
    }
    session.select_year(year).await;

    Ok(redirect_with(Flash::success("Data updated successfully"), TEACHING_LOAD_PATH))
}
