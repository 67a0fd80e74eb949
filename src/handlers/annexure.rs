// Annexure sub-resources
//
// Every entry of the resource catalog gets the same four routes:
//   GET  {path}           list the user's entries (current year only, if year-scoped)
//   POST {path}           create an entry
//   GET  {path}/edit/:id  edit form for an owned entry
//   PUT  {path}/:id       update an owned entry
use axum::{
    extract::{Extension, Path, State},
    response::Response,
    routing::{get, put},
    Form, Router,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

use super::access::{current_year, load_owned};
use crate::database::DocumentQuery;
use crate::error::{AppError, Rejection, ResultExt};
use crate::middleware::{page, redirect_with};
use crate::schema::catalog::{Resource, ACADEMIC_YEAR, RESOURCES};
use crate::session::{Flash, Session, SessionUser};
use crate::state::AppState;
use crate::views::ViewContext;

pub const YEAR_FIELD: &str = "academic_year";

pub fn routes(resource: &'static Resource) -> Router<AppState> {
    Router::new()
        .route(
            resource.path,
            get(
                move |State(state): State<AppState>,
                      Extension(session): Extension<Session>,
                      Extension(user): Extension<SessionUser>| list(resource, state, session, user),
            )
            .post(
                move |State(state): State<AppState>,
                      Extension(session): Extension<Session>,
                      Extension(user): Extension<SessionUser>,
                      Form(input): Form<HashMap<String, String>>| {
                    create(resource, state, session, user, input)
                },
            ),
        )
        .route(
            &format!("{}/edit/:id", resource.path),
            get(
                move |State(state): State<AppState>,
                      Extension(session): Extension<Session>,
                      Extension(user): Extension<SessionUser>,
                      Path(id): Path<String>| edit(resource, state, session, user, id),
            ),
        )
        .route(
            &format!("{}/:id", resource.path),
            put(
                move |State(state): State<AppState>,
                      Extension(user): Extension<SessionUser>,
                      Path(id): Path<String>,
                      Form(input): Form<HashMap<String, String>>| update(resource, state, user, id, input),
            ),
        )
}

fn describe(resource: &Resource) -> Value {
    json!({
        "title": resource.title,
        "path": resource.path,
        "fields": resource.schema.fields,
    })
}

pub async fn list(
    resource: &'static Resource,
    state: AppState,
    session: Session,
    user: SessionUser,
) -> Result<Response, Rejection> {
    let year = current_year(resource, &session).await.or_redirect("/")?;

    let mut query = DocumentQuery::owned_by(user.id);
    if let Some(year) = year {
        query = query.field(YEAR_FIELD, year);
    }
    let entries = state.collection(resource.schema).list(&query).await.or_redirect("/")?;

    let context = ViewContext::from_session(session.take().await)
        .with("resource", describe(resource))
        .with("result", entries);
    Ok(page(state.views.render("annexure", &context)))
}

pub async fn create(
    resource: &'static Resource,
    state: AppState,
    session: Session,
    user: SessionUser,
    input: HashMap<String, String>,
) -> Result<Response, Rejection> {
    let year = current_year(resource, &session).await.or_redirect("/")?;

    let mut stamp = Map::new();
    if let Some(year) = year {
        stamp.insert(YEAR_FIELD.to_string(), Value::String(year));
    }
    let entry = state
        .collection(resource.schema)
        .create(user.id, &input, stamp)
        .await
        .or_redirect(resource.path)?;

    tracing::info!("User {} added {}/{}", user.id, resource.schema.collection, entry.id);
    Ok(redirect_with(Flash::success("Data added successfully"), resource.path))
}

pub async fn edit(
    resource: &'static Resource,
    state: AppState,
    session: Session,
    user: SessionUser,
    id: String,
) -> Result<Response, Rejection> {
    let collection = state.collection(resource.schema);
    let entry = load_owned(&collection, &user, &id).await.or_redirect(resource.path)?;

    let context = ViewContext::from_session(session.take().await)
        .with("resource", describe(resource))
        .with("editResult", entry);
    Ok(page(state.views.render("annexure", &context)))
}

pub async fn update(
    resource: &'static Resource,
    state: AppState,
    user: SessionUser,
    id: String,
    input: HashMap<String, String>,
) -> Result<Response, Rejection> {
    let collection = state.collection(resource.schema);
    let entry = load_owned(&collection, &user, &id).await.or_redirect(resource.path)?;
    let updated = collection
        .update(&entry, &input)
        .await
        .or_redirect(&resource.edit_path(entry.id))?;

    tracing::info!("User {} updated {}/{}", user.id, resource.schema.collection, updated.id);
    Ok(redirect_with(Flash::success("Data updated successfully"), resource.path))
}

/// Carry year-scoped entries stamped `from` over to `to` after one of the
/// owner's years was renamed. Nothing moves while another of the owner's
/// years still carries `from`, since those entries belong to it as well.
pub async fn carry_year(state: &AppState, owner: Uuid, from: &str, to: &str) -> Result<usize, AppError> {
    let stamped = DocumentQuery::owned_by(owner).field(YEAR_FIELD, from);
    if !state.collection(&ACADEMIC_YEAR).list(&stamped).await?.is_empty() {
        return Ok(0);
    }

    let mut moved = 0;
    for resource in RESOURCES.iter().filter(|r| r.year_scoped) {
        moved += state
            .collection(resource.schema)
            .restamp(&stamped, YEAR_FIELD, to)
            .await?;
    }
    Ok(moved)
}
