// User accounts: registration, login, logout
use axum::{
    extract::{Extension, State},
    response::Response,
    Form,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{hash_password, verify_password};
use crate::database::models::User;
use crate::error::{AppError, Rejection, ResultExt};
use crate::middleware::{page, redirect_with};
use crate::session::{Flash, Session};
use crate::state::AppState;
use crate::views::ViewContext;

const LOGIN_PATH: &str = "/users/login";
const REGISTER_PATH: &str = "/users/register";
const MIN_PASSWORD_LEN: usize = 4;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

impl RegisterForm {
    /// Input errors that don't need the store, in display order
    pub fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("Name is required".to_string());
        }
        if self.email.trim().is_empty() {
            errors.push("Email is required".to_string());
        }
        if self.password != self.password2 {
            errors.push("Passwords do not match".to_string());
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(format!("Password must be at least {} characters", MIN_PASSWORD_LEN));
        }
        errors
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn login_form(State(state): State<AppState>, Extension(session): Extension<Session>) -> Response {
    let context = ViewContext::from_session(session.take().await);
    page(state.views.render("users/login", &context))
}

pub async fn register_form(State(state): State<AppState>, Extension(session): Extension<Session>) -> Response {
    let context = ViewContext::from_session(session.take().await);
    page(state.views.render("users/register", &context))
}

pub async fn register(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, Rejection> {
    let mut errors = form.errors();
    if !form.email.trim().is_empty()
        && User::find_by_email(state.store.as_ref(), &form.email)
            .await
            .or_redirect(REGISTER_PATH)?
            .is_some()
    {
        errors.push("Email already registered".to_string());
    }

    if !errors.is_empty() {
        let context = ViewContext::from_session(session.take().await)
            .with("errors", errors)
            .with("form", json!({ "name": form.name, "email": form.email }));
        return Ok(page(state.views.render("users/register", &context)));
    }

    let password_hash = hash_password(&form.password)
        .map_err(|e| AppError::Internal(e.to_string()))
        .or_redirect(REGISTER_PATH)?;
    let user = User::insert(state.store.as_ref(), &form.name, &form.email, password_hash)
        .await
        .or_redirect(REGISTER_PATH)?;

    tracing::info!("Registered user {}", user.id);
    Ok(redirect_with(
        Flash::success("You are now registered and can log in"),
        LOGIN_PATH,
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<LoginForm>,
) -> Result<Response, Rejection> {
    let user = User::find_by_email(state.store.as_ref(), &form.email)
        .await
        .or_redirect(LOGIN_PATH)?;

    let verified = user.filter(|user| match verify_password(&form.password, &user.password_hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::error!("Stored password hash for user {} is unreadable: {}", user.id, e);
            false
        }
    });

    match verified {
        Some(user) => {
            tracing::info!("User {} logged in", user.id);
            session.sign_in(user.session_user()).await;
            Ok(redirect_with(Flash::success("You are now logged in"), "/"))
        }
        None => {
            tracing::debug!("Failed login attempt");
            Ok(redirect_with(Flash::login_failure("Invalid email or password"), LOGIN_PATH))
        }
    }
}

pub async fn logout(Extension(session): Extension<Session>) -> Response {
    session.sign_out().await;
    redirect_with(Flash::success("You are logged out"), LOGIN_PATH)
}
