use axum::{
    extract::{Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{generate_session_token, validate_session_token, AuthError, SessionClaims};
use crate::session::{Flash, Session};
use crate::state::AppState;

/// Session middleware that resolves the session cookie and injects the session handle
///
/// A missing, forged, expired or unknown token yields a detached session that
/// is only stored once something is written to it. Whenever a server-side
/// entry exists after the handler ran, the cookie is re-issued so its expiry
/// slides with the entry. A [`Flash`] left in the response extensions by the
/// handler is queued on the session.
pub async fn session_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let settings = &state.config.session;

    let resumed = match session_cookie(request.headers(), &settings.cookie_name) {
        Some(token) => match validate_session_token(&token, &settings.secret) {
            Ok(claims) => state.sessions.load(claims.sid).await,
            Err(e) => {
                tracing::debug!("Discarding session cookie: {}", e);
                None
            }
        },
        None => None,
    };
    let session = match resumed {
        Some(session) => session,
        None => state.sessions.detached(),
    };

    request.extensions_mut().insert(session.clone());
    let mut response = next.run(request).await;

    if let Some(notice) = response.extensions_mut().remove::<Flash>() {
        session.flash(notice).await;
    }

    if let Some(sid) = session.id().await {
        match session_cookie_header(&state, sid) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Failed to issue session cookie: {}", e),
        }
    }

    response
}

/// Extract a cookie value by name from the Cookie header(s)
fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

fn session_cookie_header(state: &AppState, sid: Uuid) -> Result<HeaderValue, AuthError> {
    let settings = &state.config.session;
    let ttl = state.sessions.ttl();
    let token = generate_session_token(&SessionClaims::new(sid, ttl), &settings.secret)?;

    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        settings.cookie_name,
        token,
        ttl.num_seconds()
    );
    if settings.secure_cookie {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; appraisal_session=abc.def.ghi"));
        assert_eq!(session_cookie(&headers, "appraisal_session").as_deref(), Some("abc.def.ghi"));
        assert_eq!(session_cookie(&headers, "missing"), None);
    }

    #[test]
    fn reads_across_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("appraisal_session=token"));
        assert_eq!(session_cookie(&headers, "appraisal_session").as_deref(), Some("token"));
    }
}
