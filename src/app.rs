use axum::{
    extract::Request,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower::{
    util::{MapRequest, MapRequestLayer},
    Layer,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::handlers::{academic_year, annexure, health, users};
use crate::middleware::{ensure_authenticated, method_override, session_middleware};
use crate::schema::catalog::RESOURCES;
use crate::state::AppState;

/// The router wrapped in method override, which must run before routing
pub type AppService = MapRequest<Router, fn(Request) -> Request>;

pub fn service(state: AppState) -> AppService {
    MapRequestLayer::new(method_override as fn(Request) -> Request).layer(app(state))
}

pub fn app(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        // Public
        .route("/", get(academic_year::index))
        .route("/health", get(health::health))
        .merge(user_routes())
        // Gated
        .merge(academic_year_routes())
        .merge(annexure_routes())
        // Global middleware
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .nest_service("/public", static_dir)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/login", get(users::login_form).post(users::login))
        .route("/users/register", get(users::register_form).post(users::register))
        .route("/users/logout", get(users::logout))
}

fn academic_year_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(academic_year::create))
        .route("/edit/:id", get(academic_year::edit))
        .route_layer(from_fn(ensure_authenticated))
        // `/:id` captures every single-segment path; anything but PUT is unknown
        .route(
            "/:id",
            put(academic_year::update)
                .route_layer(from_fn(ensure_authenticated))
                .fallback(not_found),
        )
}

fn annexure_routes() -> Router<AppState> {
    RESOURCES
        .iter()
        .fold(Router::new(), |router, resource| router.merge(annexure::routes(resource)))
        .route_layer(from_fn(ensure_authenticated))
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::memory::MemoryDocumentStore;
    use crate::views::HtmlRenderer;
    use axum::{body::Body, http::header, response::Response};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn test_service() -> AppService {
        let state = AppState::new(
            AppConfig::development(),
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(HtmlRenderer),
        );
        service(state)
    }

    fn request(method: &str, uri: &str) -> Request {
        Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
    }

    fn cookie(response: &Response) -> Option<String> {
        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }

    fn form(uri: &str, cookie: Option<&str>, body: &str) -> Request {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn untouched_sessions_issue_no_cookie() {
        let service = test_service();

        let landing = service.clone().oneshot(request("GET", "/")).await.unwrap();
        assert_eq!(landing.status(), StatusCode::OK);
        assert!(cookie(&landing).is_none());

        let health = service.oneshot(request("GET", "/health")).await.unwrap();
        assert!(cookie(&health).is_none());
    }

    #[tokio::test]
    async fn a_queued_notice_issues_a_session_cookie() {
        let response = test_service().oneshot(request("POST", "/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(cookie(&response).is_some_and(|c| c.starts_with("appraisal_session=")));
    }

    #[tokio::test]
    async fn login_replaces_the_pre_login_session() {
        let service = test_service();

        let registered = service
            .clone()
            .oneshot(form(
                "/users/register",
                None,
                "name=Asha&email=asha%40example.edu&password=pass1234&password2=pass1234",
            ))
            .await
            .unwrap();
        let anonymous = cookie(&registered).unwrap();

        let logged_in = service
            .clone()
            .oneshot(form(
                "/users/login",
                Some(&anonymous),
                "email=asha%40example.edu&password=pass1234",
            ))
            .await
            .unwrap();
        assert_eq!(logged_in.headers()[header::LOCATION], "/");
        let authenticated = cookie(&logged_in).unwrap();
        assert_ne!(anonymous, authenticated);

        // The pre-login cookie no longer reaches the signed-in session
        let mut stale = request("GET", "/academicPerformance/teachingLoad");
        stale.headers_mut().insert(header::COOKIE, anonymous.parse().unwrap());
        let response = service.oneshot(stale).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn overridden_put_reaches_the_gated_route() {
        let uri = format!("/{}?_method=PUT", Uuid::new_v4());
        let response = test_service().oneshot(request("POST", &uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn unknown_single_segment_paths_are_not_found() {
        let service = test_service();

        let favicon = service.clone().oneshot(request("GET", "/favicon.ico")).await.unwrap();
        assert_eq!(favicon.status(), StatusCode::NOT_FOUND);

        let uri = format!("/{}", Uuid::new_v4());
        let plain_post = service.clone().oneshot(request("POST", &uri)).await.unwrap();
        assert_eq!(plain_post.status(), StatusCode::NOT_FOUND);

        let nested = service.oneshot(request("GET", "/no/such/page")).await.unwrap();
        assert_eq!(nested.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn annexure_routes_are_gated() {
        let response = test_service()
            .oneshot(request("GET", "/annexure-2/swayam"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }
}
