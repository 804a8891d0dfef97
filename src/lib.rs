pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::state::SharedState;

/// Build the full HTTP application around `state`.
pub fn app(state: SharedState) -> Router {
    let server = &state.config.server;

    let mut router = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .fallback(handlers::public::not_found)
        .layer(DefaultBodyLimit::max(server.max_request_size_bytes));

    if let Some(cors) = cors_layer(&state.config.security) {
        router = router.layer(cors);
    }
    if server.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn public_routes() -> Router<SharedState> {
    use handlers::public::{self, auth};

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/users", post(auth::register_post))
        .route("/login", post(auth::login_post))
}

fn protected_routes(state: SharedState) -> Router<SharedState> {
    use handlers::protected::{auth, folders, notes, tags};

    Router::new()
        .route("/refresh", post(auth::refresh_post))
        .route("/folders", get(folders::list).post(folders::create))
        .route(
            "/folders/:id",
            get(folders::get).put(folders::update).delete(folders::delete),
        )
        .route("/tags", get(tags::list).post(tags::create))
        .route("/tags/:id", get(tags::get).put(tags::update).delete(tags::delete))
        .route("/notes", get(notes::list).post(notes::create))
        .route("/notes/:id", get(notes::get).put(notes::update).delete(notes::delete))
        // route_layer keeps unknown paths on the 404 fallback instead of a 401
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::jwt_auth_middleware,
        ))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::LOCATION]);

    if security.cors_origins.iter().any(|o| o == "*") {
        return Some(layer.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(layer.allow_origin(AllowOrigin::list(origins)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::Repositories;
    use crate::state::AppState;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> Router {
        app(AppState::new(AppConfig::testing(), Repositories::memory()).unwrap())
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let response = test_app()
            .oneshot(Request::get("/folders").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let response = test_app()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_backend() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn cors_can_be_disabled() {
        let mut security = AppConfig::testing().security;
        security.enable_cors = false;
        assert!(cors_layer(&security).is_none());
    }
}
