//! Route configuration.

use crate::handlers;
use crate::ratelimit::admission_middleware;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::middleware;
use axum::routing::{get, post, put};
use deaddrop_core::config::CorsConfig;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let rate_limit = state.rate_limit.clone();

    let mut router = Router::new()
        .route("/code", post(handlers::issue_code))
        .route(
            "/message/{code}",
            put(handlers::put_message).get(handlers::get_message),
        )
        // Liveness probe (intentionally storage-free and exempt from
        // admission control).
        .route("/health", get(handlers::health_check))
        // Middleware layers are applied in reverse order (outermost last).
        // Execution order: TraceLayer -> defensive headers -> CORS ->
        // admission -> request timeout -> body cap -> handler.
        .layer(DefaultBodyLimit::max(
            usize::try_from(state.config.server.max_body_bytes).unwrap_or(usize::MAX),
        ))
        .layer(TimeoutLayer::new(state.config.server.request_timeout()))
        .layer(middleware::from_fn_with_state(
            rate_limit,
            admission_middleware,
        ));

    if let Some(cors) = cors_layer(&state.config.cors) {
        router = router.layer(cors);
    }

    // Defensive headers go on every response, success or failure, by being
    // a uniform layer rather than per-handler code.
    router
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the CORS layer from the configured origin allow-list.
///
/// Returns `None` when the list is empty (CORS disabled).
fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if config.allowed_origins.is_empty() {
        return None;
    }

    let methods = [Method::GET, Method::POST, Method::PUT, Method::OPTIONS];
    let layer = if config.is_wildcard() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(origin, error = %e, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Some(layer)
}
