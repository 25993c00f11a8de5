//! HTTP route handlers.

pub mod admin;
pub mod category;
pub mod file;
pub mod front;
pub mod health;
pub mod helpers;
pub mod page;
pub mod post;
pub mod static_files;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderValue, Method, Uri};
use axum::response::{IntoResponse, Response};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;
use crate::error::AppError;
use crate::state::AppState;

/// Message for unknown API paths.
pub const API_NOT_FOUND: &str = "পাওয়া যায়নি";

/// Build the complete application router.
pub fn app_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .merge(front::router())
        .merge(post::router())
        .merge(admin::router())
        .merge(category::router())
        .merge(page::router())
        .merge(file::router())
        .merge(health::router())
        .merge(static_files::router())
        .fallback(fallback)
        // Middleware layers (last added = first executed in request flow):
        // TraceLayer → CORS → compression → routes
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// JSON 404 under `/api`, the themed 404 page everywhere else.
async fn fallback(State(state): State<AppState>, uri: Uri) -> Response {
    if uri.path().starts_with("/api/") {
        return AppError::not_found(API_NOT_FOUND).into_response();
    }
    helpers::render_not_found(&state, uri.path())
}

/// Build the CORS layer from the configured origins.
///
/// A single `*` allows any origin without credentials; anything else is an
/// explicit allow-list.
pub fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.cors_allowed_origins.len() == 1 && config.cors_allowed_origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([axum::http::header::CONTENT_TYPE])
            .allow_credentials(true)
    }
}
