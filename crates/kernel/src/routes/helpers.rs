//! Shared route helpers for page rendering and response headers.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde::de::DeserializeOwned;

pub use crate::content::text::html_escape;
use crate::error::{AppError, AppResult, SERVER_ERROR_MESSAGE};
use crate::state::AppState;

/// Message for request bodies that are not the expected JSON.
pub const INVALID_JSON: &str = "অনুরোধের বডি সঠিক JSON নয়";

/// `Cache-Control` value for admin responses.
pub const NO_STORE: &str = "no-store, max-age=0";

/// Inject site-wide context variables into a Tera context.
///
/// Adds: `site_name`, `site_url`, `current_path`
pub fn inject_site_context(state: &AppState, context: &mut tera::Context, path: &str) {
    let config = state.config();
    context.insert("site_name", &config.site_name);
    context.insert("site_url", config.site_url.trim_end_matches('/'));
    context.insert("current_path", path);
}

/// Render a template with the given status, falling back to a plain error page.
pub fn render_template(
    state: &AppState,
    template: &str,
    context: &tera::Context,
    status: StatusCode,
) -> Response {
    match state.theme().render(template, context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => template_error(template, &e),
    }
}

/// Serve `key` from the response cache, rendering and storing it on a miss.
pub async fn render_cached(
    state: &AppState,
    key: &str,
    tags: &[&str],
    template: &str,
    context: &tera::Context,
) -> Response {
    if let Some(html) = state.cache().get(key).await {
        return Html(html).into_response();
    }
    render_and_cache(state, key, tags, template, context).await
}

/// Render `template` and store the page under `key` without a cache lookup.
pub async fn render_and_cache(
    state: &AppState,
    key: &str,
    tags: &[&str],
    template: &str,
    context: &tera::Context,
) -> Response {
    match state.theme().render(template, context) {
        Ok(html) => {
            state.cache().set(key, html.clone(), tags).await;
            Html(html).into_response()
        }
        Err(e) => template_error(template, &e),
    }
}

/// Render the generic server error page.
pub fn render_server_error(state: &AppState, path: &str) -> Response {
    let mut context = tera::Context::new();
    inject_site_context(state, &mut context, path);
    render_template(
        state,
        "error.html",
        &context,
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}

fn template_error(template: &str, error: &anyhow::Error) -> Response {
    tracing::error!(error = %error, template = %template, "failed to render template");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(format!(
            r#"<!DOCTYPE html>
<html lang="bn"><head><meta charset="utf-8"><title>{SERVER_ERROR_MESSAGE}</title></head>
<body><h1>{SERVER_ERROR_MESSAGE}</h1><p>{}</p></body></html>"#,
            html_escape(template)
        )),
    )
        .into_response()
}

/// Render the 404 page for `path`.
pub fn render_not_found(state: &AppState, path: &str) -> Response {
    let mut context = tera::Context::new();
    inject_site_context(state, &mut context, path);
    render_template(state, "not_found.html", &context, StatusCode::NOT_FOUND)
}

/// Mark a response as uncacheable.
pub fn no_store(response: impl IntoResponse) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    response
}

/// Build a JSON response from an already serialized body.
pub fn json_body(body: String) -> Response {
    (
        [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Decode a JSON request body, mapping any failure to a 400.
///
/// Read from raw bytes so malformed bodies produce the same
/// `{"message": ...}` shape as every other error.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejected request body");
        AppError::bad_request(INVALID_JSON)
    })
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_rejects_garbage() {
        let err = parse_json::<serde_json::Value>(b"{not json").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), INVALID_JSON);

        let value: serde_json::Value = parse_json(br#"{"a":1}"#).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_no_store_header() {
        let response = no_store(StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            NO_STORE
        );
    }

    #[test]
    fn test_json_body_content_type() {
        let response = json_body("[]".to_string());
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json; charset=utf-8"
        );
    }
}
