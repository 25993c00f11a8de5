//! Static asset and uploaded image serving.

use std::path::Path as FsPath;

use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::fs;
use tracing::warn;

use crate::file::resolve_relative;
use crate::state::AppState;

/// Create the static files router.
///
/// Uploads are served from `/files` only when that is the configured base
/// URL; a CDN base URL leaves the route unused.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/static/{*path}", get(serve_static))
        .route("/files/{*path}", get(serve_upload))
}

async fn serve_static(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    serve_from(&state.config().static_dir, &path, "public, max-age=86400").await
}

/// Upload names are unique, so they never change under the same URL.
async fn serve_upload(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    serve_from(
        &state.config().uploads_dir,
        &path,
        "public, max-age=31536000, immutable",
    )
    .await
}

async fn serve_from(base: &FsPath, path: &str, cache_control: &'static str) -> Response {
    let path = path.trim_start_matches('/');
    if path.is_empty() || path.contains('\0') {
        return not_found();
    }

    let Ok(file_path) = resolve_relative(base, path) else {
        return not_found();
    };

    let content = match fs::read(&file_path).await {
        Ok(content) => content,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %file_path.display(), error = %e, "failed to read static file");
            }
            return not_found();
        }
    };

    (
        [
            (header::CONTENT_TYPE, mime_from_path(&file_path)),
            (header::CACHE_CONTROL, cache_control),
        ],
        content,
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

fn mime_from_path(path: &FsPath) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("js") => "application/javascript",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("svg") => "image/svg+xml",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
