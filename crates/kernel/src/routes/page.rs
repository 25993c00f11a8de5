//! Public site page API.

use axum::{
    Router,
    extract::{Path, State},
    response::Response,
    routing::get,
};

use crate::cache::PAGES_TAG;
use crate::error::{AppError, AppResult};
use crate::models::{PageSlug, SitePage};
use crate::state::AppState;

use super::helpers::json_body;

pub const PAGE_NOT_FOUND: &str = "পেজ পাওয়া যায়নি";

/// Create the public page router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/pages/{slug}", get(get_page))
}

/// Resolve an editable page slug, or 404.
pub(crate) fn parse_page_slug(slug: &str) -> AppResult<PageSlug> {
    PageSlug::parse(slug).ok_or_else(|| AppError::not_found(PAGE_NOT_FOUND))
}

/// Stored page, or its built-in default when never saved.
async fn get_page(State(state): State<AppState>, Path(slug): Path<String>) -> AppResult<Response> {
    let slug = parse_page_slug(&slug)?;

    let key = format!("/api/pages/{slug}");
    if let Some(body) = state.cache().get(&key).await {
        return Ok(json_body(body));
    }

    let page = SitePage::find_or_default(state.db(), slug).await?;
    let body = serde_json::to_string(&page).map_err(anyhow::Error::from)?;

    let tag = slug.cache_tag();
    state
        .cache()
        .set(&key, body.clone(), &[PAGES_TAG, tag.as_str()])
        .await;

    Ok(json_body(body))
}
