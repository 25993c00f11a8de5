//! Category API routes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::info;

use crate::cache::CATEGORIES_TAG;
use crate::error::{AppError, AppResult};
use crate::models::{Category, CreateCategory};
use crate::state::AppState;

use super::helpers::{json_body, parse_json};

pub const CATEGORY_EXISTS: &str = "এই ক্যাটাগরি ইতিমধ্যেই আছে";

const CATEGORIES_KEY: &str = "/api/categories";

/// Create the category router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/categories", get(list_categories).post(create_category))
}

/// All categories sorted by name.
async fn list_categories(State(state): State<AppState>) -> AppResult<Response> {
    if let Some(body) = state.cache().get(CATEGORIES_KEY).await {
        return Ok(json_body(body));
    }

    let categories = Category::list(state.db()).await?;
    let body = serde_json::to_string(&categories).map_err(anyhow::Error::from)?;
    state
        .cache()
        .set(CATEGORIES_KEY, body.clone(), &[CATEGORIES_TAG])
        .await;

    Ok(json_body(body))
}

async fn create_category(State(state): State<AppState>, body: Bytes) -> AppResult<Response> {
    let input: CreateCategory = parse_json(&body)?;
    let name = input.validate().map_err(AppError::BadRequest)?;

    if Category::exists(state.db(), &name).await? {
        return Err(AppError::conflict(CATEGORY_EXISTS));
    }

    // A concurrent insert of the same name loses on the unique constraint.
    let category = Category::create(state.db(), &name)
        .await?
        .ok_or_else(|| AppError::conflict(CATEGORY_EXISTS))?;

    info!(category_id = %category.id, name = %category.name, "category created");
    state.cache().invalidate_tag(CATEGORIES_TAG).await;

    Ok((StatusCode::CREATED, Json(category)).into_response())
}
