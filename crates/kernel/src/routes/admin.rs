//! Admin API routes for posts and site pages.
//!
//! Every write drops the cached public responses it affects. Page responses
//! are marked `no-store` so editors always see the saved state.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::get,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::cache::{PAGES_TAG, POSTS_TAG, post_tag};
use crate::error::{AppError, AppResult};
use crate::models::{CreatePost, Post, SitePage, UpdatePost, UpsertSitePage};
use crate::state::AppState;

use super::helpers::{no_store, parse_json};
use super::page::parse_page_slug;
use super::post::POST_NOT_FOUND;

pub const INVALID_POST_ID: &str = "সঠিক পোস্ট আইডি দিন";
pub const POST_DELETED: &str = "পোস্ট ডিলিট হয়েছে";

/// Create the admin API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/posts", get(list_posts).post(create_post))
        .route(
            "/api/admin/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/api/admin/pages/{slug}", get(get_page).put(save_page))
}

fn parse_post_id(id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::bad_request(INVALID_POST_ID))
}

/// Drop cached public post responses after a write.
async fn invalidate_post(state: &AppState, slugs: &[&str]) {
    let tags: Vec<String> = slugs.iter().map(|slug| post_tag(slug)).collect();
    let mut refs: Vec<&str> = tags.iter().map(String::as_str).collect();
    refs.push(POSTS_TAG);
    state.cache().invalidate_tags(&refs).await;
}

// -------------------------------------------------------------------------
// Posts
// -------------------------------------------------------------------------

/// All posts including drafts, newest first.
async fn list_posts(State(state): State<AppState>) -> AppResult<Response> {
    let posts = Post::list_all(state.db()).await?;
    Ok(no_store(Json(posts)))
}

async fn get_post(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Response> {
    let id = parse_post_id(&id)?;
    let post = Post::find_by_id(state.db(), id)
        .await?
        .ok_or_else(|| AppError::not_found(POST_NOT_FOUND))?;
    Ok(no_store(Json(post)))
}

async fn create_post(State(state): State<AppState>, body: Bytes) -> AppResult<Response> {
    let input: CreatePost = parse_json(&body)?;
    let input = input.validate().map_err(AppError::BadRequest)?;

    let post = state.posts().create(input).await?;
    invalidate_post(&state, &[post.slug.as_str()]).await;

    Ok(no_store((StatusCode::CREATED, Json(post))))
}

async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Response> {
    let id = parse_post_id(&id)?;
    let patch: UpdatePost = parse_json(&body)?;
    let patch = patch.validate().map_err(AppError::BadRequest)?;

    let previous_slug = Post::find_by_id(state.db(), id).await?.map(|p| p.slug);
    let post = state
        .posts()
        .update(id, patch)
        .await?
        .ok_or_else(|| AppError::not_found(POST_NOT_FOUND))?;

    match previous_slug.as_deref() {
        Some(old) if old != post.slug => {
            invalidate_post(&state, &[old, post.slug.as_str()]).await
        }
        _ => invalidate_post(&state, &[post.slug.as_str()]).await,
    }

    Ok(no_store(Json(post)))
}

async fn delete_post(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Response> {
    let id = parse_post_id(&id)?;

    let Some(post) = Post::find_by_id(state.db(), id).await? else {
        return Err(AppError::not_found(POST_NOT_FOUND));
    };
    if !Post::delete(state.db(), id).await? {
        return Err(AppError::not_found(POST_NOT_FOUND));
    }

    info!(post_id = %id, slug = %post.slug, "post deleted");
    invalidate_post(&state, &[post.slug.as_str()]).await;

    Ok(no_store(Json(json!({ "message": POST_DELETED }))))
}

// -------------------------------------------------------------------------
// Site pages
// -------------------------------------------------------------------------

async fn get_page(State(state): State<AppState>, Path(slug): Path<String>) -> AppResult<Response> {
    let slug = parse_page_slug(&slug)?;
    let page = SitePage::find_or_default(state.db(), slug).await?;
    Ok(no_store(Json(page)))
}

async fn save_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    body: Bytes,
) -> AppResult<Response> {
    let slug = parse_page_slug(&slug)?;
    let input: UpsertSitePage = parse_json(&body)?;
    let input = input.validate().map_err(AppError::BadRequest)?;

    let page = SitePage::upsert(state.db(), slug, &input).await?;
    info!(slug = %slug, "site page saved");

    let tag = slug.cache_tag();
    state
        .cache()
        .invalidate_tags(&[PAGES_TAG, tag.as_str()])
        .await;

    Ok(no_store(Json(page)))
}
