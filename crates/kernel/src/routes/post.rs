//! Public post API routes.
//!
//! Responses are cached by path and tagged so admin writes can drop them.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Response,
    routing::get,
};
use serde::Deserialize;

use crate::cache::{POSTS_TAG, post_tag};
use crate::error::{AppError, AppResult};
use crate::models::Post;
use crate::state::AppState;

use super::helpers::json_body;

pub const POST_NOT_FOUND: &str = "পোস্ট পাওয়া যায়নি";

/// Create the public post router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/{slug}", get(get_post))
}

/// Query parameters for listing posts.
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    /// Case-insensitive substring search.
    #[serde(default)]
    pub q: String,
}

impl ListPostsQuery {
    /// Trimmed search text, or `None` when blank.
    pub fn search(&self) -> Option<&str> {
        Some(self.q.trim()).filter(|q| !q.is_empty())
    }
}

/// List published posts, newest first.
async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> AppResult<Response> {
    let search = query.search();
    let key = match search {
        Some(q) => format!("/api/posts?q={}", urlencoding::encode(q)),
        None => "/api/posts".to_string(),
    };

    if let Some(body) = state.cache().get(&key).await {
        return Ok(json_body(body));
    }

    let posts = Post::list_published(state.db(), search).await?;
    let body = serde_json::to_string(&posts).map_err(anyhow::Error::from)?;
    state.cache().set(&key, body.clone(), &[POSTS_TAG]).await;

    Ok(json_body(body))
}

/// Get a single published post.
async fn get_post(State(state): State<AppState>, Path(slug): Path<String>) -> AppResult<Response> {
    let key = format!("/api/posts/{slug}");
    if let Some(body) = state.cache().get(&key).await {
        return Ok(json_body(body));
    }

    let post = Post::find_published_by_slug(state.db(), &slug)
        .await?
        .ok_or_else(|| AppError::not_found(POST_NOT_FOUND))?;

    let body = serde_json::to_string(&post).map_err(anyhow::Error::from)?;
    let tag = post_tag(&post.slug);
    state
        .cache()
        .set(&key, body.clone(), &[POSTS_TAG, tag.as_str()])
        .await;

    Ok(json_body(body))
}
