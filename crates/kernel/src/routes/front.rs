//! Server-rendered public views and the admin dashboard.

use std::cmp::Ordering;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::{PAGES_TAG, POSTS_TAG, post_tag};
use crate::content::render_content_html;
use crate::content::text::strip_markdown;
use crate::models::{Category, PageSlug, Post, SitePage};
use crate::state::AppState;

use super::helpers::{
    inject_site_context, no_store, render_and_cache, render_cached, render_not_found,
    render_server_error, render_template,
};

/// Create the public view router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/posts/{slug}", get(post_detail))
        .route("/lists", get(post_lists))
        .route("/activities", get(activities))
        .route("/contact", get(contact))
        .route("/admin", get(admin_dashboard))
}

// -------------------------------------------------------------------------
// Home
// -------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    #[serde(default)]
    pub q: String,
}

/// Published posts, newest first, with optional search.
async fn home(State(state): State<AppState>, Query(query): Query<HomeQuery>) -> Response {
    let search = Some(query.q.trim()).filter(|q| !q.is_empty());

    let posts = match Post::list_published(state.db(), search).await {
        Ok(posts) => posts,
        Err(e) => {
            warn!(error = %e, "failed to load posts for home page");
            return render_server_error(&state, "/");
        }
    };

    let mut context = tera::Context::new();
    inject_site_context(&state, &mut context, "/");
    context.insert("posts", &posts);
    context.insert("q", &search.unwrap_or_default());

    // Search results are not cached; every query would get its own entry.
    match search {
        Some(_) => render_template(&state, "home.html", &context, StatusCode::OK),
        None => render_cached(&state, "/", &[POSTS_TAG], "home.html", &context).await,
    }
}

// -------------------------------------------------------------------------
// Post detail
// -------------------------------------------------------------------------

/// Outbound share links for a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLinks {
    /// Absolute post URL.
    pub url: String,
    pub facebook: String,
    pub x: String,
    pub whatsapp: String,
}

impl ShareLinks {
    pub fn for_post(site_url: &str, title: &str, slug: &str) -> Self {
        let url = format!(
            "{}/posts/{}",
            site_url.trim_end_matches('/'),
            urlencoding::encode(slug)
        );
        let encoded_url = urlencoding::encode(&url);
        let encoded_title = urlencoding::encode(title);

        Self {
            facebook: format!("https://www.facebook.com/sharer/sharer.php?u={encoded_url}"),
            x: format!("https://twitter.com/intent/tweet?url={encoded_url}&text={encoded_title}"),
            whatsapp: format!(
                "https://wa.me/?text={}",
                urlencoding::encode(&format!("{title}\n{url}"))
            ),
            url,
        }
    }
}

async fn post_detail(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let path = format!("/posts/{slug}");
    if let Some(html) = state.cache().get(&path).await {
        return Html(html).into_response();
    }

    let post = match Post::find_published_by_slug(state.db(), &slug).await {
        Ok(Some(post)) => post,
        Ok(None) => return render_not_found(&state, &path),
        Err(e) => {
            warn!(error = %e, slug = %slug, "failed to load post");
            return render_server_error(&state, &path);
        }
    };

    let mut context = tera::Context::new();
    inject_site_context(&state, &mut context, &path);
    context.insert("content_html", &render_content_html(&post.content));
    context.insert(
        "share",
        &ShareLinks::for_post(&state.config().site_url, &post.title, &post.slug),
    );
    context.insert("post", &post);

    let tag = post_tag(&post.slug);
    render_and_cache(
        &state,
        &path,
        &[POSTS_TAG, tag.as_str()],
        "post.html",
        &context,
    )
    .await
}

// -------------------------------------------------------------------------
// Lists
// -------------------------------------------------------------------------

/// Ordering for the list view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListSort {
    #[default]
    Latest,
    Oldest,
    TitleAsc,
    TitleDesc,
}

/// Filters for the list view.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_sort")]
    pub sort: ListSort,
}

/// Unknown sort keys fall back to newest first.
fn lenient_sort<'de, D>(deserializer: D) -> Result<ListSort, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(serde_json::from_value(serde_json::Value::String(raw)).unwrap_or_default())
}

/// Distinct non-empty categories of `posts`, sorted.
pub fn collect_categories(posts: &[Post]) -> Vec<String> {
    let mut categories: Vec<String> = posts
        .iter()
        .map(|p| p.category.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

/// Apply the list view filters and ordering.
///
/// The search matches title, excerpt, and content with markdown stripped,
/// case-insensitively.
pub fn filter_posts(mut posts: Vec<Post>, query: &ListQuery) -> Vec<Post> {
    let needle = query.q.trim().to_lowercase();
    let category = query.category.trim();

    posts.retain(|p| {
        if !category.is_empty() && p.category != category {
            return false;
        }
        if needle.is_empty() {
            return true;
        }
        let haystack = format!(
            "{} {} {}",
            p.title,
            p.excerpt,
            strip_markdown(&p.content)
        )
        .to_lowercase();
        haystack.contains(&needle)
    });

    let order = |a: &Post, b: &Post| -> Ordering {
        match query.sort {
            ListSort::Latest => b.created_at.cmp(&a.created_at),
            ListSort::Oldest => a.created_at.cmp(&b.created_at),
            ListSort::TitleAsc => a.title.cmp(&b.title),
            ListSort::TitleDesc => b.title.cmp(&a.title),
        }
    };
    posts.sort_by(order);
    posts
}

async fn post_lists(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let posts = match Post::list_published(state.db(), None).await {
        Ok(posts) => posts,
        Err(e) => {
            warn!(error = %e, "failed to load posts for list view");
            return render_server_error(&state, "/lists");
        }
    };

    let categories = collect_categories(&posts);
    let posts = filter_posts(posts, &query);

    let mut context = tera::Context::new();
    inject_site_context(&state, &mut context, "/lists");
    context.insert("posts", &posts);
    context.insert("total", &posts.len());
    context.insert("categories", &categories);
    context.insert("q", query.q.trim());
    context.insert("category", query.category.trim());
    context.insert("sort", &query.sort);

    render_template(&state, "lists.html", &context, StatusCode::OK)
}

// -------------------------------------------------------------------------
// Site pages
// -------------------------------------------------------------------------

async fn activities(State(state): State<AppState>) -> Response {
    site_page(&state, PageSlug::Activities).await
}

async fn contact(State(state): State<AppState>) -> Response {
    site_page(&state, PageSlug::Contact).await
}

async fn site_page(state: &AppState, slug: PageSlug) -> Response {
    let path = format!("/{slug}");

    let page = match SitePage::find_or_default(state.db(), slug).await {
        Ok(page) => page,
        Err(e) => {
            warn!(error = %e, slug = %slug, "failed to load site page");
            return render_server_error(state, &path);
        }
    };

    let mut context = tera::Context::new();
    inject_site_context(state, &mut context, &path);
    context.insert("content_html", &render_content_html(&page.content));
    context.insert("page", &page);

    let tag = slug.cache_tag();
    render_cached(state, &path, &[PAGES_TAG, tag.as_str()], "page.html", &context).await
}

// -------------------------------------------------------------------------
// Admin dashboard
// -------------------------------------------------------------------------

/// Overview of every post, category, and editable page.
async fn admin_dashboard(State(state): State<AppState>) -> Response {
    let loaded = tokio::try_join!(
        Post::list_all(state.db()),
        Category::list(state.db()),
        async {
            let mut pages = Vec::with_capacity(PageSlug::ALL.len());
            for slug in PageSlug::ALL {
                pages.push(SitePage::find_or_default(state.db(), slug).await?);
            }
            Ok::<_, anyhow::Error>(pages)
        },
    );

    let (posts, categories, pages) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            warn!(error = %e, "failed to load admin dashboard");
            return no_store(render_server_error(&state, "/admin"));
        }
    };

    let published = posts.iter().filter(|p| p.is_published).count();

    let mut context = tera::Context::new();
    inject_site_context(&state, &mut context, "/admin");
    context.insert("published_count", &published);
    context.insert("draft_count", &(posts.len() - published));
    context.insert("posts", &posts);
    context.insert("categories", &categories);
    context.insert("pages", &pages);

    no_store(render_template(
        &state,
        "admin.html",
        &context,
        StatusCode::OK,
    ))
}
