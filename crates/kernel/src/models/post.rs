//! Post model and CRUD operations.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{Violations, char_len};

pub const TITLE_TOO_SHORT: &str = "শিরোনাম কমপক্ষে ৩ অক্ষর হতে হবে";
pub const CONTENT_TOO_SHORT: &str = "কনটেন্ট কমপক্ষে ১০ অক্ষর হতে হবে";
pub const INVALID_IMAGE_URL: &str = "সঠিক ইমেজ URL দিন";

const MIN_TITLE_CHARS: usize = 3;
const MIN_CONTENT_CHARS: usize = 10;

const POST_COLUMNS: &str = "id, title, slug, excerpt, content, featured_image, category, \
                            is_published, created_at, updated_at";

/// A blog post.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    pub title: String,

    /// URL identifier, unique across all posts.
    pub slug: String,

    pub excerpt: String,

    /// Markdown with limited raw HTML.
    pub content: String,

    /// Image URL or empty.
    pub featured_image: String,

    /// Category name or empty.
    pub category: String,

    pub is_published: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a post.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePost {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: String,
    pub category: String,
    pub is_published: bool,
}

/// Request body for a partial post update. Unknown fields are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub featured_image: Option<String>,
    pub category: Option<String>,
    pub is_published: Option<bool>,
}

/// A validated post ready to insert. The slug is filled in by the post
/// service.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: String,
    pub category: String,
    pub is_published: bool,
}

/// Full set of writable columns for an update.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: String,
    pub category: String,
    pub is_published: bool,
}

fn validate_title(title: &str, v: &mut Violations) {
    v.check(char_len(title) >= MIN_TITLE_CHARS, TITLE_TOO_SHORT);
}

fn validate_content(content: &str, v: &mut Violations) {
    v.check(char_len(content.trim()) >= MIN_CONTENT_CHARS, CONTENT_TOO_SHORT);
}

fn validate_image(url: &str, v: &mut Violations) {
    v.check(
        url.is_empty() || url::Url::parse(url).is_ok(),
        INVALID_IMAGE_URL,
    );
}

impl CreatePost {
    /// Trim and validate. On failure, returns all messages joined with ` | `.
    pub fn validate(self) -> Result<NewPost, String> {
        let post = NewPost {
            title: self.title.trim().to_string(),
            excerpt: self.excerpt.trim().to_string(),
            content: self.content,
            featured_image: self.featured_image.trim().to_string(),
            category: self.category.trim().to_string(),
            is_published: self.is_published,
        };

        let mut v = Violations::default();
        validate_title(&post.title, &mut v);
        validate_content(&post.content, &mut v);
        validate_image(&post.featured_image, &mut v);
        v.into_result()?;

        Ok(post)
    }
}

impl UpdatePost {
    /// Trim present fields and validate them.
    pub fn validate(self) -> Result<Self, String> {
        let trimmed = Self {
            title: self.title.map(|s| s.trim().to_string()),
            excerpt: self.excerpt.map(|s| s.trim().to_string()),
            content: self.content,
            featured_image: self.featured_image.map(|s| s.trim().to_string()),
            category: self.category.map(|s| s.trim().to_string()),
            is_published: self.is_published,
        };

        let mut v = Violations::default();
        if let Some(title) = &trimmed.title {
            validate_title(title, &mut v);
        }
        if let Some(content) = &trimmed.content {
            validate_content(content, &mut v);
        }
        if let Some(image) = &trimmed.featured_image {
            validate_image(image, &mut v);
        }
        v.into_result()?;

        Ok(trimmed)
    }

    /// Merge onto the stored post. The slug is carried over unchanged.
    pub fn apply(self, current: &Post) -> PostChanges {
        PostChanges {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            slug: current.slug.clone(),
            excerpt: self.excerpt.unwrap_or_else(|| current.excerpt.clone()),
            content: self.content.unwrap_or_else(|| current.content.clone()),
            featured_image: self
                .featured_image
                .unwrap_or_else(|| current.featured_image.clone()),
            category: self.category.unwrap_or_else(|| current.category.clone()),
            is_published: self.is_published.unwrap_or(current.is_published),
        }
    }
}

/// Escape `\`, `%`, and `_` so user input matches literally in `ILIKE`.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl Post {
    /// Find a post by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let post = sqlx::query_as::<_, Self>(&format!(
            "SELECT {POST_COLUMNS} FROM post WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch post")?;

        Ok(post)
    }

    /// Find a published post by slug.
    pub async fn find_published_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>> {
        let post = sqlx::query_as::<_, Self>(&format!(
            "SELECT {POST_COLUMNS} FROM post WHERE slug = $1 AND is_published = TRUE"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("failed to fetch post by slug")?;

        Ok(post)
    }

    /// List published posts, newest first, optionally filtered by a
    /// case-insensitive substring of title, content, excerpt, or category.
    pub async fn list_published(pool: &PgPool, search: Option<&str>) -> Result<Vec<Self>> {
        let search = search.map(str::trim).filter(|q| !q.is_empty());

        let posts = match search {
            Some(q) => {
                let pattern = format!("%{}%", escape_like(q));
                sqlx::query_as::<_, Self>(&format!(
                    r#"
                    SELECT {POST_COLUMNS} FROM post
                    WHERE is_published = TRUE
                      AND (title ILIKE $1 OR content ILIKE $1
                           OR excerpt ILIKE $1 OR category ILIKE $1)
                    ORDER BY created_at DESC
                    "#
                ))
                .bind(pattern)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Self>(&format!(
                    "SELECT {POST_COLUMNS} FROM post WHERE is_published = TRUE \
                     ORDER BY created_at DESC"
                ))
                .fetch_all(pool)
                .await
            }
        }
        .context("failed to list published posts")?;

        Ok(posts)
    }

    /// List every post including drafts, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let posts = sqlx::query_as::<_, Self>(&format!(
            "SELECT {POST_COLUMNS} FROM post ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
        .context("failed to list posts")?;

        Ok(posts)
    }

    /// Whether any post other than `exclude_id` holds `slug`.
    pub async fn slug_exists(pool: &PgPool, slug: &str, exclude_id: Option<Uuid>) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM post WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
        .context("failed to check slug")?;

        Ok(exists)
    }

    /// Insert a post under `slug`.
    ///
    /// A concurrent writer may have taken the slug since it was checked; the
    /// resulting unique violation is returned as the underlying
    /// `sqlx::Error` so callers can detect it.
    pub async fn insert(pool: &PgPool, input: &NewPost, slug: &str) -> Result<Self> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        let post = sqlx::query_as::<_, Self>(&format!(
            r#"
            INSERT INTO post (id, title, slug, excerpt, content, featured_image, category,
                              is_published, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.title)
        .bind(slug)
        .bind(&input.excerpt)
        .bind(&input.content)
        .bind(&input.featured_image)
        .bind(&input.category)
        .bind(input.is_published)
        .bind(now)
        .fetch_one(pool)
        .await
        .context("failed to create post")?;

        Ok(post)
    }

    /// Overwrite a post's writable columns. Returns `None` if it vanished.
    pub async fn update(pool: &PgPool, id: Uuid, changes: &PostChanges) -> Result<Option<Self>> {
        let post = sqlx::query_as::<_, Self>(&format!(
            r#"
            UPDATE post
            SET title = $1, slug = $2, excerpt = $3, content = $4, featured_image = $5,
                category = $6, is_published = $7, updated_at = $8
            WHERE id = $9
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(&changes.title)
        .bind(&changes.slug)
        .bind(&changes.excerpt)
        .bind(&changes.content)
        .bind(&changes.featured_image)
        .bind(&changes.category)
        .bind(changes.is_published)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to update post")?;

        Ok(post)
    }

    /// Delete a post. Returns whether a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM post WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete post")?;

        Ok(result.rows_affected() > 0)
    }
}
