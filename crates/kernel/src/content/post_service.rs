//! Post writes with unique slug assignment.
//!
//! Slugs are checked for uniqueness before a write, but another writer can
//! claim the same slug between the check and the insert. The store's unique
//! constraint catches that; the service then regenerates the slug and tries
//! again, a bounded number of times.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{NewPost, Post, PostChanges, UpdatePost};
use crate::services::slug::{SlugExistence, SlugGenerator};

/// Name of the unique constraint on `post.slug`.
const SLUG_CONSTRAINT: &str = "post_slug_key";

/// Default number of regenerations after a write-time slug conflict.
pub const DEFAULT_CONFLICT_RETRIES: u32 = 3;

/// A write lost the race for its slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("post slug already taken")]
pub struct SlugConflict;

/// Persistence operations the post service needs.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Post>>;

    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool>;

    /// Insert under `slug`. A taken slug fails with [`SlugConflict`].
    async fn insert(&self, input: &NewPost, slug: &str) -> Result<Post>;

    /// Overwrite the post. A taken slug fails with [`SlugConflict`].
    async fn update(&self, id: Uuid, changes: &PostChanges) -> Result<Option<Post>>;
}

/// Post store over PostgreSQL.
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique violation on the slug constraint to [`SlugConflict`].
fn map_slug_conflict(err: anyhow::Error) -> anyhow::Error {
    let is_slug_violation = matches!(
        err.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db))
            if db.is_unique_violation() && db.constraint() == Some(SLUG_CONSTRAINT)
    );
    if is_slug_violation {
        anyhow::Error::new(SlugConflict)
    } else {
        err
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn find(&self, id: Uuid) -> Result<Option<Post>> {
        Post::find_by_id(&self.pool, id).await
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool> {
        Post::slug_exists(&self.pool, slug, exclude_id).await
    }

    async fn insert(&self, input: &NewPost, slug: &str) -> Result<Post> {
        Post::insert(&self.pool, input, slug)
            .await
            .map_err(map_slug_conflict)
    }

    async fn update(&self, id: Uuid, changes: &PostChanges) -> Result<Option<Post>> {
        Post::update(&self.pool, id, changes)
            .await
            .map_err(map_slug_conflict)
    }
}

#[async_trait]
impl SlugExistence for PgPostStore {
    async fn exists_with_slug(&self, candidate: &str, exclude_id: Option<Uuid>) -> Result<bool> {
        self.slug_exists(candidate, exclude_id).await
    }
}

/// Slug existence checks answered by any [`PostStore`].
struct StoreSlugs<'a>(&'a dyn PostStore);

#[async_trait]
impl<'a> SlugExistence for StoreSlugs<'a> {
    async fn exists_with_slug(&self, candidate: &str, exclude_id: Option<Uuid>) -> Result<bool> {
        self.0.slug_exists(candidate, exclude_id).await
    }
}

/// Post creation and update.
#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn PostStore>,
    slugs: SlugGenerator,
    conflict_retries: u32,
}

impl PostService {
    /// Create a post service.
    pub fn new(store: Arc<dyn PostStore>, slugs: SlugGenerator, conflict_retries: u32) -> Self {
        Self {
            store,
            slugs,
            conflict_retries,
        }
    }

    /// Post service over PostgreSQL.
    pub fn postgres(pool: PgPool, slugs: SlugGenerator, conflict_retries: u32) -> Self {
        Self::new(Arc::new(PgPostStore::new(pool)), slugs, conflict_retries)
    }

    async fn next_slug(&self, title: &str, exclude_id: Option<Uuid>) -> Result<String> {
        self.slugs
            .generate(title, exclude_id, &StoreSlugs(self.store.as_ref()))
            .await
    }

    /// Create a post with a freshly generated slug.
    pub async fn create(&self, input: NewPost) -> Result<Post> {
        let mut slug = self.next_slug(&input.title, None).await?;
        let mut retries = 0;

        loop {
            match self.store.insert(&input, &slug).await {
                Ok(post) => {
                    info!(post_id = %post.id, slug = %post.slug, "post created");
                    return Ok(post);
                }
                Err(e) if e.is::<SlugConflict>() && retries < self.conflict_retries => {
                    retries += 1;
                    warn!(slug = %slug, retries, "slug claimed concurrently, regenerating");
                    slug = self.next_slug(&input.title, None).await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Apply a validated partial update.
    ///
    /// The slug is regenerated only when the title actually changes. Returns
    /// `None` if the post does not exist.
    pub async fn update(&self, id: Uuid, patch: UpdatePost) -> Result<Option<Post>> {
        let Some(current) = self.store.find(id).await? else {
            return Ok(None);
        };

        let title_changed = patch
            .title
            .as_deref()
            .is_some_and(|title| title != current.title);
        let mut changes = patch.apply(&current);
        if title_changed {
            changes.slug = self.next_slug(&changes.title, Some(id)).await?;
        }

        let mut retries = 0;
        loop {
            match self.store.update(id, &changes).await {
                Ok(post) => {
                    if let Some(post) = &post {
                        info!(post_id = %id, slug = %post.slug, "post updated");
                    }
                    return Ok(post);
                }
                Err(e)
                    if e.is::<SlugConflict>()
                        && title_changed
                        && retries < self.conflict_retries =>
                {
                    retries += 1;
                    warn!(post_id = %id, slug = %changes.slug, retries, "slug claimed concurrently, regenerating");
                    changes.slug = self.next_slug(&changes.title, Some(id)).await?;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl std::fmt::Debug for PostService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostService")
            .field("slug_policy", &self.slugs.policy())
            .field("conflict_retries", &self.conflict_retries)
            .finish()
    }
}
