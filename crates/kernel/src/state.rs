//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::cache::CacheLayer;
use crate::config::Config;
use crate::content::PostService;
use crate::db;
use crate::file::{FileService, LocalFileStorage};
use crate::services::slug::SlugGenerator;
use crate::theme::ThemeEngine;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    config: Config,

    /// Rendered public responses, invalidated by tag on admin writes.
    cache: CacheLayer,

    /// Tera templates with the Bengali presentation filters.
    theme: ThemeEngine,

    files: FileService,

    /// Post writes with slug generation and conflict recovery.
    posts: PostService,
}

impl AppState {
    /// Connect to the database, apply migrations, and build the state.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config).await?;
        info!("connected to PostgreSQL");

        db::run_migrations(&pool).await?;

        let theme = ThemeEngine::new(&config.templates_dir).context("failed to load templates")?;
        Ok(Self::from_parts(pool, config.clone(), theme))
    }

    /// Build the state around an existing pool without touching the database.
    ///
    /// Templates are loaded from `config.templates_dir`.
    pub fn with_pool(pool: PgPool, config: &Config) -> Result<Self> {
        let theme = ThemeEngine::new(&config.templates_dir).context("failed to load templates")?;
        Ok(Self::from_parts(pool, config.clone(), theme))
    }

    fn from_parts(pool: PgPool, config: Config, theme: ThemeEngine) -> Self {
        let storage = LocalFileStorage::new(&config.uploads_dir, config.files_url.clone());
        let files = FileService::new(Arc::new(storage));
        let posts = PostService::postgres(
            pool.clone(),
            SlugGenerator::new(config.slug_policy()),
            config.slug_conflict_retries,
        );

        Self {
            inner: Arc::new(AppStateInner {
                db: pool,
                config,
                cache: CacheLayer::new(),
                theme,
                files,
                posts,
            }),
        }
    }

    /// Get the database pool.
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the response cache.
    pub fn cache(&self) -> &CacheLayer {
        &self.inner.cache
    }

    /// Get the theme engine.
    pub fn theme(&self) -> &ThemeEngine {
        &self.inner.theme
    }

    /// Get the image upload service.
    pub fn files(&self) -> &FileService {
        &self.inner.files
    }

    /// Get the post write service.
    pub fn posts(&self) -> &PostService {
        &self.inner.posts
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("theme", &self.inner.theme)
            .field("files", &self.inner.files)
            .finish_non_exhaustive()
    }
}
