//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::services::slug::{DEFAULT_MAX_ATTEMPTS, SlugPolicy};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Path to uploads directory (default: ./uploads).
    pub uploads_dir: PathBuf,

    /// Base URL for serving uploaded files (default: /files).
    pub files_url: String,

    /// Path to Tera templates (default: ./templates).
    pub templates_dir: PathBuf,

    /// Path to static assets served under /static (default: ./static).
    pub static_dir: PathBuf,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Existence checks before a slug falls back to a timestamp (default: 50).
    pub slug_max_attempts: u32,

    /// Regenerations after a slug unique violation at write time (default: 3).
    pub slug_conflict_retries: u32,

    /// Site name shown in page titles (default: "NWU IAN").
    pub site_name: String,

    /// Public site URL for share links.
    pub site_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PORT", "3000")
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            lookup("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = var("DATABASE_MAX_CONNECTIONS", "10")
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let uploads_dir = PathBuf::from(var("UPLOADS_DIR", "./uploads"));
        let files_url = var("FILES_URL", "/files");
        let templates_dir = PathBuf::from(var("TEMPLATES_DIR", "./templates"));
        let static_dir = PathBuf::from(var("STATIC_DIR", "./static"));

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let slug_max_attempts = var("SLUG_MAX_ATTEMPTS", &DEFAULT_MAX_ATTEMPTS.to_string())
            .parse()
            .context("SLUG_MAX_ATTEMPTS must be a valid u32")?;

        let slug_conflict_retries = var("SLUG_CONFLICT_RETRIES", "3")
            .parse()
            .context("SLUG_CONFLICT_RETRIES must be a valid u32")?;

        let site_name = var("SITE_NAME", "NWU IAN");
        let site_url = lookup("SITE_URL").unwrap_or_else(|| format!("http://localhost:{port}"));

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            uploads_dir,
            files_url,
            templates_dir,
            static_dir,
            cors_allowed_origins,
            slug_max_attempts,
            slug_conflict_retries,
            site_name,
            site_url,
        })
    }

    /// Slug search limits derived from this configuration.
    pub fn slug_policy(&self) -> SlugPolicy {
        SlugPolicy {
            max_attempts: self.slug_max_attempts,
        }
    }
}
