//! Category model: a flat list of unique names posts can be filed under.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{Violations, char_len};

pub const NAME_TOO_SHORT: &str = "ক্যাটাগরির নাম কমপক্ষে ২ অক্ষর হতে হবে";

const MIN_NAME_CHARS: usize = 2;

/// A category.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Display name, unique.
    pub name: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateCategory {
    pub name: String,
}

impl CreateCategory {
    /// Trim and validate, returning the name to store.
    pub fn validate(self) -> Result<String, String> {
        let name = self.name.trim().to_string();
        let mut v = Violations::default();
        v.check(char_len(&name) >= MIN_NAME_CHARS, NAME_TOO_SHORT);
        v.into_result()?;
        Ok(name)
    }
}

impl Category {
    /// List all categories ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let categories = sqlx::query_as::<_, Self>(
            "SELECT id, name, created_at, updated_at FROM category ORDER BY name",
        )
        .fetch_all(pool)
        .await
        .context("failed to list categories")?;

        Ok(categories)
    }

    /// Whether a category with exactly this name exists.
    pub async fn exists(pool: &PgPool, name: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM category WHERE name = $1)")
                .bind(name)
                .fetch_one(pool)
                .await
                .context("failed to check category")?;

        Ok(exists)
    }

    /// Create a category. Returns `None` when the name is already taken.
    pub async fn create(pool: &PgPool, name: &str) -> Result<Option<Self>> {
        let now = Utc::now();
        let category = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO category (id, name, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT (name) DO NOTHING
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(now)
        .fetch_optional(pool)
        .await
        .context("failed to create category")?;

        Ok(category)
    }
}
