//! Editable site pages (activities, contact).

use std::fmt;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{Violations, char_len};

pub const PAGE_TITLE_TOO_SHORT: &str = "শিরোনাম কমপক্ষে ২ অক্ষর হতে হবে";
pub const PAGE_CONTENT_TOO_SHORT: &str = "কনটেন্ট কমপক্ষে ১০ অক্ষর হতে হবে";

const MIN_TITLE_CHARS: usize = 2;
const MIN_CONTENT_CHARS: usize = 10;

const ACTIVITIES_TITLE: &str = "আমাদের কার্যক্রম";
const ACTIVITIES_CONTENT: &str = "NWU ইসলামিক অ্যাওয়ারনেস নেটওয়ার্ক (NWU IAN) ইসলামি সচেতনতা বৃদ্ধি, দাওয়াহ, নৈতিক শিক্ষা এবং সমাজকল্যাণমূলক বার্তা ছড়িয়ে দিতে বিভিন্ন কার্যক্রম পরিচালনা করে।

## দাওয়াহ ও শিক্ষামূলক লেখা
কুরআন-সুন্নাহভিত্তিক সহজ ভাষায় লেখা, নৈতিক শিক্ষা ও আত্মশুদ্ধির বার্তা।

## জনসচেতনতা কার্যক্রম
সমাজে ভালো কাজের প্রচার, ক্ষতিকর অভ্যাস থেকে দূরে থাকার আহ্বান, নৈতিকতা চর্চা।

## সামাজিক উদ্যোগ
প্রয়োজনভিত্তিক সহায়তা, স্বেচ্ছাসেবী কাজ, এবং কমিউনিটি-ভিত্তিক উদ্যোগ।";

const CONTACT_TITLE: &str = "যোগাযোগ";
const CONTACT_CONTENT: &str = "আপনার মতামত, পরামর্শ বা সহযোগিতার জন্য আমাদের সাথে যোগাযোগ করুন।

- ইমেইল: admin@nwuian.example
- ফেসবুক: (লিংক দিন)
- ইউটিউব: (লিংক দিন)";

/// The only pages that can be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSlug {
    Activities,
    Contact,
}

impl PageSlug {
    pub const ALL: [PageSlug; 2] = [PageSlug::Activities, PageSlug::Contact];

    /// Parse a path segment. Unknown slugs are `None`.
    pub fn parse(slug: &str) -> Option<Self> {
        match slug {
            "activities" => Some(Self::Activities),
            "contact" => Some(Self::Contact),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activities => "activities",
            Self::Contact => "contact",
        }
    }

    /// Built-in title and content served until the page is first saved.
    pub fn default_content(self) -> (&'static str, &'static str) {
        match self {
            Self::Activities => (ACTIVITIES_TITLE, ACTIVITIES_CONTENT),
            Self::Contact => (CONTACT_TITLE, CONTACT_CONTENT),
        }
    }

    /// Cache tag for this page.
    pub fn cache_tag(self) -> String {
        format!("page:{}", self.as_str())
    }
}

impl fmt::Display for PageSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A site page as served to clients.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SitePage {
    /// `None` for built-in defaults that were never saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    pub slug: String,

    pub title: String,

    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request body for saving a page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpsertSitePage {
    pub title: String,
    pub content: String,
}

impl UpsertSitePage {
    /// Trim the title and validate both fields.
    pub fn validate(self) -> Result<Self, String> {
        let page = Self {
            title: self.title.trim().to_string(),
            content: self.content,
        };

        let mut v = Violations::default();
        v.check(char_len(&page.title) >= MIN_TITLE_CHARS, PAGE_TITLE_TOO_SHORT);
        v.check(
            char_len(page.content.trim()) >= MIN_CONTENT_CHARS,
            PAGE_CONTENT_TOO_SHORT,
        );
        v.into_result()?;

        Ok(page)
    }
}

impl SitePage {
    /// The built-in page for `slug`.
    pub fn fallback(slug: PageSlug) -> Self {
        let (title, content) = slug.default_content();
        Self {
            id: None,
            slug: slug.as_str().to_string(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Find the stored page for `slug`.
    pub async fn find(pool: &PgPool, slug: PageSlug) -> Result<Option<Self>> {
        let page = sqlx::query_as::<_, Self>(
            "SELECT id, slug, title, content, created_at, updated_at FROM site_page WHERE slug = $1",
        )
        .bind(slug.as_str())
        .fetch_optional(pool)
        .await
        .context("failed to fetch site page")?;

        Ok(page)
    }

    /// The stored page, or the built-in default when none is stored.
    pub async fn find_or_default(pool: &PgPool, slug: PageSlug) -> Result<Self> {
        Ok(Self::find(pool, slug)
            .await?
            .unwrap_or_else(|| Self::fallback(slug)))
    }

    /// Insert or replace the page for `slug`.
    pub async fn upsert(pool: &PgPool, slug: PageSlug, input: &UpsertSitePage) -> Result<Self> {
        let now = Utc::now();
        let page = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO site_page (id, slug, title, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT (slug)
            DO UPDATE SET title = EXCLUDED.title, content = EXCLUDED.content,
                          updated_at = EXCLUDED.updated_at
            RETURNING id, slug, title, content, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(slug.as_str())
        .bind(&input.title)
        .bind(&input.content)
        .bind(now)
        .fetch_one(pool)
        .await
        .context("failed to save site page")?;

        Ok(page)
    }
}
