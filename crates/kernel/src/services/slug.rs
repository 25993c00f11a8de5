//! Unique slug generation for posts.
//!
//! Titles are mostly written in Bengali, and a strict ASCII slugify of a
//! Bengali string collapses to nothing. Titles are therefore transliterated
//! to a Latin approximation first, then slugified, then made unique against
//! the post collection through a [`SlugExistence`] check.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default number of existence checks before falling back to a timestamp
/// suffix: the base slug plus suffixes `-2` through `-50`.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;

/// Uniqueness check over the existing slug space.
///
/// Implementations perform I/O. `exclude_id` names the record being updated,
/// which must not collide with itself.
#[async_trait]
pub trait SlugExistence: Send + Sync {
    async fn exists_with_slug(&self, candidate: &str, exclude_id: Option<Uuid>) -> Result<bool>;
}

/// Limits applied while searching for a free slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlugPolicy {
    /// Total existence checks, including the bare base slug.
    pub max_attempts: u32,
}

impl Default for SlugPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Generates store-unique slugs from post titles.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlugGenerator {
    policy: SlugPolicy,
}

impl SlugGenerator {
    /// Create a generator with the given policy.
    pub fn new(policy: SlugPolicy) -> Self {
        Self { policy }
    }

    /// The policy in effect.
    pub fn policy(&self) -> SlugPolicy {
        self.policy
    }

    /// Produce a slug for `title` that no other record currently holds.
    ///
    /// Tries the base slug, then `<base>-2`, `<base>-3`, ... until the
    /// attempt budget runs out, and finally `<base>-<unix-ms>`. Checks are
    /// strictly sequential. The title never causes an error; only a failing
    /// existence check does.
    pub async fn generate(
        &self,
        title: &str,
        exclude_id: Option<Uuid>,
        existence: &dyn SlugExistence,
    ) -> Result<String> {
        let base = base_slug(title);
        let mut candidate = base.clone();

        for attempt in 0..self.policy.max_attempts {
            if !existence.exists_with_slug(&candidate, exclude_id).await? {
                if attempt > 0 {
                    debug!(base = %base, slug = %candidate, attempt, "slug suffixed to avoid collision");
                }
                return Ok(candidate);
            }
            candidate = format!("{base}-{}", attempt + 2);
        }

        let fallback = format!("{base}-{}", Utc::now().timestamp_millis());
        warn!(
            base = %base,
            attempts = self.policy.max_attempts,
            slug = %fallback,
            "slug suffixes exhausted, using timestamp"
        );
        Ok(fallback)
    }
}

/// Generate a unique slug using the default policy.
pub async fn generate_unique_slug(
    title: &str,
    exclude_id: Option<Uuid>,
    existence: &dyn SlugExistence,
) -> Result<String> {
    SlugGenerator::default()
        .generate(title, exclude_id, existence)
        .await
}

/// Romanize a title. Falls back to the raw title when nothing survives.
pub fn transliterate(title: &str) -> String {
    let ascii = deunicode::deunicode(title);
    let ascii = ascii.trim();
    if ascii.is_empty() {
        title.to_string()
    } else {
        ascii.to_string()
    }
}

/// Convert text into a strict slug: `[a-z0-9]+(-[a-z0-9]+)*` or empty.
pub fn slugify(text: &str) -> String {
    slug::slugify(text)
}

/// Derive the base slug for a title, before any uniqueness suffix.
///
/// Titles with nothing representable (punctuation, whitespace) get a
/// synthetic `post-<unix-ms>` base.
pub fn base_slug(title: &str) -> String {
    let slug = slugify(&transliterate(title));
    if slug.is_empty() {
        format!("post-{}", Utc::now().timestamp_millis())
    } else {
        slug
    }
}

/// Check that a slug has the canonical shape.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// In-memory slug store keyed by record id.
    #[derive(Default)]
    struct MemoryStore {
        slugs: HashMap<Uuid, String>,
        checks: AtomicU32,
    }

    impl MemoryStore {
        fn with(slugs: &[&str]) -> Self {
            Self {
                slugs: slugs
                    .iter()
                    .map(|s| (Uuid::now_v7(), s.to_string()))
                    .collect(),
                checks: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl SlugExistence for MemoryStore {
        async fn exists_with_slug(
            &self,
            candidate: &str,
            exclude_id: Option<Uuid>,
        ) -> Result<bool> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .slugs
                .iter()
                .any(|(id, slug)| slug == candidate && Some(*id) != exclude_id))
        }
    }

    struct FailingStore;

    #[async_trait]
    impl SlugExistence for FailingStore {
        async fn exists_with_slug(&self, _: &str, _: Option<Uuid>) -> Result<bool> {
            anyhow::bail!("store unavailable")
        }
    }

    fn is_timestamp_fallback(slug: &str, prefix: &str) -> bool {
        slug.strip_prefix(prefix)
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("My First Blog Post"), "my-first-blog-post");
    }

    #[test]
    fn test_slugify_special_chars() {
        assert_eq!(slugify("What's New?"), "what-s-new");
        assert_eq!(slugify("foo & bar + baz"), "foo-bar-baz");
        assert_eq!(slugify("---hello---"), "hello");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("  !!! ??? "), "");
    }

    #[test]
    fn test_transliterate_bengali_is_ascii() {
        let out = transliterate("ঈমান বৃদ্ধি করার উপায়");
        assert!(!out.is_empty());
        assert!(out.is_ascii());
    }

    #[test]
    fn test_base_slug_bengali_title() {
        let slug = base_slug("ঈমান বৃদ্ধি করার উপায়");
        assert!(is_valid_slug(&slug), "unexpected slug {slug}");
        assert!(!slug.starts_with("post-"));
        assert!(slug.contains('-'));
    }

    #[test]
    fn test_base_slug_is_deterministic() {
        assert_eq!(
            base_slug("নামাজের গুরুত্ব"),
            base_slug("নামাজের গুরুত্ব")
        );
    }

    #[test]
    fn test_base_slug_punctuation_only_falls_back() {
        let slug = base_slug(" ... !!! ");
        assert!(is_timestamp_fallback(&slug, "post-"), "got {slug}");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("hello-world-2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("-hello"));
        assert!(!is_valid_slug("hello--world"));
        assert!(!is_valid_slug("Hello"));
    }

    #[tokio::test]
    async fn test_generate_returns_base_when_free() {
        let store = MemoryStore::default();
        let slug = generate_unique_slug("Hello World", None, &store)
            .await
            .unwrap();
        assert_eq!(slug, "hello-world");
        assert_eq!(store.checks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generate_skips_taken_suffixes() {
        let store = MemoryStore::with(&["hello-world", "hello-world-2"]);
        let slug = generate_unique_slug("Hello World", None, &store)
            .await
            .unwrap();
        assert_eq!(slug, "hello-world-3");
        assert_eq!(store.checks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_generate_excludes_own_record() {
        let id = Uuid::now_v7();
        let mut store = MemoryStore::default();
        store.slugs.insert(id, "hello-world".to_string());

        let own = generate_unique_slug("Hello World", Some(id), &store)
            .await
            .unwrap();
        assert_eq!(own, "hello-world");

        let other = generate_unique_slug("Hello World", Some(Uuid::now_v7()), &store)
            .await
            .unwrap();
        assert_eq!(other, "hello-world-2");
    }

    #[tokio::test]
    async fn test_generate_same_title_twice() {
        let title = "ঈমান বৃদ্ধি করার উপায়";
        let mut store = MemoryStore::default();

        let first = generate_unique_slug(title, None, &store).await.unwrap();
        store.slugs.insert(Uuid::now_v7(), first.clone());
        let second = generate_unique_slug(title, None, &store).await.unwrap();

        assert_eq!(second, format!("{first}-2"));
    }

    #[tokio::test]
    async fn test_generate_exhausted_attempts_uses_timestamp() {
        let generator = SlugGenerator::new(SlugPolicy { max_attempts: 3 });
        let store = MemoryStore::with(&["hello", "hello-2", "hello-3"]);
        let slug = generator.generate("hello", None, &store).await.unwrap();

        assert!(is_timestamp_fallback(&slug, "hello-"), "got {slug}");
        assert_eq!(store.checks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_generate_zero_attempts_skips_checks() {
        let generator = SlugGenerator::new(SlugPolicy { max_attempts: 0 });
        let store = MemoryStore::default();
        let slug = generator.generate("hello", None, &store).await.unwrap();

        assert!(is_timestamp_fallback(&slug, "hello-"));
        assert_eq!(store.checks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generate_propagates_store_errors() {
        let err = generate_unique_slug("Hello", None, &FailingStore)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("store unavailable"));
    }

    #[test]
    fn test_default_policy() {
        assert_eq!(SlugPolicy::default().max_attempts, 50);
        assert_eq!(SlugGenerator::default().policy(), SlugPolicy::default());
    }
}
