//! NWU IAN test utilities.
//!
//! Helpers for integration testing: Bengali content fixtures, request body
//! builders, and assertion utilities for JSON and rendered HTML.

use serde_json::{Value as JsonValue, json};
use uuid::Uuid;

/// Post titles seen in practice, each with a distinct romanized form.
pub const BENGALI_TITLES: &[&str] = &[
    "ঈমান বৃদ্ধি করার উপায়",
    "নামাজের গুরুত্ব ও ফজিলত",
    "রমজানের প্রস্তুতি",
    "সদকার মাধ্যমে সমাজকল্যাণ",
];

/// Titles with nothing a slug can be built from.
pub const UNSLUGGABLE_TITLES: &[&str] = &["", "   ", "!!! ??? ...", "।।।", "— – …"];

/// Blockquote body attributed to the Qur'an.
pub const SCRIPTURE_QUOTE: &str = "> কুরআন: আল্লাহ তায়ালা বলেন, নিশ্চয়ই কষ্টের সাথে স্বস্তি রয়েছে।";

/// Blockquote body attributed to a hadith.
pub const TRADITION_QUOTE: &str = "> হাদিস: রাসূল (সাঃ) বলেছেন, সহজ করো, কঠিন করো না।";

/// Blockquote with no attribution.
pub const PLAIN_QUOTE: &str = "> নিছক উক্তি";

/// Markdown exercising the whole content pipeline.
pub fn sample_markdown() -> String {
    [
        "## ভূমিকা",
        "",
        "ঈমান **বৃদ্ধি** করার কয়েকটি উপায় নিচে দেওয়া হলো।",
        "",
        "<div align=\"center\">বিসমিল্লাহির রাহমানির রাহিম</div>",
        "",
        SCRIPTURE_QUOTE,
        "",
        TRADITION_QUOTE,
        "",
        "### তালিকা",
        "",
        "- [x] নিয়মিত নামাজ",
        "- [ ] কুরআন তিলাওয়াত",
        "",
        "| আমল | সময় |",
        "| --- | --- |",
        "| জিকির | সকাল |",
        "",
        "বিস্তারিত: https://example.com/iman",
    ]
    .join("\n")
}

/// Create a test post body with valid defaults.
pub fn test_post(title: &str) -> TestPost {
    TestPost {
        id: Uuid::now_v7(),
        title: title.to_string(),
        excerpt: String::new(),
        content: "এটি একটি পরীক্ষামূলক পোস্টের কনটেন্ট।".to_string(),
        featured_image: String::new(),
        category: String::new(),
        is_published: false,
    }
}

/// A post request builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct TestPost {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: String,
    pub category: String,
    pub is_published: bool,
}

impl TestPost {
    /// Set a custom ID.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_excerpt(mut self, excerpt: &str) -> Self {
        self.excerpt = excerpt.to_string();
        self
    }

    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    pub fn with_image(mut self, url: &str) -> Self {
        self.featured_image = url.to_string();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    /// Set as published.
    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }

    /// Set as draft.
    pub fn draft(mut self) -> Self {
        self.is_published = false;
        self
    }

    /// The JSON body accepted by `POST /api/admin/posts`.
    pub fn to_json(&self) -> JsonValue {
        json!({
            "title": self.title,
            "excerpt": self.excerpt,
            "content": self.content,
            "featuredImage": self.featured_image,
            "category": self.category,
            "isPublished": self.is_published,
        })
    }
}

/// A minimal PNG header, enough for content sniffing.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

/// Build a `multipart/form-data` body with one file field.
///
/// Returns the body and the matching `Content-Type` header value.
pub fn multipart_file(
    field: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> (Vec<u8>, String) {
    let boundary = format!("----nwuian{}", Uuid::now_v7().simple());
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    (body, format!("multipart/form-data; boundary={boundary}"))
}

/// Assertion helpers for JSON and HTML content.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON error body carries exactly `message`.
    pub fn message_eq(value: &Value, message: &str) {
        assert_eq!(
            value.get("message").and_then(Value::as_str),
            Some(message),
            "Expected error message '{message}', got: {value}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string NOT to contain '{needle}'\nActual: {haystack}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_json_uses_api_field_names() {
        let body = test_post("ঈমান বৃদ্ধি করার উপায়")
            .with_category("আকিদা")
            .published()
            .to_json();
        assert_eq!(body["title"], "ঈমান বৃদ্ধি করার উপায়");
        assert_eq!(body["category"], "আকিদা");
        assert_eq!(body["isPublished"], true);
        assert!(body.get("featuredImage").is_some());
        assert!(body.get("id").is_none());
    }

    #[test]
    fn multipart_body_is_framed() {
        let (body, content_type) = multipart_file("file", "a.png", "image/png", PNG_BYTES);
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap_or_default();
        assert!(!boundary.is_empty());

        let text = String::from_utf8_lossy(&body);
        assert!(text.starts_with(&format!("--{boundary}\r\n")));
        assert!(text.ends_with(&format!("--{boundary}--\r\n")));
        assert!(text.contains("name=\"file\"; filename=\"a.png\""));
    }

    #[test]
    fn sample_markdown_has_every_quote_kind() {
        let md = sample_markdown();
        assert!(md.contains(SCRIPTURE_QUOTE));
        assert!(md.contains(TRADITION_QUOTE));
    }
}
