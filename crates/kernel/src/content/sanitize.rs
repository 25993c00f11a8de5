//! HTML allowlist for rendered post content.
//!
//! The allowlist is plain data: a set of permitted tags, a map from tag to
//! permitted attributes, and a handful of value rules. [`SanitizePolicy::build`]
//! turns it into an `ammonia` sanitizer.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::content::classify::Alignment;

/// Safe-HTML baseline tags (GitHub-style, covers everything the markdown
/// renderer emits).
const BASELINE_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "code", "dd", "del", "details", "dl", "dt", "em", "h1", "h2",
    "h3", "h4", "h5", "h6", "hr", "i", "img", "input", "ins", "kbd", "li", "ol", "p", "pre", "q",
    "rp", "rt", "ruby", "s", "samp", "section", "strike", "strong", "sub", "summary", "sup",
    "table", "tbody", "td", "tfoot", "th", "thead", "tr", "tt", "ul", "var",
];

/// Baseline per-tag attributes.
const BASELINE_TAG_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "title"]),
    ("img", &["src", "alt", "title", "width", "height"]),
    ("blockquote", &["cite"]),
    ("q", &["cite"]),
    ("del", &["cite"]),
    ("ins", &["cite"]),
    ("ol", &["start"]),
    ("code", &["class"]),
    ("input", &["type", "checked", "disabled"]),
    ("td", &["colspan", "rowspan", "style"]),
    ("th", &["colspan", "rowspan", "style"]),
];

/// Attributes allowed on every permitted tag.
const GENERIC_ATTRIBUTES: &[&str] = &["lang", "title"];

/// URL schemes allowed in `href`/`src`.
const URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Tags removed together with their content.
const CLEAN_CONTENT_TAGS: &[&str] = &["script", "style"];

/// Extension: alignment wrappers authors may write as raw HTML.
const ALIGNMENT_TAGS: &[&str] = &["div", "span"];
const ALIGNMENT_ATTRIBUTE_TAGS: &[&str] = &["div", "p", "span"];

/// Allowlist describing which markup survives sanitization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizePolicy {
    tags: BTreeSet<&'static str>,
    tag_attributes: BTreeMap<&'static str, BTreeSet<&'static str>>,
    generic_attributes: BTreeSet<&'static str>,
    url_schemes: BTreeSet<&'static str>,
    clean_content_tags: BTreeSet<&'static str>,
}

impl SanitizePolicy {
    /// The safe-HTML baseline without any extensions.
    pub fn baseline() -> Self {
        let mut tag_attributes: BTreeMap<&'static str, BTreeSet<&'static str>> = BTreeMap::new();
        for (tag, attrs) in BASELINE_TAG_ATTRIBUTES {
            tag_attributes
                .entry(tag)
                .or_default()
                .extend(attrs.iter().copied());
        }

        Self {
            tags: BASELINE_TAGS.iter().copied().collect(),
            tag_attributes,
            generic_attributes: GENERIC_ATTRIBUTES.iter().copied().collect(),
            url_schemes: URL_SCHEMES.iter().copied().collect(),
            clean_content_tags: CLEAN_CONTENT_TAGS.iter().copied().collect(),
        }
    }

    /// Baseline extended with `div`/`span` and `align` on `div`, `p`, `span`.
    pub fn with_alignment() -> Self {
        let mut policy = Self::baseline();
        policy.tags.extend(ALIGNMENT_TAGS.iter().copied());
        for tag in ALIGNMENT_ATTRIBUTE_TAGS {
            policy.tag_attributes.entry(tag).or_default().insert("align");
        }
        policy
    }

    /// Whether `tag` survives sanitization.
    pub fn allows_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Whether `attribute` survives on `tag` (before value rules).
    pub fn allows_attribute(&self, tag: &str, attribute: &str) -> bool {
        self.allows_tag(tag)
            && (self.generic_attributes.contains(attribute)
                || self
                    .tag_attributes
                    .get(tag)
                    .is_some_and(|attrs| attrs.contains(attribute)))
    }

    /// Build the sanitizer for this policy.
    pub fn build(&self) -> ammonia::Builder<'static> {
        let tag_attributes: HashMap<&'static str, HashSet<&'static str>> = self
            .tag_attributes
            .iter()
            .map(|(tag, attrs)| (*tag, attrs.iter().copied().collect()))
            .collect();

        let mut builder = ammonia::Builder::empty();
        builder
            .tags(self.tags.iter().copied().collect())
            .tag_attributes(tag_attributes)
            .generic_attributes(self.generic_attributes.iter().copied().collect())
            .url_schemes(self.url_schemes.iter().copied().collect())
            .clean_content_tags(self.clean_content_tags.iter().copied().collect())
            .url_relative(ammonia::UrlRelative::PassThrough)
            .link_rel(Some("noopener noreferrer"))
            .strip_comments(true)
            .attribute_filter(filter_attribute_value);
        builder
    }
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self::with_alignment()
    }
}

/// Value rules for attributes whose presence alone is not enough.
///
/// Returning `None` drops the attribute.
pub fn filter_attribute_value<'u>(
    element: &str,
    attribute: &str,
    value: &'u str,
) -> Option<Cow<'u, str>> {
    match (element, attribute) {
        (_, "align") => Alignment::parse(value.trim()).map(|a| Cow::Borrowed(a.as_str())),
        ("code", "class") => {
            let classes: Vec<&str> = value
                .split_whitespace()
                .filter(|c| is_language_class(c))
                .collect();
            if classes.is_empty() {
                None
            } else {
                Some(Cow::Owned(classes.join(" ")))
            }
        }
        ("input", "type") => (value == "checkbox").then_some(Cow::Borrowed(value)),
        ("td" | "th", "style") => table_alignment(value).map(Cow::Borrowed),
        _ => Some(Cow::Borrowed(value)),
    }
}

/// `language-rust`, `language-c++` and the like.
fn is_language_class(class: &str) -> bool {
    class.strip_prefix("language-").is_some_and(|lang| {
        !lang.is_empty()
            && lang
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#'))
    })
}

/// Accept only the `text-align` declaration emitted for GFM table columns.
fn table_alignment(style: &str) -> Option<&'static str> {
    let (property, value) = style.trim().trim_end_matches(';').split_once(':')?;
    if property.trim() != "text-align" {
        return None;
    }
    match value.trim() {
        "left" => Some("text-align: left"),
        "center" => Some("text-align: center"),
        "right" => Some("text-align: right"),
        _ => None,
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn clean(input: &str) -> String {
        SanitizePolicy::default().build().clean(input).to_string()
    }

    #[test]
    fn baseline_excludes_alignment_extension() {
        let policy = SanitizePolicy::baseline();
        assert!(!policy.allows_tag("div"));
        assert!(!policy.allows_tag("span"));
        assert!(!policy.allows_attribute("p", "align"));
    }

    #[test]
    fn alignment_extension_permits_div_span_and_align() {
        let policy = SanitizePolicy::with_alignment();
        assert!(policy.allows_tag("div"));
        assert!(policy.allows_tag("span"));
        for tag in ["div", "p", "span"] {
            assert!(policy.allows_attribute(tag, "align"), "{tag} should allow align");
        }
        assert!(!policy.allows_attribute("h2", "align"));
    }

    #[test]
    fn event_handlers_are_never_allowed() {
        let policy = SanitizePolicy::default();
        assert!(!policy.allows_attribute("div", "onclick"));
        assert!(!policy.allows_attribute("a", "onmouseover"));
        assert!(!policy.allows_attribute("p", "style"));
        assert!(!policy.allows_tag("script"));
        assert!(!policy.allows_tag("iframe"));
    }

    #[test]
    fn strips_script_with_content() {
        let out = clean("<p>ভালো</p><script>alert(1)</script>");
        assert_eq!(out, "<p>ভালো</p>");
    }

    #[test]
    fn strips_onclick() {
        let out = clean(r#"<div align="center" onclick="alert(1)">x</div>"#);
        assert_eq!(out, r#"<div align="center">x</div>"#);
    }

    #[test]
    fn drops_unknown_align_values() {
        assert_eq!(clean(r#"<p align="middle">x</p>"#), "<p>x</p>");
    }

    #[test]
    fn drops_javascript_urls() {
        let out = clean(r#"<a href="javascript:alert(1)">x</a>"#);
        assert!(!out.contains("javascript"));
    }

    #[test]
    fn links_get_rel() {
        let out = clean(r#"<a href="https://example.com">x</a>"#);
        assert!(out.contains(r#"rel="noopener noreferrer""#));
    }

    #[test]
    fn keeps_language_classes_only() {
        assert_eq!(
            filter_attribute_value("code", "class", "language-rust evil"),
            Some(Cow::Owned("language-rust".to_string()))
        );
        assert_eq!(filter_attribute_value("code", "class", "evil"), None);
    }

    #[test]
    fn table_style_is_restricted_to_alignment() {
        assert_eq!(
            filter_attribute_value("td", "style", "text-align: center"),
            Some(Cow::Borrowed("text-align: center"))
        );
        assert_eq!(
            filter_attribute_value("td", "style", "background: url(x)"),
            None
        );
    }

    #[test]
    fn checkbox_inputs_only() {
        assert!(filter_attribute_value("input", "type", "checkbox").is_some());
        assert!(filter_attribute_value("input", "type", "text").is_none());
    }

    #[test]
    fn unknown_tags_are_unwrapped() {
        let out = clean("<marquee>হ্যালো</marquee>");
        assert_eq!(out, "হ্যালো");
    }
}
