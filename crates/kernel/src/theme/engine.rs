//! Theme engine with Tera templates and Bengali presentation filters.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tera::{Tera, Value};
use tracing::debug;

use crate::content::render_content_html;
use crate::content::text::{
    DEFAULT_EXCERPT_WORDS, estimate_reading_minutes, format_bn_date, format_bn_number, to_excerpt,
};
use crate::file::optimized_image_url;

/// Theme engine for rendering templates.
pub struct ThemeEngine {
    /// Tera template engine instance.
    tera: Tera,
}

impl ThemeEngine {
    /// Create a new theme engine loading templates from the given directory.
    pub fn new(template_dir: &Path) -> Result<Self> {
        let pattern = template_dir.join("**/*.html");
        let pattern_str = pattern
            .to_str()
            .context("invalid template directory path")?;

        let mut tera = Tera::new(pattern_str).context("failed to initialize Tera templates")?;

        Self::register_filters(&mut tera);

        let template_names: Vec<_> = tera.get_template_names().collect();
        debug!(count = template_names.len(), "loaded templates");

        Ok(Self { tera })
    }

    /// Register custom Tera filters.
    fn register_filters(tera: &mut Tera) {
        // Post content through the sanitizing pipeline; use with `| safe`.
        tera.register_filter(
            "markdown",
            |value: &Value, _args: &HashMap<String, Value>| {
                let text = tera::try_get_value!("markdown", "value", String, value);
                Ok(Value::String(render_content_html(&text)))
            },
        );

        // RFC 3339 timestamps as a long Bengali date.
        tera.register_filter(
            "bn_date",
            |value: &Value, _args: &HashMap<String, Value>| {
                let formatted = value
                    .as_str()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|dt| format_bn_date(dt.with_timezone(&Utc)))
                    .unwrap_or_default();
                Ok(Value::String(formatted))
            },
        );

        tera.register_filter(
            "bn_number",
            |value: &Value, _args: &HashMap<String, Value>| {
                let formatted = value.as_i64().map(format_bn_number).unwrap_or_default();
                Ok(Value::String(formatted))
            },
        );

        tera.register_filter(
            "excerpt",
            |value: &Value, args: &HashMap<String, Value>| {
                let text = tera::try_get_value!("excerpt", "value", String, value);
                let words = args
                    .get("words")
                    .and_then(Value::as_u64)
                    .map_or(DEFAULT_EXCERPT_WORDS, |w| w as usize);
                Ok(Value::String(to_excerpt(&text, words)))
            },
        );

        tera.register_filter(
            "reading_minutes",
            |value: &Value, _args: &HashMap<String, Value>| {
                let text = tera::try_get_value!("reading_minutes", "value", String, value);
                Ok(Value::from(estimate_reading_minutes(&text)))
            },
        );

        tera.register_filter(
            "optimized_image",
            |value: &Value, args: &HashMap<String, Value>| {
                let src = tera::try_get_value!("optimized_image", "value", String, value);
                let width = args
                    .get("width")
                    .and_then(Value::as_u64)
                    .and_then(|w| u32::try_from(w).ok());
                Ok(Value::String(optimized_image_url(&src, width)))
            },
        );
    }

    /// Get the underlying Tera instance for custom operations.
    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// Render a named template.
    pub fn render(&self, template: &str, context: &tera::Context) -> Result<String> {
        self.tera
            .render(template, context)
            .with_context(|| format!("failed to render template {template}"))
    }
}

impl std::fmt::Debug for ThemeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeEngine")
            .field("template_count", &self.tera.get_template_names().count())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn render(template: &str, ctx: &tera::Context) -> String {
        let mut tera = Tera::default();
        ThemeEngine::register_filters(&mut tera);
        tera.add_raw_template("test", template).unwrap();
        ThemeEngine { tera }.render("test", ctx).unwrap()
    }

    #[test]
    fn test_bn_date_filter() {
        let mut ctx = tera::Context::new();
        ctx.insert("ts", "2026-10-18T06:00:00Z");
        assert_eq!(render("{{ ts | bn_date }}", &ctx), "১৮ অক্টোবর, ২০২৬");
    }

    #[test]
    fn test_bn_date_filter_with_garbage() {
        let mut ctx = tera::Context::new();
        ctx.insert("ts", "not a date");
        assert_eq!(render("{{ ts | bn_date }}", &ctx), "");
    }

    #[test]
    fn test_bn_number_filter() {
        let mut ctx = tera::Context::new();
        ctx.insert("n", &1_234_567_i64);
        assert_eq!(render("{{ n | bn_number }}", &ctx), "১২,৩৪,৫৬৭");
    }

    #[test]
    fn test_markdown_filter_is_sanitized() {
        let mut ctx = tera::Context::new();
        ctx.insert("body", "**হ্যালো**<script>alert(1)</script>");
        let out = render("{{ body | markdown | safe }}", &ctx);
        assert!(out.contains("<strong>হ্যালো</strong>"));
        assert!(!out.contains("script"));
    }

    #[test]
    fn test_excerpt_filter() {
        let mut ctx = tera::Context::new();
        ctx.insert("body", "## এক দুই তিন চার");
        assert_eq!(render("{{ body | excerpt(words=2) }}", &ctx), "এক দুই…");
    }

    #[test]
    fn test_reading_minutes_filter() {
        let mut ctx = tera::Context::new();
        ctx.insert("body", "ছোট লেখা");
        assert_eq!(render("{{ body | reading_minutes }}", &ctx), "1");
    }

    #[test]
    fn test_optimized_image_filter() {
        let mut ctx = tera::Context::new();
        ctx.insert(
            "src",
            "https://res.cloudinary.com/demo/image/upload/v1/a.jpg",
        );
        let out = render("{{ src | optimized_image(width=640) }}", &ctx);
        assert!(out.contains("c_limit,w_640"));
    }
}
