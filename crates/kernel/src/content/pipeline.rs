//! Markdown + HTML content pipeline.
//!
//! Stages, in order:
//! 1. legacy alignment repair
//! 2. CommonMark/GFM parsing (raw HTML passes through)
//! 3. allowlist sanitization
//! 4. render tree construction with presentation enrichment

use std::sync::LazyLock;

use pulldown_cmark::{Options, Parser, html};

use crate::content::normalize::repair_legacy_align;
use crate::content::render::RenderTree;
use crate::content::sanitize::SanitizePolicy;

/// Shared default pipeline. Building the sanitizer is not free, so it is
/// done once.
static DEFAULT_PIPELINE: LazyLock<ContentPipeline> = LazyLock::new(ContentPipeline::default);

/// Converts author content into a sanitized [`RenderTree`].
///
/// Rendering never fails: markup the policy does not allow is dropped.
pub struct ContentPipeline {
    policy: SanitizePolicy,
    sanitizer: ammonia::Builder<'static>,
}

impl ContentPipeline {
    /// Create a pipeline for the given sanitization policy.
    pub fn new(policy: SanitizePolicy) -> Self {
        let sanitizer = policy.build();
        Self { policy, sanitizer }
    }

    /// The sanitization policy in effect.
    pub fn policy(&self) -> &SanitizePolicy {
        &self.policy
    }

    /// Markdown options: GFM tables, strikethrough, and task lists.
    fn markdown_options() -> Options {
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
    }

    /// Run stages 1 to 3 and return sanitized HTML.
    pub fn sanitize(&self, input: &str) -> String {
        let repaired = repair_legacy_align(input);

        let parser = Parser::new_ext(&repaired, Self::markdown_options());
        let mut unsafe_html = String::with_capacity(repaired.len() * 3 / 2);
        html::push_html(&mut unsafe_html, parser);

        self.sanitizer.clean(&unsafe_html).to_string()
    }

    /// Render content into a tree.
    pub fn render(&self, input: &str) -> RenderTree {
        RenderTree::from_sanitized_html(&self.sanitize(input))
    }
}

impl Default for ContentPipeline {
    fn default() -> Self {
        Self::new(SanitizePolicy::default())
    }
}

/// Render content with the default pipeline.
pub fn render_content(input: &str) -> RenderTree {
    DEFAULT_PIPELINE.render(input)
}

/// Render content with the default pipeline straight to HTML.
pub fn render_content_html(input: &str) -> String {
    render_content(input).to_html()
}
