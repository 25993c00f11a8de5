//! Post content: rendering pipeline, text helpers, and post persistence.
//!
//! This module provides:
//! - ContentPipeline: markdown + limited HTML to a sanitized render tree
//! - SanitizePolicy: the allowlist applied during rendering
//! - Text helpers: excerpts, reading time, Bengali numbers and dates
//! - PostService: post writes with unique slug assignment

pub mod classify;
pub mod normalize;
mod pipeline;
pub mod render;
pub mod sanitize;
mod post_service;
pub mod text;

pub use classify::{Alignment, QuotationKind, classify};
pub use pipeline::{ContentPipeline, render_content, render_content_html};
pub use post_service::{DEFAULT_CONFLICT_RETRIES, PgPostStore, PostService, PostStore, SlugConflict};
pub use render::{RenderElement, RenderNode, RenderTree};
pub use sanitize::SanitizePolicy;
