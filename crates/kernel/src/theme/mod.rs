//! Theme engine and template rendering.
//!
//! Provides Tera-based page rendering with filters for post content,
//! Bengali dates and numbers, excerpts, and image delivery URLs.

mod engine;

pub use engine::ThemeEngine;
