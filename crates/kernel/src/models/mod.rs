//! Database models and input validation.

mod category;
mod post;
mod site_page;

pub use category::{Category, CreateCategory};
pub use post::{CreatePost, NewPost, Post, PostChanges, UpdatePost, escape_like};
pub use site_page::{PageSlug, SitePage, UpsertSitePage};

/// Messages of every failed validation rule, in rule order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Violations(Vec<&'static str>);

impl Violations {
    /// Record `message` unless `ok` holds.
    pub fn check(&mut self, ok: bool, message: &'static str) {
        if !ok {
            self.0.push(message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> &[&'static str] {
        &self.0
    }

    /// `Ok` when nothing failed, otherwise the messages joined with ` | `.
    pub fn into_result(self) -> Result<(), String> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0.join(" | "))
        }
    }
}

/// Length in Unicode scalar values.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}
