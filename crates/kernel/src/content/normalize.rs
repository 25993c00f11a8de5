//! Pre-parse repair of legacy content.
//!
//! Older editor builds stored alignment wrappers with backslash-escaped
//! quotes (`<div align=\"center\">`), which the HTML parser cannot read as
//! an attribute. The repair runs before markdown parsing.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static ESCAPED_ALIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(div|p|span)\s+align=\\"(left|center|right|justify)\\">"#)
        .expect("valid regex literal")
});

/// Rewrite backslash-escaped `align` attributes on `div`, `p`, and `span`.
///
/// Input without the defect is returned borrowed and unchanged.
pub fn repair_legacy_align(input: &str) -> Cow<'_, str> {
    ESCAPED_ALIGN.replace_all(input, r#"<$1 align="$2">"#)
}
