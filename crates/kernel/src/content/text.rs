//! Plain-text helpers for listings and post metadata.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use regex::Regex;

/// Default excerpt length in words.
pub const DEFAULT_EXCERPT_WORDS: usize = 120;

/// Reading speed used for estimates, in words per minute.
pub const WORDS_PER_MINUTE: usize = 170;

/// Bangladesh Standard Time, UTC+6, no daylight saving.
const DHAKA_OFFSET_SECS: i32 = 6 * 3600;

const BN_DIGITS: [char; 10] = ['০', '১', '২', '৩', '৪', '৫', '৬', '৭', '৮', '৯'];

const BN_MONTHS: [&str; 12] = [
    "জানুয়ারী",
    "ফেব্রুয়ারী",
    "মার্চ",
    "এপ্রিল",
    "মে",
    "জুন",
    "জুলাই",
    "আগস্ট",
    "সেপ্টেম্বর",
    "অক্টোবর",
    "নভেম্বর",
    "ডিসেম্বর",
];

/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex literal"));

/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static MARKDOWN_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[`*_>#~\[\]()\-]").expect("valid regex literal"));

/// Remove HTML tags and common markdown punctuation, collapsing whitespace.
pub fn strip_markdown(text: &str) -> String {
    let without_tags = HTML_TAG.replace_all(text, " ");
    let without_tokens = MARKDOWN_TOKEN.replace_all(&without_tags, " ");
    collapse_whitespace(&without_tokens)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max_words` words of the stripped text, with `…` when truncated.
pub fn to_excerpt(text: &str, max_words: usize) -> String {
    let clean = strip_markdown(text);
    let words: Vec<&str> = clean.split(' ').collect();
    if words.len() <= max_words {
        return clean;
    }
    format!("{}…", words[..max_words].join(" "))
}

/// Estimated reading time in whole minutes, never less than one.
pub fn estimate_reading_minutes(text: &str) -> u32 {
    let words = strip_markdown(text).split_whitespace().count();
    let minutes = (words as f64 / WORDS_PER_MINUTE as f64).round() as u32;
    minutes.max(1)
}

/// Replace ASCII digits with Bengali digits.
pub fn to_bn_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) if c.is_ascii_digit() => BN_DIGITS[d as usize],
            _ => c,
        })
        .collect()
}

/// Format an integer the way `bn-BD` does: Bengali digits with Indian
/// grouping (last three digits, then pairs), e.g. `১২,৩৪,৫৬৭`.
pub fn format_bn_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 2);

    if digits.len() <= 3 {
        grouped.push_str(&digits);
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let lead = head.len() % 2;
        if lead == 1 {
            grouped.push_str(&head[..1]);
        }
        for (i, pair) in head.as_bytes()[lead..].chunks(2).enumerate() {
            if i > 0 || lead == 1 {
                grouped.push(',');
            }
            grouped.push_str(&String::from_utf8_lossy(pair));
        }
        grouped.push(',');
        grouped.push_str(tail);
    }

    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{}", to_bn_digits(&grouped))
}

/// Long Bengali date in Dhaka local time, e.g. `১৮ অক্টোবর, ২০২৬`.
pub fn format_bn_date(at: DateTime<Utc>) -> String {
    let local = match FixedOffset::east_opt(DHAKA_OFFSET_SECS) {
        Some(offset) => at.with_timezone(&offset).date_naive(),
        None => at.date_naive(),
    };
    let month = BN_MONTHS[local.month0() as usize];
    to_bn_digits(&format!("{} {month}, {}", local.day(), local.year()))
}

/// HTML-escape a string for safe output.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
