//! Presentation-only classifiers applied while building the render tree.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static PRIMARY_SCRIPTURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^কুরআন\s*[:：]").expect("valid regex literal"));

/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static SECONDARY_TRADITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^হাদিস\s*[:：]").expect("valid regex literal"));

/// Kind of quotation a blockquote holds, derived from its label prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationKind {
    Unlabeled,
    /// Starts with `কুরআন:`.
    PrimaryScripture,
    /// Starts with `হাদিস:`.
    SecondaryTradition,
}

impl QuotationKind {
    /// Heading shown above the quotation, if any.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Unlabeled => None,
            Self::PrimaryScripture => Some("কুরআনের বাণী"),
            Self::SecondaryTradition => Some("হাদিস"),
        }
    }

    /// CSS modifier class for the blockquote.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Unlabeled => "quote--plain",
            Self::PrimaryScripture => "quote--scripture",
            Self::SecondaryTradition => "quote--tradition",
        }
    }
}

/// Classify the flattened text of a blockquote.
///
/// Leading and trailing whitespace is ignored; the match is case-sensitive
/// and anchored at the start. The colon may be ASCII or full-width.
pub fn classify(text: &str) -> QuotationKind {
    let text = text.trim();
    if PRIMARY_SCRIPTURE.is_match(text) {
        QuotationKind::PrimaryScripture
    } else if SECONDARY_TRADITION.is_match(text) {
        QuotationKind::SecondaryTradition
    } else {
        QuotationKind::Unlabeled
    }
}

/// Text alignment carried by an `align` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Parse an `align` attribute value. Only the exact lowercase keywords
    /// are recognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }

    /// Utility class applied to the aligned node.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Left => "text-left",
            Self::Center => "text-center",
            Self::Right => "text-right",
            Self::Justify => "text-justify",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_primary_scripture() {
        assert_eq!(
            classify("কুরআন: আল্লাহ তায়ালা বলেন..."),
            QuotationKind::PrimaryScripture
        );
        assert_eq!(classify("কুরআন : সূরা ফাতিহা"), QuotationKind::PrimaryScripture);
        assert_eq!(classify("কুরআন：সূরা ফাতিহা"), QuotationKind::PrimaryScripture);
    }

    #[test]
    fn classifies_secondary_tradition() {
        assert_eq!(
            classify("হাদিস: রাসূল (সাঃ) বলেছেন..."),
            QuotationKind::SecondaryTradition
        );
        assert_eq!(classify("\n  হাদিস： বুখারী"), QuotationKind::SecondaryTradition);
    }

    #[test]
    fn plain_quotes_are_unlabeled() {
        assert_eq!(classify("নিছক উক্তি"), QuotationKind::Unlabeled);
        assert_eq!(classify(""), QuotationKind::Unlabeled);
    }

    #[test]
    fn label_must_be_at_start() {
        assert_eq!(
            classify("তিনি বললেন কুরআন: পড়ুন"),
            QuotationKind::Unlabeled
        );
    }

    #[test]
    fn label_requires_colon() {
        assert_eq!(classify("কুরআন পড়ুন"), QuotationKind::Unlabeled);
        assert_eq!(classify("হাদিসের কথা"), QuotationKind::Unlabeled);
    }

    #[test]
    fn labels() {
        assert_eq!(QuotationKind::PrimaryScripture.label(), Some("কুরআনের বাণী"));
        assert_eq!(QuotationKind::SecondaryTradition.label(), Some("হাদিস"));
        assert_eq!(QuotationKind::Unlabeled.label(), None);
    }

    #[test]
    fn alignment_parse() {
        assert_eq!(Alignment::parse("center"), Some(Alignment::Center));
        assert_eq!(Alignment::parse("justify"), Some(Alignment::Justify));
        assert_eq!(Alignment::parse("Center"), None);
        assert_eq!(Alignment::parse("middle"), None);
    }

    #[test]
    fn alignment_classes() {
        assert_eq!(Alignment::Left.class_name(), "text-left");
        assert_eq!(Alignment::Right.class_name(), "text-right");
        assert_eq!(Alignment::Center.as_str(), "center");
    }
}
