//! Sanitized render tree for post content.
//!
//! The tree is built from already-sanitized HTML. Presentation enrichment
//! (alignment classes, heading treatment, quotation labels, code styling,
//! bare URL and email links) happens here, after sanitization, so the nodes it adds
//! are never subject to the author-facing allowlist.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node};
use serde::Serialize;

use crate::content::classify::{Alignment, QuotationKind, classify};
use crate::content::text::html_escape;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "wbr"];

/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static AUTOLINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:https?://|www\.)[^\s<>"']+|[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+"#,
    )
    .expect("valid regex literal")
});

/// Punctuation that ends a sentence rather than a link.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ':', ';', '!', '?', ')', '।'];

/// Root of a rendered document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderTree {
    pub nodes: Vec<RenderNode>,
}

/// A node in the render tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderNode {
    Element(RenderElement),
    Text { value: String },
}

/// An element whose tag and attributes passed the allowlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderElement {
    pub tag: String,
    /// Sanitized attributes, excluding `class`.
    pub attributes: BTreeMap<String, String>,
    /// Presentation classes.
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quotation: Option<QuotationKind>,
    pub children: Vec<RenderNode>,
}

impl RenderElement {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            alignment: None,
            quotation: None,
            children: Vec::new(),
        }
    }

    /// Concatenated text of all descendant text nodes, markup ignored.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

impl RenderNode {
    fn text(value: &str) -> Self {
        Self::Text {
            value: value.to_string(),
        }
    }

    /// The element, if this node is one.
    pub fn as_element(&self) -> Option<&RenderElement> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text { .. } => None,
        }
    }
}

fn collect_text(nodes: &[RenderNode], out: &mut String) {
    for node in nodes {
        match node {
            RenderNode::Text { value } => out.push_str(value),
            RenderNode::Element(el) => collect_text(&el.children, out),
        }
    }
}

/// Where in the document a node is being built.
#[derive(Debug, Clone, Copy, Default)]
struct Context {
    in_pre: bool,
    /// Inside `a`, `code`, or `pre`: bare URLs stay text.
    no_autolink: bool,
}

impl RenderTree {
    /// Build the tree from sanitized HTML.
    pub fn from_sanitized_html(html: &str) -> Self {
        let fragment = Html::parse_fragment(html);
        Self {
            nodes: build_children(fragment.root_element(), Context::default()),
        }
    }

    /// Serialize to an HTML string.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(node, &mut out);
        }
        out
    }

    /// Depth-first iterator over every element in the tree.
    pub fn elements(&self) -> Vec<&RenderElement> {
        fn walk<'a>(nodes: &'a [RenderNode], out: &mut Vec<&'a RenderElement>) {
            for node in nodes {
                if let RenderNode::Element(el) = node {
                    out.push(el);
                    walk(&el.children, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out
    }

    /// All text in the tree, markup ignored.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.nodes, &mut out);
        out
    }
}

fn build_children(parent: ElementRef<'_>, ctx: Context) -> Vec<RenderNode> {
    let mut out = Vec::new();
    for child in parent.children() {
        match child.value() {
            Node::Text(text) => push_text(&mut out, text, ctx),
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    out.push(RenderNode::Element(build_element(el, ctx)));
                }
            }
            _ => {}
        }
    }
    out
}

fn build_element(el: ElementRef<'_>, ctx: Context) -> RenderElement {
    let source = el.value();
    let tag = source.name();
    let mut node = RenderElement::new(tag);

    let mut source_classes = Vec::new();
    for (name, value) in source.attrs() {
        if name == "class" {
            source_classes.extend(value.split_whitespace().map(String::from));
        } else {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    let child_ctx = Context {
        in_pre: ctx.in_pre || tag == "pre",
        no_autolink: ctx.no_autolink || matches!(tag, "a" | "code" | "pre"),
    };
    node.children = build_children(el, child_ctx);

    match tag {
        "div" | "p" | "span" => {
            node.alignment = node.attributes.get("align").and_then(|a| Alignment::parse(a));
            if let Some(alignment) = node.alignment {
                node.classes.push(alignment.class_name().to_string());
            }
        }
        "h2" => node.classes.push("heading-separated".to_string()),
        "h3" => node.classes.push("heading-spaced".to_string()),
        "blockquote" => {
            // Source text, so labels injected into nested quotes are not seen.
            let kind = classify(&el.text().collect::<String>());
            node.quotation = Some(kind);
            node.classes.push("quote".to_string());
            node.classes.push(kind.class_name().to_string());
            if let Some(label) = kind.label() {
                let mut heading = RenderElement::new("div");
                heading.classes.push("quote-label".to_string());
                heading.children.push(RenderNode::text(label));
                node.children.insert(0, RenderNode::Element(heading));
            }
        }
        "pre" => node.classes.push("code-block".to_string()),
        "code" if !ctx.in_pre => node.classes.push("code-inline".to_string()),
        _ => {}
    }

    node.classes.extend(source_classes);
    node
}

/// Append a text node, turning bare URLs, `www.` hosts and email
/// addresses into links where allowed.
fn push_text(out: &mut Vec<RenderNode>, text: &str, ctx: Context) {
    if ctx.no_autolink {
        out.push(RenderNode::text(text));
        return;
    }

    let mut last = 0;
    for m in AUTOLINK.find_iter(text) {
        let shown = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        let Some(href) = autolink_href(shown) else {
            continue;
        };
        let start = m.start();
        if start > last {
            out.push(RenderNode::text(&text[last..start]));
        }

        let mut link = RenderElement::new("a");
        link.attributes.insert("href".to_string(), href);
        link.attributes
            .insert("rel".to_string(), "noopener noreferrer".to_string());
        link.children.push(RenderNode::text(shown));
        out.push(RenderNode::Element(link));

        last = start + shown.len();
    }

    if last < text.len() {
        out.push(RenderNode::text(&text[last..]));
    }
}

/// Link target for an autolink candidate, or `None` when nothing is left
/// after the scheme or host prefix.
fn autolink_href(shown: &str) -> Option<String> {
    if let Some(rest) = shown
        .strip_prefix("https://")
        .or_else(|| shown.strip_prefix("http://"))
    {
        return (!rest.is_empty()).then(|| shown.to_string());
    }
    if let Some(host) = shown.strip_prefix("www.") {
        return (!host.is_empty()).then(|| format!("http://{shown}"));
    }
    let (local, domain) = shown.split_once('@')?;
    let valid = !local.is_empty()
        && domain.contains('.')
        && !domain.ends_with(['.', '-'])
        && !domain.starts_with(['.', '-']);
    valid.then(|| format!("mailto:{shown}"))
}

fn write_node(node: &RenderNode, out: &mut String) {
    match node {
        RenderNode::Text { value } => out.push_str(&html_escape(value)),
        RenderNode::Element(el) => write_element(el, out),
    }
}

fn write_element(el: &RenderElement, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    if !el.classes.is_empty() {
        let _ = write!(out, r#" class="{}""#, html_escape(&el.classes.join(" ")));
    }
    for (name, value) in &el.attributes {
        let _ = write!(out, r#" {name}="{}""#, html_escape(value));
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&el.tag.as_str()) {
        return;
    }

    for child in &el.children {
        write_node(child, out);
    }
    let _ = write!(out, "</{}>", el.tag);
}
