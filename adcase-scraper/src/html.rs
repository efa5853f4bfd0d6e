//! Regex-level HTML scraping.
//!
//! Search result pages and agency sites are too inconsistent for a strict
//! parser to buy much; these helpers pull out the few things the gatherers
//! need and tolerate anything else.

use std::sync::LazyLock;

use adcase_core::text::decode_html_entities;
use adcase_core::url::resolve_href;
use regex::Regex;

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>").expect("static pattern"));

static META_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b([^>]*)/?>").expect("static pattern"));

static IFRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<iframe\b([^>]*)>").expect("static pattern"));

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("static pattern"));

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:][a-z0-9_:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("static pattern")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("static pattern"));

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static pattern"));

/// An outbound link found on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Absolute, normalized URL.
    pub href: String,
    /// Visible text, falling back to the `title` attribute.
    pub text: String,
}

/// Value of attribute `name` (case-insensitive) in a tag's attribute text.
pub fn attr(attrs: &str, name: &str) -> Option<String> {
    ATTR_RE.captures_iter(attrs).find_map(|cap| {
        if !cap[1].eq_ignore_ascii_case(name) {
            return None;
        }
        let value = cap
            .get(2)
            .or_else(|| cap.get(3))
            .or_else(|| cap.get(4))
            .map(|m| m.as_str())
            .unwrap_or("");
        Some(decode_html_entities(value))
    })
}

/// Tag-stripped, entity-decoded, whitespace-collapsed text.
pub fn inner_text(html: &str) -> String {
    let stripped = TAG_RE.replace_all(html, " ");
    let decoded = decode_html_entities(&stripped);
    WS_RE.replace_all(decoded.trim(), " ").into_owned()
}

/// All `<a href>` links on a page, resolved against `base_url`.
///
/// Fragment, `javascript:` and `mailto:` links are dropped.
pub fn extract_anchors(html: &str, base_url: &str) -> Vec<Anchor> {
    ANCHOR_RE
        .captures_iter(html)
        .filter_map(|cap| {
            let attrs = cap.get(1)?.as_str();
            let href = resolve_href(base_url, &attr(attrs, "href")?)?;
            let mut text = inner_text(cap.get(2).map_or("", |m| m.as_str()));
            if text.is_empty() {
                text = attr(attrs, "title").unwrap_or_default().trim().to_string();
            }
            Some(Anchor { href, text })
        })
        .collect()
}

/// `src` of every `<iframe>`, resolved against `base_url`. Embedded players
/// show up here rather than as anchors.
pub fn extract_embeds(html: &str, base_url: &str) -> Vec<String> {
    IFRAME_RE
        .captures_iter(html)
        .filter_map(|cap| {
            let src = attr(cap.get(1)?.as_str(), "src")?;
            resolve_href(base_url, &src)
        })
        .collect()
}

/// `content` of the first `<meta>` whose `property` or `name` is `key`.
pub fn meta_content(html: &str, key: &str) -> Option<String> {
    META_RE.captures_iter(html).find_map(|cap| {
        let attrs = cap.get(1)?.as_str();
        let name = attr(attrs, "property").or_else(|| attr(attrs, "name"))?;
        if !name.eq_ignore_ascii_case(key) {
            return None;
        }
        let content = attr(attrs, "content")?;
        let content = content.trim();
        (!content.is_empty()).then(|| content.to_string())
    })
}

/// The page's share image (`og:image`, then `twitter:image`), absolute.
pub fn og_image(html: &str, base_url: &str) -> Option<String> {
    ["og:image:secure_url", "og:image", "twitter:image"]
        .iter()
        .find_map(|key| meta_content(html, key))
        .and_then(|src| resolve_href(base_url, &src))
}

/// `og:title`, falling back to `<title>`.
pub fn page_title(html: &str) -> Option<String> {
    meta_content(html, "og:title")
        .or_else(|| {
            TITLE_RE
                .captures(html)
                .map(|cap| inner_text(cap.get(1).map_or("", |m| m.as_str())))
        })
        .filter(|t| !t.is_empty())
}

/// Decode the body of a JSON string literal (without its quotes).
pub fn unescape_json_string(raw: &str) -> Option<String> {
    serde_json::from_str::<String>(&format!("\"{}\"", raw)).ok()
}

#[cfg(test)]
#[path = "tests/html_tests.rs"]
mod tests;
