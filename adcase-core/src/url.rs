//! URL and identity helpers.
//!
//! Every function here is total: any string input yields a value (or `None`),
//! never a panic. Nothing else in the workspace formats a platform URL by
//! hand; watch links, thumbnails, oEmbed endpoints and search pages all come
//! from the builders at the bottom of this module so IDs can't drift apart.

use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use url::Url;
use url::form_urlencoded::byte_serialize;

use crate::platform::{VideoPlatform, VideoRef};
use crate::text::decode_html_entities;

/// Substrings that mark a thumbnail as a stock placeholder rather than a
/// real preview image.
pub const PLACEHOLDER_PATTERNS: &[&str] = &[
    "placeholder",
    "no-image",
    "noimage",
    "no_image",
    "default-thumb",
    "default_thumb",
    "missing-image",
    "blank.gif",
    "spacer.gif",
    "pixel.gif",
    "/1x1.",
    "image-not-found",
    "coming-soon",
];

/// Hosts that only ever serve search results or redirect wrappers.
const SEARCH_ENGINE_HOSTS: &[&str] = &[
    "duckduckgo.com",
    "html.duckduckgo.com",
    "lite.duckduckgo.com",
    "bing.com",
    "google.com",
    "search.yahoo.com",
    "yandex.com",
    "yandex.ru",
    "baidu.com",
    "startpage.com",
];

/// Trim, decode HTML entities and validate an absolute `http(s)` URL.
///
/// Protocol-relative input (`//host/path`) is treated as `https`. Returns
/// `None` for anything that doesn't parse or has no host. Idempotent:
/// `normalize_url(n) == Some(n)` for every `n` this returns.
pub fn normalize_url(raw: &str) -> Option<String> {
    let mut s = raw.trim().to_string();
    // The URL parser drops these silently; do it first so decoding sees the
    // same text the parser will.
    s.retain(|c| !matches!(c, '\t' | '\n' | '\r'));
    // Entities can be double-encoded (`&amp;amp;`); decode to a fixpoint so
    // a second pass never finds anything left to do.
    loop {
        let decoded = decode_html_entities(&s);
        if decoded == s {
            break;
        }
        s = decoded;
    }
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let owned;
    let candidate = if s.starts_with("//") {
        owned = format!("https:{}", s);
        owned.as_str()
    } else {
        s
    };

    let url = Url::parse(candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    match url.host_str() {
        Some(h) if !h.is_empty() => {}
        _ => return None,
    }
    Some(url.to_string())
}

/// Lowercase hostname with a leading `www.` removed.
pub fn extract_host(url: &str) -> Option<String> {
    let normalized = normalize_url(url)?;
    let parsed = Url::parse(&normalized).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Extract a video ID for one specific platform.
///
/// YouTube: `watch?v=`, `youtu.be/<id>`, `/embed/`, `/shorts/`, `/live/`, `/v/`.
/// Vimeo: `vimeo.com/<id>`, `vimeo.com/<anything>/<id>`, `player.vimeo.com/video/<id>`.
/// Never guesses: an ID of the wrong shape yields `None`.
pub fn extract_video_id(url: &str, platform: VideoPlatform) -> Option<String> {
    let normalized = normalize_url(url)?;
    let parsed = Url::parse(&normalized).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if !platform.owns_host(host) {
        return None;
    }

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let id = match platform {
        VideoPlatform::YouTube => {
            if host == "youtu.be" {
                segments.first().map(|s| s.to_string())
            } else if segments.first() == Some(&"watch") {
                parsed
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.trim().to_string())
            } else {
                match segments.as_slice() {
                    [kind, id, ..] if matches!(*kind, "embed" | "shorts" | "live" | "v") => {
                        Some(id.to_string())
                    }
                    _ => None,
                }
            }
        }
        VideoPlatform::Vimeo => {
            if host == "player.vimeo.com" {
                match segments.as_slice() {
                    ["video", id, ..] => Some(id.to_string()),
                    _ => None,
                }
            } else {
                segments
                    .iter()
                    .rev()
                    .find(|seg| seg.bytes().all(|b| b.is_ascii_digit()))
                    .map(|s| s.to_string())
            }
        }
    }?;

    platform.is_valid_id(&id).then_some(id)
}

/// Extract a video reference on any known platform.
pub fn extract_video(url: &str) -> Option<VideoRef> {
    VideoPlatform::all().iter().find_map(|&platform| {
        extract_video_id(url, platform).and_then(|id| VideoRef::new(platform, id))
    })
}

/// Decode the target of a known search-engine redirect wrapper.
///
/// Recognized: DuckDuckGo `/l/?uddg=<percent-encoded>`, Bing
/// `/ck/a?...&u=a1<base64url>`, Google `/url?q=<target>`. Returns `None` when
/// the input isn't one of these or the embedded target doesn't normalize.
pub fn decode_redirect_wrapper(url: &str) -> Option<String> {
    let normalized = normalize_url(url)?;
    let parsed = Url::parse(&normalized).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let path = parsed.path();
    let param = |name: &str| {
        parsed
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };

    let target = if host.ends_with("duckduckgo.com") && path.starts_with("/l/") {
        param("uddg")?
    } else if host == "bing.com" && path.starts_with("/ck/a") {
        let encoded = param("u")?;
        let payload = encoded.strip_prefix("a1")?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .or_else(|_| URL_SAFE.decode(payload))
            .ok()?;
        String::from_utf8(bytes).ok()?
    } else if host == "google.com" && path == "/url" {
        param("q").or_else(|| param("url"))?
    } else {
        return None;
    };

    normalize_url(&target)
}

/// Resolve an anchor `href` against the page it was found on.
///
/// Skips fragments, `javascript:`, `mailto:` and `tel:` links.
pub fn resolve_href(base: &str, href: &str) -> Option<String> {
    let href = decode_html_entities(href.trim());
    let lower = href.to_ascii_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }
    let base = Url::parse(&normalize_url(base)?).ok()?;
    let joined = base.join(&href).ok()?;
    normalize_url(joined.as_str())
}

/// Whether the URL looks like a stock placeholder image.
pub fn is_placeholder_image(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    PLACEHOLDER_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Whether the host (already lowercased, `www.` stripped) is a search engine.
pub fn is_search_engine_host(host: &str) -> bool {
    SEARCH_ENGINE_HOSTS
        .iter()
        .any(|h| host == *h || host.ends_with(&format!(".{}", h)))
}

// -- Builders (the only place platform URLs are formatted) --

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// Canonical watch page for a video.
pub fn watch_url(video: &VideoRef) -> String {
    match video.platform {
        VideoPlatform::YouTube => format!("https://www.youtube.com/watch?v={}", video.id),
        VideoPlatform::Vimeo => format!("https://vimeo.com/{}", video.id),
    }
}

/// Canonical preview image for a video.
pub fn thumbnail_url(video: &VideoRef) -> String {
    match video.platform {
        VideoPlatform::YouTube => format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video.id),
        VideoPlatform::Vimeo => format!("https://vumbnail.com/{}.jpg", video.id),
    }
}

/// Public oEmbed endpoint for a video. Succeeds only for public, embeddable
/// videos, which is what the availability check relies on.
pub fn oembed_url(video: &VideoRef) -> String {
    let target = encode(&watch_url(video));
    match video.platform {
        VideoPlatform::YouTube => {
            format!("https://www.youtube.com/oembed?format=json&url={}", target)
        }
        VideoPlatform::Vimeo => format!("https://vimeo.com/api/oembed.json?url={}", target),
    }
}

/// YouTube search results page for a free-text query.
pub fn video_search_url(query: &str) -> String {
    format!(
        "https://www.youtube.com/results?search_query={}",
        encode(query)
    )
}

/// HTML search engines with a scrapeable results page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEngine {
    DuckDuckGo,
    Bing,
}

const ALL_ENGINES: &[SearchEngine] = &[SearchEngine::DuckDuckGo, SearchEngine::Bing];

impl SearchEngine {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::DuckDuckGo => "duckduckgo",
            Self::Bing => "bing",
        }
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::DuckDuckGo => &["duckduckgo", "ddg"],
            Self::Bing => &["bing"],
        }
    }

    pub fn all() -> &'static [SearchEngine] {
        ALL_ENGINES
    }
}

impl std::fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl std::str::FromStr for SearchEngine {
    type Err = crate::platform::PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ALL_ENGINES
            .iter()
            .copied()
            .find(|e| e.aliases().contains(&lower.as_str()))
            .ok_or_else(|| crate::platform::PlatformParseError(s.to_string()))
    }
}

/// HTML results page for a query on the given engine.
pub fn web_search_url(engine: SearchEngine, query: &str) -> String {
    match engine {
        SearchEngine::DuckDuckGo => {
            format!("https://html.duckduckgo.com/html/?q={}", encode(query))
        }
        SearchEngine::Bing => {
            format!("https://www.bing.com/search?q={}&setlang=en", encode(query))
        }
    }
}

#[cfg(test)]
#[path = "tests/url_tests.rs"]
mod tests;
