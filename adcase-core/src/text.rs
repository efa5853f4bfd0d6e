//! Text normalization and tokenization for relevance scoring.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Tokens shorter than this are dropped.
pub const MIN_TOKEN_LEN: usize = 3;

/// Words that carry no identity: articles, connectives, and generic
/// ad-industry vocabulary that shows up in nearly every candidate title.
pub const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "into", "that", "this", "are", "was", "you", "your",
    "our", "its", "not", "but", "all", "new", "via", "les", "des", "der", "die", "das", "und",
    "commercial", "commercials", "official", "campaign", "campaigns", "advert", "advertisement",
    "advertising", "spot", "video", "videos", "film", "case", "study", "casestudy", "agency",
    "brand", "tvc", "full", "version", "ads",
];

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").expect("static pattern")
});

/// Decode the HTML entities that show up in scraped attributes and titles.
///
/// Handles decimal and hex numeric references plus the common named ones.
/// Unknown names are left untouched.
pub fn decode_html_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    ENTITY
        .replace_all(s, |caps: &Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body
                .strip_prefix("#x")
                .or_else(|| body.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match body {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    "ndash" => Some('\u{2013}'),
                    "mdash" => Some('\u{2014}'),
                    "rsquo" | "lsquo" => Some('\''),
                    "rdquo" | "ldquo" => Some('"'),
                    "hellip" => Some('\u{2026}'),
                    _ => None,
                }
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Lowercase, strip diacritics, replace punctuation with spaces and
/// collapse whitespace.
///
/// `"Café  Noir: L'Été!"` becomes `"cafe noir l ete"`.
pub fn normalize_text(s: &str) -> String {
    let ascii = deunicode::deunicode(s).to_lowercase();
    let replaced: String = ascii
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a normalized token survives filtering.
pub fn is_content_token(token: &str) -> bool {
    token.len() >= MIN_TOKEN_LEN && !STOPWORDS.contains(&token)
}

/// Split text into its set of content tokens.
pub fn tokenize(s: &str) -> BTreeSet<String> {
    normalize_text(s)
        .split(' ')
        .filter(|t| is_content_token(t))
        .map(str::to_string)
        .collect()
}

/// Whether `needle` (already normalized) occurs in `haystack` (already
/// normalized) on word boundaries.
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let padded_hay = format!(" {} ", haystack);
    let padded_needle = format!(" {} ", needle);
    padded_hay.contains(&padded_needle)
}

#[cfg(test)]
#[path = "tests/text_tests.rs"]
mod tests;
