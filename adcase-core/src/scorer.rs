//! Relevance scoring between a record's identity and a candidate's text.
//!
//! Deterministic and pure: the same `(record, text, url)` always yields the
//! same breakdown.

use serde::Serialize;

use crate::candidate::{Candidate, CandidateSource};
use crate::platform::VideoPlatform;
use crate::record::CampaignRecord;
use crate::text::{contains_phrase, normalize_text, tokenize};
use crate::url::extract_host;

/// Bonus for a candidate on a video platform.
pub const VIDEO_HOST_BONUS: f64 = 0.08;
/// Bonus for a candidate on a known case-study host.
pub const CASE_STUDY_HOST_BONUS: f64 = 0.05;
/// Bonus when the record's year appears in the candidate text.
pub const YEAR_BONUS: f64 = 0.06;
/// Bonus when the full brand name appears in the candidate text.
pub const BRAND_BONUS: f64 = 0.2;
/// Bonus when the title contains the candidate text or vice versa.
pub const TITLE_BONUS: f64 = 0.15;

/// Score given to direct-ID candidates regardless of their text.
pub const DIRECT_SCORE_FLOOR: f64 = 1.2;

pub const MIN_TOTAL: f64 = -1.0;
pub const MAX_TOTAL: f64 = 2.0;

/// Case-study and awards sites that host the original campaign pages, in
/// preference order after the video platforms.
pub const CASE_STUDY_HOSTS: &[&str] = &[
    "adsoftheworld.com",
    "lbbonline.com",
    "campaignlive.co.uk",
    "campaignlive.com",
    "adage.com",
    "adweek.com",
    "thedrum.com",
    "shots.net",
    "dandad.org",
    "canneslions.com",
    "oneclub.org",
    "clios.com",
    "adforum.com",
    "creativereview.co.uk",
    "behance.net",
];

/// Keyword phrases that mark a candidate as commentary or aggregation
/// rather than the campaign itself, with their penalty.
pub const GARBAGE_KEYWORDS: &[(&str, f64)] = &[
    ("reaction", 0.3),
    ("reacts", 0.3),
    ("compilation", 0.3),
    ("top 5", 0.25),
    ("top 10", 0.25),
    ("top 20", 0.25),
    ("top 50", 0.25),
    ("ranking", 0.2),
    ("ranked", 0.2),
    ("explained", 0.15),
    ("live stream", 0.2),
    ("livestream", 0.2),
    ("parody", 0.2),
    ("review", 0.15),
];

/// Per-component view of a score, kept for logging and the `score` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub overlap: f64,
    pub host_bonus: f64,
    pub year_bonus: f64,
    pub brand_bonus: f64,
    pub title_bonus: f64,
    /// Sum of garbage-keyword penalties, as a non-negative number.
    pub penalty: f64,
    pub total: f64,
}

impl std::fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.3} (overlap {:.3}, host +{:.2}, year +{:.2}, brand +{:.2}, title +{:.2}, penalty -{:.2})",
            self.total,
            self.overlap,
            self.host_bonus,
            self.year_bonus,
            self.brand_bonus,
            self.title_bonus,
            self.penalty
        )
    }
}

/// Preference rank of a host (lower is better): video platforms first, then
/// case-study hosts, then everything else.
pub fn host_rank(host: &str) -> usize {
    if let Some(platform) = VideoPlatform::for_host(host) {
        return platform.preference_rank();
    }
    let offset = VideoPlatform::all().len();
    match CASE_STUDY_HOSTS.iter().position(|h| *h == host) {
        Some(pos) => offset + pos,
        None => offset + CASE_STUDY_HOSTS.len(),
    }
}

/// Whether a host is on the case-study list or a video platform.
pub fn is_preferred_host(host: &str) -> bool {
    VideoPlatform::for_host(host).is_some() || CASE_STUDY_HOSTS.contains(&host)
}

fn host_bonus(url: &str) -> f64 {
    let Some(host) = extract_host(url) else {
        return 0.0;
    };
    if VideoPlatform::for_host(&host).is_some() {
        VIDEO_HOST_BONUS
    } else if CASE_STUDY_HOSTS.contains(&host.as_str()) {
        CASE_STUDY_HOST_BONUS
    } else {
        0.0
    }
}

/// Remove every whole-word occurrence of `phrase` from normalized text.
fn strip_phrase(text: &str, phrase: &str) -> String {
    if phrase.is_empty() {
        return text.to_string();
    }
    let padded = format!(" {} ", text);
    let needle = format!(" {} ", phrase);
    let mut out = padded;
    while out.contains(&needle) {
        out = out.replace(&needle, " ");
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn garbage_penalty(record: &CampaignRecord, candidate_norm: &str) -> f64 {
    let identity_words = normalize_text(&record.identity_text());
    let identity_words: Vec<&str> = identity_words.split(' ').collect();
    GARBAGE_KEYWORDS
        .iter()
        .filter(|(phrase, _)| {
            !phrase
                .split(' ')
                .any(|word| identity_words.contains(&word))
        })
        .filter(|(phrase, _)| contains_phrase(candidate_norm, phrase))
        .map(|(_, penalty)| penalty)
        .sum()
}

/// Score a candidate's text (and URL, for the host bonus) against a record.
///
/// Returns an all-zero breakdown when either side has no content tokens.
pub fn score(record: &CampaignRecord, candidate_text: &str, candidate_url: &str) -> ScoreBreakdown {
    let wanted = tokenize(&record.identity_text());
    let got = tokenize(candidate_text);
    if wanted.is_empty() || got.is_empty() {
        return ScoreBreakdown::default();
    }

    let shared = wanted.intersection(&got).count();
    let denom = wanted.len().clamp(4, 16);
    let overlap = (shared as f64 / denom as f64).min(1.0);

    let candidate_norm = normalize_text(candidate_text);
    let title_norm = normalize_text(&record.title);
    let brand_norm = normalize_text(&record.brand);

    let year_bonus = match record.year {
        Some(year) if contains_phrase(&candidate_norm, &year.to_string()) => YEAR_BONUS,
        _ => 0.0,
    };

    let brand_bonus = if contains_phrase(&candidate_norm, &brand_norm) {
        BRAND_BONUS
    } else {
        0.0
    };

    // Reverse containment ignores the brand on both sides, so repeating the
    // brand in a short candidate can't toggle the bonus off.
    let title_in_candidate = contains_phrase(&candidate_norm, &title_norm);
    let candidate_in_title = {
        let cand = strip_phrase(&candidate_norm, &brand_norm);
        let title = strip_phrase(&title_norm, &brand_norm);
        !tokenize(&cand).is_empty() && contains_phrase(&title, &cand)
    };
    let title_bonus = if title_in_candidate || candidate_in_title {
        TITLE_BONUS
    } else {
        0.0
    };

    let host_bonus = host_bonus(candidate_url);
    let penalty = garbage_penalty(record, &candidate_norm);

    let raw = overlap + host_bonus + year_bonus + brand_bonus + title_bonus - penalty;
    let total = if raw.is_finite() {
        raw.clamp(MIN_TOTAL, MAX_TOTAL)
    } else {
        0.0
    };

    ScoreBreakdown {
        overlap,
        host_bonus,
        year_bonus,
        brand_bonus,
        title_bonus,
        penalty,
        total,
    }
}

/// Score every candidate and sort best-first.
///
/// Direct-ID candidates never score below [`DIRECT_SCORE_FLOOR`]. Ties go to
/// the better-ranked host, then to the candidate seen first.
pub fn rank_candidates(record: &CampaignRecord, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    for candidate in &mut candidates {
        let total = score(record, &candidate.title, &candidate.url).total;
        candidate.score = match candidate.source {
            CandidateSource::Direct => total.max(DIRECT_SCORE_FLOOR),
            _ => total,
        };
    }
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| host_rank(&a.host).cmp(&host_rank(&b.host)))
    });
    candidates
}

#[cfg(test)]
#[path = "tests/scorer_tests.rs"]
mod tests;
