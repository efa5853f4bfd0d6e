//! Candidate validation: host policy, liveness, media availability.
//!
//! Checks run cheapest first. Host and pattern screening needs no network,
//! so a candidate rejected there never costs a request.

use std::sync::Arc;

use adcase_core::scorer::is_preferred_host;
use adcase_core::url::{extract_host, is_placeholder_image, is_search_engine_host, normalize_url};
use adcase_core::{Candidate, Outcome, RepairMode, VideoRef};

use crate::error::FetchError;
use crate::http::{FetchRequest, FetchResponse, HttpClient};

/// Hosts never accepted: listing aggregators, social walls, placeholder
/// image services.
pub const BLOCKED_HOSTS: &[&str] = &[
    "pinterest.com",
    "pinterest.co.uk",
    "scribd.com",
    "slideshare.net",
    "issuu.com",
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "linkedin.com",
    "reddit.com",
    "placehold.it",
    "placehold.co",
    "placeholder.com",
    "dummyimage.com",
    "placekitten.com",
    "picsum.photos",
];

/// Path or query fragments that mark a listing, search, login or share page
/// rather than a single piece of work.
pub const BAD_PATTERNS: &[&str] = &[
    "/search?",
    "/search/",
    "/results?",
    "/tag/",
    "/tags/",
    "/category/",
    "/categories/",
    "/hashtag/",
    "/login",
    "/log_in",
    "/signin",
    "/signup",
    "/sharer",
    "/share?",
    "/intent/",
    "/playlist?",
    "/channel/",
    "/feed/",
    "/page/",
];

/// HEAD statuses that are often wrong about the GET.
const RETRY_WITH_GET: &[u16] = &[0, 403, 404, 405];

/// Why a URL was refused without a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Malformed,
    SearchEngine(String),
    BlockedHost(String),
    BadPattern(&'static str),
    NotAllowed(String),
    Placeholder,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed URL"),
            Self::SearchEngine(host) => write!(f, "search engine host {}", host),
            Self::BlockedHost(host) => write!(f, "blocked host {}", host),
            Self::BadPattern(p) => write!(f, "listing/search page ({})", p),
            Self::NotAllowed(host) => write!(f, "host {} not on allow-list", host),
            Self::Placeholder => write!(f, "placeholder image"),
        }
    }
}

fn host_matches(host: &str, list: &[&str]) -> bool {
    list.iter()
        .any(|h| host == *h || host.ends_with(&format!(".{}", h)))
}

/// Which hosts and URL shapes are acceptable.
#[derive(Debug, Clone)]
pub struct HostPolicy {
    blocked_hosts: Vec<&'static str>,
    bad_patterns: Vec<&'static str>,
    /// Only video platforms and case-study hosts are accepted.
    restrictive: bool,
}

impl Default for HostPolicy {
    fn default() -> Self {
        Self::new(false)
    }
}

impl HostPolicy {
    pub fn new(restrictive: bool) -> Self {
        Self {
            blocked_hosts: BLOCKED_HOSTS.to_vec(),
            bad_patterns: BAD_PATTERNS.to_vec(),
            restrictive,
        }
    }

    pub fn is_restrictive(&self) -> bool {
        self.restrictive
    }

    /// Blocklist and pattern screening, ignoring the allow-list.
    pub fn screen(&self, url: &str) -> Result<(), Rejection> {
        let url = normalize_url(url).ok_or(Rejection::Malformed)?;
        let host = extract_host(&url).ok_or(Rejection::Malformed)?;
        if is_search_engine_host(&host) {
            return Err(Rejection::SearchEngine(host));
        }
        if host_matches(&host, &self.blocked_hosts) {
            return Err(Rejection::BlockedHost(host));
        }
        let lower = url.to_ascii_lowercase();
        let rest = lower
            .split_once("://")
            .and_then(|(_, r)| r.find('/').map(|i| &r[i..]))
            .unwrap_or("");
        if let Some(p) = self.bad_patterns.iter().find(|p| rest.contains(*p)) {
            return Err(Rejection::BadPattern(*p));
        }
        if is_placeholder_image(&url) {
            return Err(Rejection::Placeholder);
        }
        Ok(())
    }

    /// Full link check: screening plus the allow-list in restrictive mode.
    pub fn check(&self, url: &str) -> Result<(), Rejection> {
        self.screen(url)?;
        if self.restrictive {
            let host = extract_host(url).unwrap_or_default();
            if !is_preferred_host(&host) {
                return Err(Rejection::NotAllowed(host));
            }
        }
        Ok(())
    }

    /// Image URLs: well-formed, not a placeholder, not a blocked host.
    /// Image CDNs are never on the allow-list, so it doesn't apply here.
    pub fn check_image(&self, url: &str) -> Result<(), Rejection> {
        let url = normalize_url(url).ok_or(Rejection::Malformed)?;
        let host = extract_host(&url).ok_or(Rejection::Malformed)?;
        if is_placeholder_image(&url) {
            return Err(Rejection::Placeholder);
        }
        if host_matches(&host, &self.blocked_hosts) {
            return Err(Rejection::BlockedHost(host));
        }
        Ok(())
    }
}

/// Result of a liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Liveness {
    pub ok: bool,
    /// Final status, 0 when no response arrived.
    pub status: u16,
    pub final_url: Option<String>,
    pub content_type: Option<String>,
    pub error: Option<FetchError>,
}

impl Liveness {
    fn from_result(url: &str, result: Result<FetchResponse, FetchError>) -> Self {
        match result {
            Ok(resp) => Self {
                ok: resp.is_live() && !is_soft_404(url, &resp.final_url),
                status: resp.status,
                final_url: Some(resp.final_url),
                content_type: resp.content_type,
                error: None,
            },
            Err(e) => Self {
                ok: false,
                status: 0,
                final_url: None,
                content_type: None,
                error: Some(e),
            },
        }
    }

    /// Short reason for a failed probe.
    pub fn reason(&self) -> String {
        if let Some(e) = &self.error {
            return e.to_string();
        }
        if self.ok {
            return "ok".to_string();
        }
        match &self.final_url {
            Some(final_url) if (200..400).contains(&self.status) => {
                format!("redirected to {}", final_url)
            }
            _ => format!("HTTP {}", self.status),
        }
    }
}

/// A deep link that redirects to the site root is a dead page wearing a
/// 200.
fn is_soft_404(requested: &str, final_url: &str) -> bool {
    let path_of = |u: &str| url::Url::parse(u).ok().map(|p| p.path().to_string());
    match (path_of(requested), path_of(final_url)) {
        (Some(before), Some(after)) => before != "/" && after == "/",
        _ => false,
    }
}

/// What happened to one candidate during selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
    Dead(String),
    /// The video exists as an ID but isn't publicly playable.
    Unavailable,
    NotImage(Option<String>),
    NoThumbnail,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected(r) => write!(f, "rejected: {}", r),
            Self::Dead(reason) => write!(f, "dead: {}", reason),
            Self::Unavailable => write!(f, "video unavailable"),
            Self::NotImage(Some(ct)) => write!(f, "not an image ({})", ct),
            Self::NotImage(None) => write!(f, "not an image"),
            Self::NoThumbnail => write!(f, "no thumbnail"),
        }
    }
}

/// Outcome of [`Validator::select`].
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub accepted: Option<Candidate>,
    /// Every candidate examined, in order, with its verdict.
    pub verdicts: Vec<(String, Verdict)>,
}

impl Selection {
    /// `Rejected` when every examined candidate failed host screening,
    /// `Unavailable` for any other failure.
    pub fn outcome(&self) -> Outcome {
        if self.accepted.is_some() {
            Outcome::Replaced
        } else if !self.verdicts.is_empty()
            && self
                .verdicts
                .iter()
                .all(|(_, v)| matches!(v, Verdict::Rejected(_)))
        {
            Outcome::Rejected
        } else {
            Outcome::Unavailable
        }
    }

    pub fn summary(&self) -> String {
        self.verdicts
            .iter()
            .map(|(url, verdict)| format!("{} ({})", url, verdict))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub struct Validator {
    http: Arc<dyn HttpClient>,
    policy: HostPolicy,
    lookahead: usize,
}

impl Validator {
    pub fn new(http: Arc<dyn HttpClient>, policy: HostPolicy, lookahead: usize) -> Self {
        Self {
            http,
            policy,
            lookahead: lookahead.max(1),
        }
    }

    pub fn policy(&self) -> &HostPolicy {
        &self.policy
    }

    pub fn is_allowed_host(&self, url: &str) -> bool {
        self.policy.check(url).is_ok()
    }

    /// HEAD, falling back to a body-less GET when the HEAD answer is one
    /// servers commonly get wrong.
    pub async fn is_live(&self, url: &str) -> Liveness {
        let head = self.http.fetch(FetchRequest::head(url)).await;
        let retry = match &head {
            Ok(resp) => RETRY_WITH_GET.contains(&resp.status),
            Err(e) => e.is_retryable(),
        };
        let result = if retry {
            log::trace!("HEAD {} inconclusive, retrying with GET", url);
            self.http.fetch(FetchRequest::probe(url)).await
        } else {
            head
        };
        Liveness::from_result(url, result)
    }

    /// Whether the platform's oEmbed endpoint knows the video. Deleted,
    /// private and non-embeddable videos all fail here.
    pub async fn is_available_media(&self, video: &VideoRef) -> bool {
        match self.http.fetch(FetchRequest::probe(video.oembed_url())).await {
            Ok(resp) => resp.is_success(),
            Err(e) => {
                log::debug!("oEmbed check for {} failed: {}", video, e);
                false
            }
        }
    }

    /// Live and served with an `image/*` content type.
    pub async fn is_image_content(&self, url: &str) -> bool {
        let live = self.is_live(url).await;
        live.ok
            && live
                .content_type
                .as_deref()
                .is_some_and(|ct| ct.trim_start().starts_with("image/"))
    }

    /// Check ranked candidates in order, up to the lookahead window, and
    /// stop at the first that passes.
    pub async fn select(&self, ranked: &[Candidate], mode: RepairMode) -> Selection {
        let mut selection = Selection::default();
        for candidate in ranked.iter().take(self.lookahead) {
            let verdict = match mode {
                RepairMode::Link => self.check_link(candidate).await,
                RepairMode::Thumbnail => self.check_thumbnail(candidate).await,
            };
            log::debug!("  {} -> {}", candidate.url, verdict);
            let accepted = verdict == Verdict::Accepted;
            selection.verdicts.push((candidate.url.clone(), verdict));
            if accepted {
                selection.accepted = Some(candidate.clone());
                break;
            }
        }
        selection
    }

    async fn check_link(&self, candidate: &Candidate) -> Verdict {
        if let Err(r) = self.policy.check(&candidate.url) {
            return Verdict::Rejected(r);
        }
        let live = self.is_live(&candidate.url).await;
        if !live.ok {
            return Verdict::Dead(live.reason());
        }
        if let Some(video) = &candidate.video {
            if !self.is_available_media(video).await {
                return Verdict::Unavailable;
            }
        }
        Verdict::Accepted
    }

    async fn check_thumbnail(&self, candidate: &Candidate) -> Verdict {
        let Some(thumbnail) = candidate.thumbnail_url.as_deref() else {
            return Verdict::NoThumbnail;
        };
        if let Err(r) = self.policy.check(&candidate.url) {
            return Verdict::Rejected(r);
        }
        if let Err(r) = self.policy.check_image(thumbnail) {
            return Verdict::Rejected(r);
        }
        let live = self.is_live(thumbnail).await;
        if !live.ok {
            return Verdict::Dead(live.reason());
        }
        let is_image = live
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.trim_start().starts_with("image/"));
        if !is_image {
            return Verdict::NotImage(live.content_type);
        }
        if let Some(video) = &candidate.video {
            if !self.is_available_media(video).await {
                return Verdict::Unavailable;
            }
        }
        Verdict::Accepted
    }
}

#[cfg(test)]
#[path = "tests/validate_tests.rs"]
mod tests;
