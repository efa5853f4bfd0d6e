use serde::{Deserialize, Serialize};

use crate::platform::VideoRef;
use crate::url::{extract_host, extract_video, normalize_url};

/// Which gatherer produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    /// Derived from a video ID already present in the record's links.
    Direct,
    /// Video platform search results.
    Video,
    /// Generic web search results.
    Web,
    /// Outbound links on the record's source page.
    SourcePage,
}

impl CandidateSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Video => "video",
            Self::Web => "web",
            Self::SourcePage => "sourcepage",
        }
    }
}

impl std::fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A proposed replacement link and/or thumbnail for one record.
///
/// Ephemeral: produced by a gatherer, ranked by the scorer, checked by the
/// validator, never persisted as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Normalized absolute URL.
    pub url: String,
    /// Title, snippet, or anchor text the candidate was found with.
    pub title: String,
    pub source: CandidateSource,
    /// Relevance assigned by the scorer; re-ranking passes may adjust it.
    pub score: f64,
    /// Host of `url`, lowercased, `www.` stripped.
    pub host: String,
    /// Set when `url` points at a recognized video.
    pub video: Option<VideoRef>,
    /// Preview image: the platform thumbnail for videos, or a page's
    /// `og:image` when the gatherer found one.
    pub thumbnail_url: Option<String>,
}

impl Candidate {
    /// Build a candidate from a raw URL. Returns `None` if the URL doesn't
    /// normalize.
    pub fn new(url: &str, title: impl Into<String>, source: CandidateSource) -> Option<Self> {
        let url = normalize_url(url)?;
        let host = extract_host(&url).unwrap_or_default();
        let video = extract_video(&url);
        let thumbnail_url = video.as_ref().map(VideoRef::thumbnail_url);
        Some(Self {
            url,
            title: title.into(),
            source,
            score: 0.0,
            host,
            video,
            thumbnail_url,
        })
    }

    /// Build a candidate for a known video, using its canonical watch URL.
    pub fn from_video(video: VideoRef, title: impl Into<String>, source: CandidateSource) -> Self {
        let url = video.watch_url();
        let host = extract_host(&url).unwrap_or_default();
        Self {
            thumbnail_url: Some(video.thumbnail_url()),
            url,
            title: title.into(),
            source,
            score: 0.0,
            host,
            video: Some(video),
        }
    }

    /// Attach a preview image (ignored if it doesn't normalize).
    pub fn with_thumbnail(mut self, thumbnail: &str) -> Self {
        if let Some(t) = normalize_url(thumbnail) {
            self.thumbnail_url = Some(t);
        }
        self
    }

    pub fn is_video(&self) -> bool {
        self.video.is_some()
    }
}
