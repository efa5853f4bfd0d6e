use std::sync::{Arc, LazyLock};

use adcase_core::url::video_search_url;
use adcase_core::{
    CampaignRecord, Candidate, CandidateSource, GathererKind, VideoPlatform, VideoRef,
};
use async_trait::async_trait;
use regex::Regex;

use super::{Gatherer, fetch_page};
use crate::html::unescape_json_string;
use crate::http::{HttpClient, Throttle};

/// Cap on results taken from one search page.
pub const MAX_RESULTS: usize = 30;

static RENDERER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""videoRenderer"\s*:\s*\{\s*"videoId"\s*:\s*"([A-Za-z0-9_-]{11})""#)
        .expect("static pattern")
});

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#""title"\s*:\s*\{\s*(?:"runs"\s*:\s*\[\s*\{\s*"text"|"simpleText")\s*:\s*"((?:[^"\\]|\\.)*)""#,
    )
    .expect("static pattern")
});

/// YouTube search results, read from the JSON embedded in the results page.
pub struct VideoSearchGatherer {
    http: Arc<dyn HttpClient>,
    throttle: Arc<Throttle>,
}

impl VideoSearchGatherer {
    pub fn new(http: Arc<dyn HttpClient>, throttle: Arc<Throttle>) -> Self {
        Self { http, throttle }
    }
}

#[async_trait]
impl Gatherer for VideoSearchGatherer {
    fn kind(&self) -> GathererKind {
        GathererKind::VideoSearch
    }

    async fn gather(&self, record: &CampaignRecord) -> Vec<Candidate> {
        let query = record.search_query();
        if query.is_empty() {
            return Vec::new();
        }
        self.throttle.wait().await;
        let Some(body) = fetch_page(self.http.as_ref(), &video_search_url(&query)).await else {
            return Vec::new();
        };
        let results = parse_results(&body);
        log::debug!("Video search for '{}': {} results", query, results.len());
        results
    }
}

/// Pull `{videoId, title}` pairs out of a results page, deduplicated by ID.
pub(crate) fn parse_results(body: &str) -> Vec<Candidate> {
    let starts: Vec<_> = RENDERER_RE.captures_iter(body).collect();
    let mut out: Vec<Candidate> = Vec::new();

    for (i, cap) in starts.iter().enumerate() {
        let (Some(whole), Some(id)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let window_end = starts
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(body.len(), |m| m.start());
        let window = &body[whole.end()..window_end];

        let Some(title) = TITLE_RE
            .captures(window)
            .and_then(|t| t.get(1))
            .and_then(|t| unescape_json_string(t.as_str()))
        else {
            continue;
        };
        let Some(video) = VideoRef::new(VideoPlatform::YouTube, id.as_str()) else {
            continue;
        };
        if out.iter().any(|c| c.video.as_ref() == Some(&video)) {
            continue;
        }
        out.push(Candidate::from_video(video, title, CandidateSource::Video));
        if out.len() >= MAX_RESULTS {
            break;
        }
    }
    out
}
