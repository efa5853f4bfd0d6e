use std::sync::Arc;

use adcase_core::scorer::is_preferred_host;
use adcase_core::url::{decode_redirect_wrapper, extract_host, extract_video, normalize_url};
use adcase_core::{CampaignRecord, Candidate, CandidateSource, GathererKind, RepairMode, score};
use async_trait::async_trait;

use super::{Gatherer, fetch_page};
use crate::html::{extract_anchors, extract_embeds, og_image, page_title};
use crate::http::HttpClient;

/// Links scoring below this against the record are ignored.
pub const MIN_LINK_RELEVANCE: f64 = 0.25;

/// Outbound links on the record's own source page.
///
/// The page is about the record, so each link is scored on the page title
/// plus its anchor text. Only links to video platforms and case-study hosts
/// are kept. In thumbnail mode the page's share image is offered too.
pub struct SourcePageGatherer {
    http: Arc<dyn HttpClient>,
    mode: RepairMode,
}

impl SourcePageGatherer {
    pub fn new(http: Arc<dyn HttpClient>, mode: RepairMode) -> Self {
        Self { http, mode }
    }
}

#[async_trait]
impl Gatherer for SourcePageGatherer {
    fn kind(&self) -> GathererKind {
        GathererKind::SourcePage
    }

    async fn gather(&self, record: &CampaignRecord) -> Vec<Candidate> {
        let Some(page_url) = normalize_url(&record.source_url) else {
            return Vec::new();
        };
        let Some(body) = fetch_page(self.http.as_ref(), &page_url).await else {
            return Vec::new();
        };
        let candidates = parse_page(record, &body, &page_url, self.mode);
        log::debug!("Source page {}: {} candidates", page_url, candidates.len());
        candidates
    }
}

pub(crate) fn parse_page(
    record: &CampaignRecord,
    body: &str,
    page_url: &str,
    mode: RepairMode,
) -> Vec<Candidate> {
    let page_host = extract_host(page_url).unwrap_or_default();
    let title = page_title(body).unwrap_or_else(|| record.title.clone());

    let links = extract_anchors(body, page_url)
        .into_iter()
        .map(|a| (a.href, a.text))
        .chain(extract_embeds(body, page_url).into_iter().map(|src| (src, String::new())));

    let mut out: Vec<Candidate> = Vec::new();
    for (href, text) in links {
        let target = decode_redirect_wrapper(&href).unwrap_or(href);
        let Some(host) = extract_host(&target) else {
            continue;
        };
        if host == page_host || !is_preferred_host(&host) {
            continue;
        }
        let text = format!("{} {}", title, text).trim().to_string();
        if score(record, &text, &target).total < MIN_LINK_RELEVANCE {
            continue;
        }
        let candidate = match extract_video(&target) {
            Some(video) => Some(Candidate::from_video(video, text, CandidateSource::SourcePage)),
            None => Candidate::new(&target, text, CandidateSource::SourcePage),
        };
        if let Some(candidate) = candidate {
            if !out.iter().any(|c| c.url == candidate.url) {
                out.push(candidate);
            }
        }
    }

    if mode == RepairMode::Thumbnail {
        if let Some(image) = og_image(body, page_url) {
            if let Some(candidate) = Candidate::new(page_url, title, CandidateSource::SourcePage) {
                out.push(candidate.with_thumbnail(&image));
            }
        }
    }
    out
}
