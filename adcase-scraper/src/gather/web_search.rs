use std::sync::Arc;

use adcase_core::url::{
    SearchEngine, decode_redirect_wrapper, extract_host, is_search_engine_host, web_search_url,
};
use adcase_core::{CampaignRecord, Candidate, CandidateSource, GathererKind};
use async_trait::async_trait;

use super::{Gatherer, fetch_page};
use crate::html::extract_anchors;
use crate::http::{HttpClient, Throttle};

/// Cap on results taken from one engine.
pub const MAX_RESULTS_PER_ENGINE: usize = 20;

/// Later engines are only queried while fewer than this many results are in.
pub const ENOUGH_RESULTS: usize = 8;

/// Generic web search over the engines' HTML result pages.
pub struct WebSearchGatherer {
    http: Arc<dyn HttpClient>,
    throttle: Arc<Throttle>,
    engines: Vec<SearchEngine>,
}

impl WebSearchGatherer {
    pub fn new(http: Arc<dyn HttpClient>, throttle: Arc<Throttle>) -> Self {
        Self {
            http,
            throttle,
            engines: SearchEngine::all().to_vec(),
        }
    }

    pub fn with_engines(mut self, engines: Vec<SearchEngine>) -> Self {
        self.engines = engines;
        self
    }
}

#[async_trait]
impl Gatherer for WebSearchGatherer {
    fn kind(&self) -> GathererKind {
        GathererKind::WebSearch
    }

    async fn gather(&self, record: &CampaignRecord) -> Vec<Candidate> {
        let query = record.search_query();
        if query.is_empty() {
            return Vec::new();
        }
        let mut out: Vec<Candidate> = Vec::new();
        for &engine in &self.engines {
            if out.len() >= ENOUGH_RESULTS {
                break;
            }
            self.throttle.wait().await;
            let page_url = web_search_url(engine, &query);
            let Some(body) = fetch_page(self.http.as_ref(), &page_url).await else {
                continue;
            };
            let found = parse_results(&body, &page_url);
            log::debug!("{} search for '{}': {} results", engine, query, found.len());
            for candidate in found {
                if !out.iter().any(|c| c.url == candidate.url) {
                    out.push(candidate);
                }
            }
        }
        out
    }
}

/// Result links on a search page: redirect wrappers decoded, links back to
/// search engines dropped.
pub(crate) fn parse_results(body: &str, page_url: &str) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = Vec::new();
    for anchor in extract_anchors(body, page_url) {
        if anchor.text.is_empty() {
            continue;
        }
        let target = decode_redirect_wrapper(&anchor.href).unwrap_or(anchor.href);
        let Some(host) = extract_host(&target) else {
            continue;
        };
        if is_search_engine_host(&host) {
            continue;
        }
        let Some(candidate) = Candidate::new(&target, anchor.text, CandidateSource::Web) else {
            continue;
        };
        if out.iter().any(|c| c.url == candidate.url) {
            continue;
        }
        out.push(candidate);
        if out.len() >= MAX_RESULTS_PER_ENGINE {
            break;
        }
    }
    out
}
