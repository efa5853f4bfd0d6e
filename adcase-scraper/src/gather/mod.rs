//! Candidate gatherers, one adapter per source.
//!
//! A gatherer never fails: request errors, non-2xx responses and unparseable
//! pages all come back as an empty (or partial) candidate list, logged at
//! debug level.

mod direct;
mod source_page;
mod video_search;
mod web_search;

use std::sync::Arc;

use adcase_core::{CampaignRecord, Candidate, GathererKind, RepairMode};
use adcase_lib::PipelineSettings;
use async_trait::async_trait;

pub use direct::DirectGatherer;
pub use source_page::SourcePageGatherer;
pub use video_search::VideoSearchGatherer;
pub use web_search::WebSearchGatherer;

use crate::http::{FetchRequest, HttpClient, Throttle};

#[async_trait]
pub trait Gatherer: Send + Sync {
    fn kind(&self) -> GathererKind;

    async fn gather(&self, record: &CampaignRecord) -> Vec<Candidate>;
}

/// Instantiate the requested gatherers, in order.
///
/// Search gatherers share one [`Throttle`] so the configured interval holds
/// across every worker.
pub fn build_gatherers(
    kinds: &[GathererKind],
    http: Arc<dyn HttpClient>,
    settings: &PipelineSettings,
    mode: RepairMode,
) -> Vec<Box<dyn Gatherer>> {
    let throttle = Arc::new(Throttle::new(settings.search_interval()));
    kinds
        .iter()
        .map(|kind| -> Box<dyn Gatherer> {
            match kind {
                GathererKind::Direct => Box::new(DirectGatherer),
                GathererKind::VideoSearch => {
                    Box::new(VideoSearchGatherer::new(http.clone(), throttle.clone()))
                }
                GathererKind::WebSearch => {
                    Box::new(WebSearchGatherer::new(http.clone(), throttle.clone()))
                }
                GathererKind::SourcePage => {
                    Box::new(SourcePageGatherer::new(http.clone(), mode))
                }
            }
        })
        .collect()
}

/// GET a page body, or `None` on any failure.
pub(crate) async fn fetch_page(http: &dyn HttpClient, url: &str) -> Option<String> {
    match http.fetch(FetchRequest::get(url)).await {
        Ok(resp) if resp.is_success() => Some(resp.body),
        Ok(resp) => {
            log::debug!("GET {} returned {}", url, resp.status);
            None
        }
        Err(e) => {
            log::debug!("GET {} failed: {}", url, e);
            None
        }
    }
}

#[cfg(test)]
#[path = "../tests/gather_tests.rs"]
mod tests;
