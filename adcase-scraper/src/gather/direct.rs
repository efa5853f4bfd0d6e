use adcase_core::url::extract_video;
use adcase_core::{CampaignRecord, Candidate, CandidateSource, GathererKind};
use async_trait::async_trait;

use super::Gatherer;

/// Video IDs already present in the record's own links. No network.
pub struct DirectGatherer;

#[async_trait]
impl Gatherer for DirectGatherer {
    fn kind(&self) -> GathererKind {
        GathererKind::Direct
    }

    async fn gather(&self, record: &CampaignRecord) -> Vec<Candidate> {
        let mut out: Vec<Candidate> = Vec::new();
        for url in [&record.outbound_url, &record.source_url] {
            let Some(video) = extract_video(url) else {
                continue;
            };
            let candidate = Candidate::from_video(video, record.title.clone(), CandidateSource::Direct);
            if !out.iter().any(|c| c.url == candidate.url) {
                out.push(candidate);
            }
        }
        out
    }
}
