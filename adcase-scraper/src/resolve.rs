//! Per-record repair: decide whether the record needs work, then gather,
//! rank, threshold and validate candidates, and apply the winner.

use std::sync::Arc;

use adcase_core::url::{extract_video, is_placeholder_image, normalize_url};
use adcase_core::{CampaignRecord, Candidate, Outcome, RepairMode, rank_candidates};
use adcase_lib::{ChangeEntry, PipelineSettings};

use crate::gather::{Gatherer, build_gatherers};
use crate::http::HttpClient;
use crate::validate::{HostPolicy, Validator};

/// What happened to one record.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The record, modified only when `outcome` is `Replaced`.
    pub record: CampaignRecord,
    pub outcome: Outcome,
    pub change: Option<ChangeEntry>,
    pub detail: String,
}

impl Resolution {
    fn unchanged(record: CampaignRecord, outcome: Outcome, detail: impl Into<String>) -> Self {
        Self {
            record,
            outcome,
            change: None,
            detail: detail.into(),
        }
    }

    /// The record hit an unexpected failure (e.g. its time budget) and is
    /// left as it was.
    pub fn errored(record: CampaignRecord, detail: impl Into<String>) -> Self {
        Self::unchanged(record, Outcome::Errored, detail)
    }
}

/// Whether a record needs repair in the current mode.
enum Target {
    Repair(String),
    Healthy(String),
}

pub struct Resolver {
    mode: RepairMode,
    gatherers: Vec<Box<dyn Gatherer>>,
    validator: Validator,
    settings: PipelineSettings,
}

impl Resolver {
    pub fn new(
        mode: RepairMode,
        gatherers: Vec<Box<dyn Gatherer>>,
        validator: Validator,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            mode,
            gatherers,
            validator,
            settings,
        }
    }

    /// The standard wiring: configured gatherers, default host policy.
    pub fn from_settings(
        mode: RepairMode,
        http: Arc<dyn HttpClient>,
        settings: &PipelineSettings,
    ) -> Self {
        let kinds = settings.gatherers_for(mode);
        let gatherers = build_gatherers(&kinds, http.clone(), settings, mode);
        let validator = Validator::new(
            http,
            HostPolicy::new(settings.restrict_hosts),
            settings.lookahead,
        );
        Self::new(mode, gatherers, validator, settings.clone())
    }

    pub fn mode(&self) -> RepairMode {
        self.mode
    }

    pub async fn resolve(&self, mut record: CampaignRecord) -> Resolution {
        if !self.settings.year_in_range(record.year) {
            return Resolution::unchanged(record, Outcome::Skipped, "outside year range");
        }

        let reason = match self.target(&record).await {
            Target::Healthy(why) => return Resolution::unchanged(record, Outcome::Skipped, why),
            Target::Repair(why) => why,
        };
        log::debug!("{}: needs repair ({})", record.id, reason);

        let candidates = self.gather(&record).await;
        if candidates.is_empty() {
            return Resolution::unchanged(record, Outcome::NoCandidates, reason);
        }

        let ranked = rank_candidates(&record, candidates);
        let Some(best) = ranked.first().cloned() else {
            return Resolution::unchanged(record, Outcome::NoCandidates, reason);
        };
        let eligible: Vec<Candidate> = ranked
            .into_iter()
            .filter(|c| c.score >= self.settings.threshold_for(c.source))
            .collect();
        if eligible.is_empty() {
            let detail = format!(
                "best {:.2} < {:.2} ({}: {})",
                best.score,
                self.settings.threshold_for(best.source),
                best.source,
                best.url
            );
            return Resolution::unchanged(record, Outcome::LowScore, detail);
        }

        let selection = self.validator.select(&eligible, self.mode).await;
        let Some(winner) = selection.accepted.clone() else {
            return Resolution::unchanged(record, selection.outcome(), selection.summary());
        };

        let change = self.apply(&mut record, &winner);
        let detail = format!("{} {:.2} {}", winner.source, winner.score, winner.url);
        Resolution {
            record,
            outcome: Outcome::Replaced,
            change: Some(change),
            detail,
        }
    }

    async fn target(&self, record: &CampaignRecord) -> Target {
        match self.mode {
            RepairMode::Link => {
                let Some(url) = normalize_url(&record.outbound_url) else {
                    return Target::Repair("missing or malformed link".to_string());
                };
                if let Err(r) = self.validator.policy().screen(&url) {
                    return Target::Repair(r.to_string());
                }
                if !self.settings.check_existing {
                    return Target::Healthy("has a link".to_string());
                }
                let live = self.validator.is_live(&url).await;
                if !live.ok {
                    return Target::Repair(format!("link dead: {}", live.reason()));
                }
                if let Some(video) = extract_video(&url) {
                    if !self.validator.is_available_media(&video).await {
                        return Target::Repair("video unavailable".to_string());
                    }
                }
                Target::Healthy("link is live".to_string())
            }
            RepairMode::Thumbnail => {
                let Some(url) = normalize_url(&record.thumbnail_url) else {
                    return Target::Repair("missing or malformed thumbnail".to_string());
                };
                if is_placeholder_image(&url) {
                    return Target::Repair("placeholder thumbnail".to_string());
                }
                if !self.settings.check_existing {
                    return Target::Healthy("has a thumbnail".to_string());
                }
                if self.validator.is_image_content(&url).await {
                    Target::Healthy("thumbnail is live".to_string())
                } else {
                    Target::Repair("thumbnail not serving an image".to_string())
                }
            }
        }
    }

    /// Run every gatherer in order and merge their candidates, dropping
    /// repeats of a URL and anything equal to the value being replaced.
    pub async fn gather(&self, record: &CampaignRecord) -> Vec<Candidate> {
        let current = normalize_url(match self.mode {
            RepairMode::Link => &record.outbound_url,
            RepairMode::Thumbnail => &record.thumbnail_url,
        });

        let mut out: Vec<Candidate> = Vec::new();
        for gatherer in &self.gatherers {
            let found = gatherer.gather(record).await;
            log::debug!("{}: {} gave {} candidates", record.id, gatherer.kind(), found.len());
            for candidate in found {
                let replaces = match self.mode {
                    RepairMode::Link => Some(&candidate.url),
                    RepairMode::Thumbnail => candidate.thumbnail_url.as_ref(),
                };
                let Some(replaces) = replaces else {
                    continue;
                };
                if current.as_ref() == Some(replaces) {
                    continue;
                }
                match out.iter_mut().find(|c| c.url == candidate.url) {
                    Some(existing) => {
                        if existing.thumbnail_url.is_none() {
                            existing.thumbnail_url = candidate.thumbnail_url;
                        }
                    }
                    None => out.push(candidate),
                }
            }
        }
        out
    }

    fn apply(&self, record: &mut CampaignRecord, winner: &Candidate) -> ChangeEntry {
        let (field, old_url, new_url) = match self.mode {
            RepairMode::Link => {
                let old = std::mem::replace(&mut record.outbound_url, winner.url.clone());
                if let (Some(_), Some(thumb)) = (&winner.video, &winner.thumbnail_url) {
                    record.thumbnail_url = thumb.clone();
                }
                ("outboundUrl", old, winner.url.clone())
            }
            RepairMode::Thumbnail => {
                let thumb = winner.thumbnail_url.clone().unwrap_or_default();
                let old = std::mem::replace(&mut record.thumbnail_url, thumb.clone());
                ("thumbnailUrl", old, thumb)
            }
        };
        ChangeEntry {
            id: record.id.clone(),
            field: field.to_string(),
            old_url,
            new_url,
            score: winner.score,
            source: winner.source,
        }
    }
}

#[cfg(test)]
#[path = "tests/resolve_tests.rs"]
mod tests;
