//! Offline cleanup of record fields before a repair pass.
//!
//! Sanitizing never removes records and never touches the network. It
//! fixes values that are recognizably broken so the repair pass sees a
//! consistent dataset:
//!
//! - entity-encoded, protocol-relative or padded URLs are normalized
//! - search-engine redirect wrappers are unwrapped to their target
//! - placeholder or unparseable thumbnails are reset to empty
//! - duplicate tags are removed

use adcase_core::CampaignRecord;
use adcase_core::text::decode_html_entities;
use adcase_core::url::{decode_redirect_wrapper, is_placeholder_image, normalize_url};
use serde::Serialize;

/// What changed across a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizeSummary {
    pub records: usize,
    pub records_changed: usize,
    pub urls_normalized: usize,
    pub redirects_unwrapped: usize,
    pub thumbnails_reset: usize,
    pub tags_removed: usize,
}

impl SanitizeSummary {
    pub fn merge(&mut self, other: &SanitizeSummary) {
        self.records += other.records;
        self.records_changed += other.records_changed;
        self.urls_normalized += other.urls_normalized;
        self.redirects_unwrapped += other.redirects_unwrapped;
        self.thumbnails_reset += other.thumbnails_reset;
        self.tags_removed += other.tags_removed;
    }
}

/// Sanitize every record in place.
pub fn sanitize_dataset(records: &mut [CampaignRecord]) -> SanitizeSummary {
    let mut summary = SanitizeSummary::default();
    for record in records.iter_mut() {
        summary.merge(&sanitize_record(record));
    }
    if summary.records_changed > 0 {
        log::info!(
            "Sanitized {} of {} records ({} URLs normalized, {} redirects unwrapped, {} thumbnails reset, {} tags removed)",
            summary.records_changed,
            summary.records,
            summary.urls_normalized,
            summary.redirects_unwrapped,
            summary.thumbnails_reset,
            summary.tags_removed
        );
    }
    summary
}

/// Sanitize one record in place.
pub fn sanitize_record(record: &mut CampaignRecord) -> SanitizeSummary {
    let mut summary = SanitizeSummary {
        records: 1,
        ..Default::default()
    };

    for field in [&mut record.outbound_url, &mut record.source_url] {
        match clean_link(field) {
            LinkFix::Unchanged => {}
            LinkFix::Normalized(url) => {
                *field = url;
                summary.urls_normalized += 1;
            }
            LinkFix::Unwrapped(url) => {
                *field = url;
                summary.redirects_unwrapped += 1;
            }
        }
    }

    if !record.thumbnail_url.is_empty() {
        match normalize_url(&record.thumbnail_url) {
            Some(_) if is_placeholder_image(&record.thumbnail_url) => {
                log::debug!("{}: placeholder thumbnail reset", record.id);
                record.thumbnail_url.clear();
                summary.thumbnails_reset += 1;
            }
            Some(url) => {
                if needs_normalizing(&record.thumbnail_url) {
                    record.thumbnail_url = url;
                    summary.urls_normalized += 1;
                }
            }
            None => {
                log::debug!(
                    "{}: malformed thumbnail '{}' reset",
                    record.id,
                    record.thumbnail_url
                );
                record.thumbnail_url.clear();
                summary.thumbnails_reset += 1;
            }
        }
    }

    summary.tags_removed = record.dedupe_tags();

    let changed = summary.urls_normalized
        + summary.redirects_unwrapped
        + summary.thumbnails_reset
        + summary.tags_removed;
    summary.records_changed = usize::from(changed > 0);
    summary
}

enum LinkFix {
    Unchanged,
    Normalized(String),
    Unwrapped(String),
}

/// Links are never cleared, even when malformed: the repair pass treats an
/// unparseable link as a target and keeps the original in its report.
fn clean_link(raw: &str) -> LinkFix {
    if raw.is_empty() {
        return LinkFix::Unchanged;
    }
    if let Some(target) = decode_redirect_wrapper(raw) {
        return LinkFix::Unwrapped(target);
    }
    match normalize_url(raw) {
        Some(url) if needs_normalizing(raw) => LinkFix::Normalized(url),
        _ => LinkFix::Unchanged,
    }
}

/// Whether a parseable URL is stored in a form worth rewriting. Plain
/// serializer differences (a missing trailing slash) are left alone.
fn needs_normalizing(raw: &str) -> bool {
    raw != raw.trim() || raw.starts_with("//") || decode_html_entities(raw) != raw
}

#[cfg(test)]
#[path = "tests/sanitize_tests.rs"]
mod tests;
