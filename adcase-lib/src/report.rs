use std::path::Path;

use adcase_core::{CandidateSource, Outcome, OutcomeCounts, RepairMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dataset::{read_json, write_json_atomic};
use crate::error::DatasetError;

/// One field rewritten on one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEntry {
    pub id: String,
    /// `outboundUrl` or `thumbnailUrl`.
    pub field: String,
    pub old_url: String,
    pub new_url: String,
    pub score: f64,
    pub source: CandidateSource,
}

/// A target record that could not be repaired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureEntry {
    pub id: String,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

/// Summary of one repair invocation. Written once at the end of a run and
/// never merged with earlier reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub mode: RepairMode,
    /// First index processed by this run.
    pub start_index: usize,
    /// One past the last index in this run's range.
    pub end_index: usize,
    /// Records in the range.
    pub targets: usize,
    pub checked: usize,
    #[serde(flatten)]
    pub counts: OutcomeCounts,
    pub min_score: f64,
    /// True when the run stopped early on an interrupt.
    #[serde(default)]
    pub cancelled: bool,
    /// True when no changes were written back.
    #[serde(default)]
    pub dry_run: bool,
    pub changed: Vec<ChangeEntry>,
    pub failed: Vec<FailureEntry>,
}

impl RunReport {
    pub fn new(mode: RepairMode, start_index: usize, end_index: usize, min_score: f64) -> Self {
        Self {
            generated_at: Utc::now(),
            mode,
            start_index,
            end_index,
            targets: end_index.saturating_sub(start_index),
            checked: 0,
            counts: OutcomeCounts::default(),
            min_score,
            cancelled: false,
            dry_run: false,
            changed: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Account for one processed record.
    pub fn record(
        &mut self,
        id: &str,
        outcome: Outcome,
        change: Option<ChangeEntry>,
        detail: &str,
    ) {
        self.checked += 1;
        self.counts.record(outcome);
        if let Some(change) = change {
            self.changed.push(change);
        }
        if outcome.is_failure() {
            self.failed.push(FailureEntry {
                id: id.to_string(),
                outcome,
                detail: detail.to_string(),
            });
        }
    }

    /// Whether every checked record landed in exactly one bucket.
    pub fn is_closed(&self) -> bool {
        self.counts.is_closed(self.checked)
    }

    pub fn write(&self, path: &Path) -> Result<(), DatasetError> {
        write_json_atomic(path, self)
    }

    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        read_json(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_accounts_for_every_outcome() {
        let mut report = RunReport::new(RepairMode::Link, 0, 4, 0.45);
        report.record(
            "a",
            Outcome::Replaced,
            Some(ChangeEntry {
                id: "a".into(),
                field: "outboundUrl".into(),
                old_url: "https://dead.example/x".into(),
                new_url: "https://www.youtube.com/watch?v=abc12345678".into(),
                score: 1.2,
                source: CandidateSource::Video,
            }),
            "",
        );
        report.record("b", Outcome::LowScore, None, "best 0.31");
        report.record("c", Outcome::Skipped, None, "");
        assert_eq!(report.targets, 4);
        assert_eq!(report.checked, 3);
        assert!(report.is_closed());
        assert_eq!(report.changed.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].outcome, Outcome::LowScore);
    }

    #[test]
    fn writes_flat_camel_case_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campaigns.link.report.json");
        let mut report = RunReport::new(RepairMode::Thumbnail, 5, 10, 0.5);
        report.record("x", Outcome::NoCandidates, None, "");
        report.write(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["mode"], "thumbnail");
        assert_eq!(value["targets"], 5);
        assert_eq!(value["noCandidates"], 1);
        assert_eq!(value["minScore"], 0.5);
        assert!(value["generatedAt"].is_string());
        assert_eq!(value["failed"][0]["outcome"], "no_candidates");

        assert_eq!(RunReport::load(&path).unwrap(), report);
    }
}
