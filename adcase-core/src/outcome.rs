use serde::{Deserialize, Serialize};

/// Terminal classification of one record's processing attempt.
///
/// Buckets are mutually exclusive; every checked record lands in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A validated candidate was written to the record.
    Replaced,
    /// Not a repair target (existing value healthy, or filtered out).
    Skipped,
    /// No gatherer produced a candidate.
    NoCandidates,
    /// Candidates existed but none cleared the score threshold.
    LowScore,
    /// Candidates cleared the threshold but failed liveness or availability.
    Unavailable,
    /// Every examined candidate was on a blocked host or pattern.
    Rejected,
    /// Processing the record timed out.
    Errored,
}

const ALL_OUTCOMES: &[Outcome] = &[
    Outcome::Replaced,
    Outcome::Skipped,
    Outcome::NoCandidates,
    Outcome::LowScore,
    Outcome::Unavailable,
    Outcome::Rejected,
    Outcome::Errored,
];

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Replaced => "replaced",
            Self::Skipped => "skipped",
            Self::NoCandidates => "no_candidates",
            Self::LowScore => "low_score",
            Self::Unavailable => "unavailable",
            Self::Rejected => "rejected",
            Self::Errored => "errored",
        }
    }

    pub fn all() -> &'static [Outcome] {
        ALL_OUTCOMES
    }

    /// Whether the record was a target that could not be repaired.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Replaced | Self::Skipped)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-bucket counters. Serialized flat (camelCase) into checkpoints and
/// reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutcomeCounts {
    pub replaced: usize,
    pub skipped: usize,
    pub no_candidates: usize,
    pub low_score: usize,
    pub unavailable: usize,
    pub rejected: usize,
    pub errored: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: Outcome) {
        *self.slot(outcome) += 1;
    }

    pub fn get(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Replaced => self.replaced,
            Outcome::Skipped => self.skipped,
            Outcome::NoCandidates => self.no_candidates,
            Outcome::LowScore => self.low_score,
            Outcome::Unavailable => self.unavailable,
            Outcome::Rejected => self.rejected,
            Outcome::Errored => self.errored,
        }
    }

    fn slot(&mut self, outcome: Outcome) -> &mut usize {
        match outcome {
            Outcome::Replaced => &mut self.replaced,
            Outcome::Skipped => &mut self.skipped,
            Outcome::NoCandidates => &mut self.no_candidates,
            Outcome::LowScore => &mut self.low_score,
            Outcome::Unavailable => &mut self.unavailable,
            Outcome::Rejected => &mut self.rejected,
            Outcome::Errored => &mut self.errored,
        }
    }

    /// Sum over every bucket.
    pub fn total(&self) -> usize {
        ALL_OUTCOMES.iter().map(|o| self.get(*o)).sum()
    }

    /// Targets that could not be repaired.
    pub fn failures(&self) -> usize {
        ALL_OUTCOMES
            .iter()
            .filter(|o| o.is_failure())
            .map(|o| self.get(*o))
            .sum()
    }

    pub fn merge(&mut self, other: &OutcomeCounts) {
        for &outcome in ALL_OUTCOMES {
            *self.slot(outcome) += other.get(outcome);
        }
    }

    /// Whether `checked` is exactly accounted for by the buckets.
    pub fn is_closed(&self, checked: usize) -> bool {
        self.total() == checked
    }

    /// Non-zero buckets as `label=count` pairs, for log lines.
    pub fn summary(&self) -> String {
        let parts: Vec<String> = ALL_OUTCOMES
            .iter()
            .filter(|o| self.get(**o) > 0)
            .map(|o| format!("{}={}", o.label(), self.get(*o)))
            .collect();
        if parts.is_empty() {
            "nothing checked".to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_close_over_all_buckets() {
        let mut counts = OutcomeCounts::default();
        for &outcome in Outcome::all() {
            counts.record(outcome);
        }
        counts.record(Outcome::Replaced);
        assert_eq!(counts.total(), Outcome::all().len() + 1);
        assert!(counts.is_closed(8));
        assert!(!counts.is_closed(7));
        assert_eq!(counts.failures(), 5);
    }

    #[test]
    fn merge_adds_buckets() {
        let mut a = OutcomeCounts {
            replaced: 2,
            low_score: 1,
            ..Default::default()
        };
        let b = OutcomeCounts {
            replaced: 1,
            errored: 3,
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.replaced, 3);
        assert_eq!(a.errored, 3);
        assert_eq!(a.total(), 7);
    }

    #[test]
    fn serializes_camel_case() {
        let counts = OutcomeCounts {
            no_candidates: 4,
            ..Default::default()
        };
        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json["noCandidates"], 4);
        assert_eq!(json["lowScore"], 0);
        assert_eq!(serde_json::to_value(Outcome::LowScore).unwrap(), "low_score");
    }

    #[test]
    fn summary_lists_nonzero_buckets() {
        let mut counts = OutcomeCounts::default();
        assert_eq!(counts.summary(), "nothing checked");
        counts.record(Outcome::Unavailable);
        counts.record(Outcome::Replaced);
        assert_eq!(counts.summary(), "replaced=1, unavailable=1");
    }
}
