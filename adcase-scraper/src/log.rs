use std::path::Path;

use adcase_core::{CandidateSource, Outcome, RepairMode};

/// A single entry in the repair log.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    Replaced {
        id: String,
        field: String,
        old_url: String,
        new_url: String,
        source: CandidateSource,
        score: f64,
    },
    Skipped {
        id: String,
        reason: String,
    },
    Failed {
        id: String,
        outcome: Outcome,
        detail: String,
    },
}

/// Collects per-record results and writes a log file.
#[derive(Debug, Default)]
pub struct RepairLog {
    entries: Vec<LogEntry>,
}

impl RepairLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn summary(&self) -> LogSummary {
        let mut summary = LogSummary::default();
        for entry in &self.entries {
            match entry {
                LogEntry::Replaced { source, .. } => {
                    summary.total_replaced += 1;
                    match source {
                        CandidateSource::Direct => summary.by_direct += 1,
                        CandidateSource::Video => summary.by_video += 1,
                        CandidateSource::Web => summary.by_web += 1,
                        CandidateSource::SourcePage => summary.by_source_page += 1,
                    }
                }
                LogEntry::Skipped { .. } => summary.total_skipped += 1,
                LogEntry::Failed { outcome, .. } => {
                    if *outcome == Outcome::Errored {
                        summary.total_errors += 1;
                    } else {
                        summary.total_unresolved += 1;
                    }
                }
            }
        }
        summary
    }

    /// Write the log to a file.
    pub fn write_to_file(&self, path: &Path, mode: RepairMode) -> std::io::Result<()> {
        use std::io::Write;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = std::fs::File::create(path)?;
        let summary = self.summary();

        writeln!(file, "=== Repair Log ({}) ===", mode)?;
        writeln!(
            file,
            "Date: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(file)?;
        writeln!(file, "--- Summary ---")?;
        writeln!(
            file,
            "Replaced: {} (direct: {}, video: {}, web: {}, source page: {})",
            summary.total_replaced,
            summary.by_direct,
            summary.by_video,
            summary.by_web,
            summary.by_source_page
        )?;
        writeln!(file, "Skipped: {}", summary.total_skipped)?;
        writeln!(file, "Unresolved: {}", summary.total_unresolved)?;
        writeln!(file, "Errors: {}", summary.total_errors)?;
        writeln!(file)?;
        writeln!(file, "--- Details ---")?;
        writeln!(file)?;

        for entry in &self.entries {
            match entry {
                LogEntry::Replaced {
                    id,
                    field,
                    old_url,
                    new_url,
                    source,
                    score,
                } => {
                    writeln!(file, "[OK] {} {} ({} {:.2})", id, field, source, score)?;
                    if !old_url.is_empty() {
                        writeln!(file, "     Old: {}", old_url)?;
                    }
                    writeln!(file, "     New: {}", new_url)?;
                }
                LogEntry::Skipped { .. } => {}
                LogEntry::Failed {
                    id,
                    outcome,
                    detail,
                } => {
                    writeln!(file, "[{}] {}", outcome.label().to_uppercase(), id)?;
                    if !detail.is_empty() {
                        writeln!(file, "     {}", detail)?;
                    }
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LogSummary {
    pub total_replaced: usize,
    pub total_skipped: usize,
    pub total_unresolved: usize,
    pub total_errors: usize,
    pub by_direct: usize,
    pub by_video: usize,
    pub by_web: usize,
    pub by_source_page: usize,
}
