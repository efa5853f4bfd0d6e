//! Resumable batch driver.
//!
//! Loads the target range from the checkpoint, fans records out to a worker
//! pool, applies results to the in-memory dataset as they come back, and
//! persists the whole dataset plus a checkpoint every `save_every` records.
//!
//! The dataset is the only shared mutable state and only this module writes
//! it, through the injected `persist` closure. Two drivers over the same
//! dataset file are not supported: whichever saves last wins. An ungraceful
//! kill loses at most `save_every × concurrency` records of work, all of
//! which are redone on the next run.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use adcase_core::{CampaignRecord, Outcome, OutcomeCounts, RepairMode};
use adcase_lib::{
    Checkpoint, CheckpointStore, DatasetError, PipelineSettings, RunReport, WorkerPool,
};
use tokio::sync::mpsc;

use crate::error::RepairError;
use crate::log::{LogEntry, RepairLog};
use crate::resolve::{Resolution, Resolver};

#[derive(Debug, Clone)]
pub struct RepairOptions {
    pub mode: RepairMode,
    pub settings: PipelineSettings,
    /// Ignore any saved checkpoint.
    pub restart: bool,
    /// Resolve everything but write nothing: no dataset saves, no checkpoint.
    pub dry_run: bool,
}

impl RepairOptions {
    pub fn new(mode: RepairMode, settings: PipelineSettings) -> Self {
        Self {
            mode,
            settings,
            restart: false,
            dry_run: false,
        }
    }
}

/// Progress events for the UI.
#[derive(Debug, Clone)]
pub enum RepairEvent {
    Started {
        total: usize,
        start: usize,
        end: usize,
        resumed: bool,
    },
    RecordStarted {
        index: usize,
        id: String,
        title: String,
    },
    RecordDone {
        index: usize,
        id: String,
        outcome: Outcome,
        detail: String,
    },
    Checkpointed {
        next_index: usize,
        checked: usize,
    },
    /// Cancellation was noticed; in-flight records are finishing.
    Cancelling,
    Finished {
        checked: usize,
        counts: OutcomeCounts,
        cancelled: bool,
    },
}

/// The index range a run covers, and the counters it continues from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub start: usize,
    pub end: usize,
    pub resumed: bool,
    /// Records checked earlier in this pass.
    pub carried_checked: usize,
    pub carried_counts: OutcomeCounts,
}

impl RunPlan {
    /// `START_INDEX` wins over the checkpoint; a checkpoint at or past the
    /// end of the dataset starts a new pass.
    pub fn compute(
        len: usize,
        settings: &PipelineSettings,
        checkpoint: Option<&Checkpoint>,
    ) -> Self {
        let mut plan = Self {
            start: 0,
            end: len,
            resumed: false,
            carried_checked: 0,
            carried_counts: OutcomeCounts::default(),
        };
        match (settings.start_index, checkpoint) {
            (Some(index), _) => plan.start = index.min(len),
            (None, Some(cp)) if cp.next_index < len => {
                plan.start = cp.next_index;
                plan.resumed = true;
                plan.carried_checked = cp.checked;
                plan.carried_counts = cp.counts;
            }
            (None, Some(cp)) => {
                log::info!(
                    "Checkpoint at {} is at the end of {} records, starting a new pass",
                    cp.next_index,
                    len
                );
            }
            (None, None) => {}
        }
        if let Some(max) = settings.max_items {
            plan.end = plan.start.saturating_add(max).min(len);
        }
        plan
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lowest index not yet completed. Records finish out of order, so the
/// checkpoint only moves past positions every worker has finished.
#[derive(Debug)]
struct Watermark {
    next: usize,
    done: BTreeSet<usize>,
}

impl Watermark {
    fn new(start: usize) -> Self {
        Self {
            next: start,
            done: BTreeSet::new(),
        }
    }

    fn complete(&mut self, index: usize) {
        self.done.insert(index);
        while self.done.remove(&self.next) {
            self.next += 1;
        }
    }
}

/// Result of a repair run.
#[derive(Debug)]
pub struct RunSummary {
    pub report: RunReport,
    pub log: RepairLog,
    /// Where the next run will resume.
    pub next_index: usize,
    /// The run reached the end of the dataset and the checkpoint was cleared.
    pub pass_complete: bool,
}

fn log_entry(res: &Resolution) -> LogEntry {
    match (&res.change, res.outcome) {
        (Some(change), _) => LogEntry::Replaced {
            id: change.id.clone(),
            field: change.field.clone(),
            old_url: change.old_url.clone(),
            new_url: change.new_url.clone(),
            source: change.source,
            score: change.score,
        },
        (None, Outcome::Skipped) => LogEntry::Skipped {
            id: res.record.id.clone(),
            reason: res.detail.clone(),
        },
        (None, outcome) => LogEntry::Failed {
            id: res.record.id.clone(),
            outcome,
            detail: res.detail.clone(),
        },
    }
}

fn save_progress<P>(
    records: &[CampaignRecord],
    persist: &mut P,
    store: &dyn CheckpointStore,
    checkpoint: &Checkpoint,
) -> Result<(), RepairError>
where
    P: FnMut(&[CampaignRecord]) -> Result<(), DatasetError>,
{
    persist(records)?;
    store.save(checkpoint)?;
    log::debug!(
        "Checkpoint: next index {} ({} checked) -> {}",
        checkpoint.next_index,
        checkpoint.checked,
        store.describe()
    );
    Ok(())
}

/// Repair `records` in place.
///
/// Per-record problems never fail the run; they end up in the report. Only
/// persistence and checkpoint errors are returned, after which the dataset
/// may be ahead of the last checkpoint (the next run redoes that work).
pub async fn run_repair<P>(
    records: &mut [CampaignRecord],
    options: &RepairOptions,
    resolver: Arc<Resolver>,
    store: &dyn CheckpointStore,
    mut persist: P,
    events: &mpsc::UnboundedSender<RepairEvent>,
    cancel: Arc<AtomicBool>,
) -> Result<RunSummary, RepairError>
where
    P: FnMut(&[CampaignRecord]) -> Result<(), DatasetError>,
{
    let settings = &options.settings;
    let saved = if options.restart || !settings.resume {
        None
    } else {
        store.load()?
    };
    let plan = RunPlan::compute(records.len(), settings, saved.as_ref());

    log::info!(
        "Repairing {} for records [{}, {}) of {}{}",
        options.mode,
        plan.start,
        plan.end,
        records.len(),
        if plan.resumed { " (resumed)" } else { "" }
    );
    let _ = events.send(RepairEvent::Started {
        total: records.len(),
        start: plan.start,
        end: plan.end,
        resumed: plan.resumed,
    });

    let mut report = RunReport::new(options.mode, plan.start, plan.end, settings.min_score);
    report.dry_run = options.dry_run;
    let mut repair_log = RepairLog::new();
    let mut watermark = Watermark::new(plan.start);
    let mut pass_checked = plan.carried_checked;
    let mut pass_counts = plan.carried_counts;

    let items: Vec<(usize, CampaignRecord)> = (plan.start..plan.end)
        .map(|i| (i, records[i].clone()))
        .collect();
    let record_timeout = settings.record_timeout();
    let worker_events = events.clone();
    let mut pool = WorkerPool::start_with_timeout(
        settings.concurrency,
        items,
        cancel.clone(),
        settings.pool_item_timeout(),
        move |(index, record): (usize, CampaignRecord)| {
            let resolver = resolver.clone();
            let events = worker_events.clone();
            async move {
                let _ = events.send(RepairEvent::RecordStarted {
                    index,
                    id: record.id.clone(),
                    title: record.title.clone(),
                });
                let fallback = record.clone();
                let outcome = tokio::time::timeout(record_timeout, resolver.resolve(record)).await;
                let res = match outcome {
                    Ok(res) => res,
                    Err(_) => Resolution::errored(
                        fallback,
                        format!("timed out after {}ms", record_timeout.as_millis()),
                    ),
                };
                (index, res)
            }
        },
    );

    let mut since_save = 0usize;
    let mut cancel_noticed = false;
    while let Some((index, res)) = pool.recv().await {
        if !cancel_noticed && cancel.load(Ordering::Relaxed) {
            cancel_noticed = true;
            log::warn!("Cancelling: finishing records already in flight");
            let _ = events.send(RepairEvent::Cancelling);
        }

        report.record(&res.record.id, res.outcome, res.change.clone(), &res.detail);
        repair_log.add(log_entry(&res));
        pass_checked += 1;
        pass_counts.record(res.outcome);
        let _ = events.send(RepairEvent::RecordDone {
            index,
            id: res.record.id.clone(),
            outcome: res.outcome,
            detail: res.detail.clone(),
        });
        if res.outcome == Outcome::Replaced && !options.dry_run {
            records[index] = res.record;
        }
        watermark.complete(index);

        if settings.progress_every > 0 && report.checked % settings.progress_every == 0 {
            log::info!(
                "{}/{} checked: {}",
                report.checked,
                plan.len(),
                report.counts.summary()
            );
        }

        since_save += 1;
        if since_save >= settings.save_every && !options.dry_run {
            since_save = 0;
            let checkpoint = Checkpoint::new(watermark.next, pass_checked, pass_counts);
            if let Err(e) = save_progress(records, &mut persist, store, &checkpoint) {
                cancel.store(true, Ordering::Relaxed);
                return Err(e);
            }
            let _ = events.send(RepairEvent::Checkpointed {
                next_index: checkpoint.next_index,
                checked: checkpoint.checked,
            });
        }
    }

    let cancelled = cancel.load(Ordering::Relaxed);
    report.cancelled = cancelled;
    let next_index = watermark.next;
    let pass_complete = !cancelled && next_index >= records.len();

    if !options.dry_run {
        persist(records)?;
        if pass_complete {
            store.clear()?;
            log::info!("Reached the end of the dataset, checkpoint cleared");
        } else {
            let checkpoint = Checkpoint::new(next_index, pass_checked, pass_counts);
            store.save(&checkpoint)?;
            let _ = events.send(RepairEvent::Checkpointed {
                next_index,
                checked: pass_checked,
            });
        }
    }

    log::info!(
        "Done: {} checked{}: {}",
        report.checked,
        if cancelled { " (cancelled)" } else { "" },
        report.counts.summary()
    );
    let _ = events.send(RepairEvent::Finished {
        checked: report.checked,
        counts: report.counts,
        cancelled,
    });

    Ok(RunSummary {
        report,
        log: repair_log,
        next_index,
        pass_complete,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PipelineSettings {
        PipelineSettings::default()
    }

    #[test]
    fn plan_defaults_to_whole_dataset() {
        let plan = RunPlan::compute(10, &settings(), None);
        assert_eq!((plan.start, plan.end, plan.resumed), (0, 10, false));
    }

    #[test]
    fn plan_resumes_from_checkpoint_with_cap() {
        let mut s = settings();
        s.max_items = Some(5);
        let mut counts = OutcomeCounts::default();
        counts.record(Outcome::Replaced);
        let cp = Checkpoint::new(4, 4, counts);
        let plan = RunPlan::compute(10, &s, Some(&cp));
        assert_eq!((plan.start, plan.end), (4, 9));
        assert!(plan.resumed);
        assert_eq!(plan.carried_checked, 4);
        assert_eq!(plan.carried_counts.replaced, 1);
        assert_eq!(plan.len(), 5);
    }

    #[test]
    fn start_index_beats_checkpoint_and_is_clamped() {
        let mut s = settings();
        s.start_index = Some(7);
        let cp = Checkpoint::new(2, 2, OutcomeCounts::default());
        let plan = RunPlan::compute(10, &s, Some(&cp));
        assert_eq!((plan.start, plan.end, plan.resumed), (7, 10, false));

        s.start_index = Some(50);
        let plan = RunPlan::compute(10, &s, None);
        assert!(plan.is_empty());
    }

    #[test]
    fn finished_checkpoint_starts_new_pass() {
        let cp = Checkpoint::new(10, 10, OutcomeCounts::default());
        let plan = RunPlan::compute(10, &settings(), Some(&cp));
        assert_eq!((plan.start, plan.end, plan.resumed), (0, 10, false));
    }

    #[test]
    fn watermark_waits_for_stragglers() {
        let mut w = Watermark::new(5);
        w.complete(6);
        w.complete(7);
        assert_eq!(w.next, 5);
        w.complete(5);
        assert_eq!(w.next, 8);
    }
}
