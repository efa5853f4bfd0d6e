use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use adcase_core::RepairMode;
use adcase_lib::{ArtifactPaths, CheckpointStore, JsonCheckpointStore, RunReport, load_dataset};

use crate::{CliError, log_blank};

/// Show where the next repair run for `mode` will start, and the last report.
pub(crate) fn run_status(dataset: &Path, mode: RepairMode) -> Result<(), CliError> {
    let paths = ArtifactPaths::for_dataset(dataset, mode);
    let total = load_dataset(dataset)?.len();
    let store = JsonCheckpointStore::new(paths.progress.clone());

    log::info!(
        "{} ({} mode, {} records)",
        dataset.display().if_supports_color(Stdout, |t| t.cyan()),
        mode,
        total,
    );
    log_blank();

    match store.load()? {
        Some(cp) if cp.next_index < total => {
            let pct = cp.next_index as f64 * 100.0 / total.max(1) as f64;
            log::info!(
                "  Checkpoint: record {} of {} ({:.1}%)",
                cp.next_index.if_supports_color(Stdout, |t| t.bold()),
                total,
                pct,
            );
            log::info!("  Checked this pass: {}", cp.checked);
            log::info!("  {}", cp.counts.summary().if_supports_color(Stdout, |t| t.dimmed()));
            log::info!(
                "  Updated: {}",
                cp.updated_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M:%S"),
            );
        }
        Some(cp) => {
            log::info!(
                "  Checkpoint at {} is past the end; the next run starts a new pass",
                cp.next_index,
            );
        }
        None => {
            log::info!(
                "  {}",
                "No checkpoint; the next run starts at record 0"
                    .if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
    }

    if paths.report.exists() {
        let report = RunReport::load(&paths.report)?;
        log_blank();
        log::info!(
            "  Last run: {} (records {}..{}{}{})",
            report
                .generated_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S"),
            report.start_index,
            report.end_index,
            if report.dry_run { ", dry run" } else { "" },
            if report.cancelled { ", cancelled" } else { "" },
        );
        log::info!(
            "  {} changed, {} failed: {}",
            report.changed.len().if_supports_color(Stdout, |t| t.green()),
            report.failed.len(),
            report.counts.summary().if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    Ok(())
}
