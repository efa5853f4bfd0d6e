use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use adcase_core::{CampaignRecord, Outcome, OutcomeCounts, RepairMode};
use adcase_lib::{ArtifactPaths, JsonCheckpointStore, PipelineSettings, load_dataset, save_dataset};
use adcase_scraper::{
    HttpClient, RepairEvent, RepairOptions, ReqwestClient, Resolver, RunSummary, run_repair,
};

use crate::cli_types::PipelineArgs;
use crate::spinner::SpinnerPool;
use crate::{CliError, log_blank};

/// Run the repair command.
pub(crate) fn run_repair_command(
    dataset: PathBuf,
    mode: RepairMode,
    restart: bool,
    dry_run: bool,
    pipeline: PipelineArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let mut settings = PipelineSettings::load()?;
    pipeline.apply(&mut settings);
    settings.validate()?;

    let paths = ArtifactPaths::for_dataset(&dataset, mode);
    let mut records = load_dataset(&dataset)?;

    log::info!(
        "Repairing {} in: {} ({} records)",
        mode.if_supports_color(Stdout, |t| t.bold()),
        dataset.display().if_supports_color(Stdout, |t| t.cyan()),
        records.len(),
    );
    if dry_run {
        log::info!(
            "{}",
            "Dry run: the dataset and checkpoint will not be written"
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    if let Some(n) = settings.max_items {
        log::info!(
            "{}",
            format!("Limit: {} records this run", n).if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    if settings.start_year.is_some() || settings.end_year.is_some() {
        log::info!(
            "{}",
            format!(
                "Years: {}..{}",
                settings.start_year.map(|y| y.to_string()).unwrap_or_default(),
                settings.end_year.map(|y| y.to_string()).unwrap_or_default(),
            )
            .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log_blank();

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new(
        settings.request_timeout(),
        settings.max_redirects,
    )?);
    let resolver = Arc::new(Resolver::from_settings(mode, http, &settings));
    let store = JsonCheckpointStore::new(paths.progress.clone());
    let mut options = RepairOptions::new(mode, settings);
    options.restart = restart;
    options.dry_run = dry_run;

    let rt = tokio::runtime::Runtime::new().map_err(|e| CliError::runtime(e.to_string()))?;
    let summary = rt.block_on(async {
        let cancel = Arc::new(AtomicBool::new(false));
        watch_for_shutdown(cancel.clone())?;

        let persist = |records: &[CampaignRecord]| save_dataset(&dataset, records);
        let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel::<RepairEvent>();
        let task = {
            let records = &mut records;
            let options = &options;
            let store = &store;
            async move {
                run_repair(records, options, resolver, store, persist, &event_tx, cancel).await
            }
        };

        let mut pool: Option<SpinnerPool> = None;
        let mut counts = OutcomeCounts::default();
        let concurrency = options.settings.concurrency;
        let result = adcase_lib::async_util::run_with_events(task, event_rx, |e| match e {
            RepairEvent::Started {
                total,
                start,
                end,
                resumed,
            } => {
                if resumed {
                    log::info!(
                        "Resuming at record {} of {}",
                        start.if_supports_color(Stdout, |t| t.bold()),
                        total,
                    );
                }
                pool = Some(SpinnerPool::new(concurrency, end - start, quiet));
            }
            RepairEvent::RecordStarted { index, id, title } => {
                if let Some(pool) = pool.as_mut() {
                    pool.claim(index, format!("[{}] {} {}", index, id, title));
                }
            }
            RepairEvent::RecordDone {
                index,
                id,
                outcome,
                detail,
            } => {
                counts.record(outcome);
                let Some(pool) = pool.as_mut() else {
                    return;
                };
                pool.release(index);
                pool.set_status(counts.summary());
                match outcome {
                    Outcome::Replaced => {
                        if !quiet {
                            pool.println(&format!(
                                "  {} {} {}",
                                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                                id,
                                detail.if_supports_color(Stdout, |t| t.dimmed()),
                            ));
                        }
                    }
                    _ => log::debug!("{} {}: {}", id, outcome, detail),
                }
            }
            RepairEvent::Checkpointed {
                next_index,
                checked,
            } => {
                log::debug!("Checkpoint at {} ({} checked this pass)", next_index, checked);
            }
            RepairEvent::Cancelling => {
                if let Some(pool) = pool.as_ref() {
                    pool.println(&format!(
                        "  {} Cancelling, finishing records in flight...",
                        "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                    ));
                }
            }
            RepairEvent::Finished { .. } => {}
        })
        .await;

        if let Some(mut pool) = pool {
            pool.clear_all();
        }
        result.map_err(CliError::from)
    })?;

    write_artifacts(&summary, &paths, mode)?;
    print_summary(&summary, &paths);
    Ok(())
}

/// Set `cancel` on Ctrl-C, or on SIGTERM from a supervisor on Unix. The
/// SIGTERM handler is installed before this returns.
pub(crate) fn watch_for_shutdown(cancel: Arc<AtomicBool>) -> Result<(), CliError> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = signal(SignalKind::terminate())?;
        let flag = cancel.clone();
        tokio::spawn(async move {
            if terminate.recv().await.is_some() {
                log::debug!("SIGTERM received");
                flag.store(true, Ordering::Relaxed);
            }
        });
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.store(true, Ordering::Relaxed);
        }
    });
    Ok(())
}

fn write_artifacts(
    summary: &RunSummary,
    paths: &ArtifactPaths,
    mode: RepairMode,
) -> Result<(), CliError> {
    summary.report.write(&paths.report)?;
    summary.log.write_to_file(&paths.log, mode)?;
    Ok(())
}

fn print_summary(summary: &RunSummary, paths: &ArtifactPaths) {
    let report = &summary.report;
    let log_summary = summary.log.summary();

    log_blank();
    if log_summary.total_replaced > 0 {
        log::info!(
            "  {} {} replaced (direct: {}, video: {}, web: {}, source page: {})",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            log_summary.total_replaced,
            log_summary.by_direct,
            log_summary.by_video,
            log_summary.by_web,
            log_summary.by_source_page,
        );
    }
    if log_summary.total_skipped > 0 {
        log::info!(
            "  {} {} skipped",
            "-".if_supports_color(Stdout, |t| t.dimmed()),
            log_summary.total_skipped,
        );
    }
    if log_summary.total_unresolved > 0 {
        log::warn!(
            "  {} {} unresolved",
            "?".if_supports_color(Stdout, |t| t.yellow()),
            log_summary.total_unresolved,
        );
    }
    if log_summary.total_errors > 0 {
        log::warn!(
            "  {} {} errors",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            log_summary.total_errors,
        );
    }
    if report.checked == 0 {
        log::info!("  Nothing to check in this range");
    } else {
        log::info!(
            "  {}",
            report.counts.summary().if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    log_blank();
    if report.cancelled {
        log::warn!(
            "Cancelled. Run the same command again to resume at record {}.",
            summary.next_index,
        );
    } else if summary.pass_complete {
        log::info!("Reached the end of the dataset.");
    } else if !report.dry_run {
        log::info!(
            "Stopped at record {}. Run again to continue.",
            summary.next_index,
        );
    }
    log::info!(
        "Report: {}",
        paths.report.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!(
        "Log:    {}",
        paths.log.display().if_supports_color(Stdout, |t| t.cyan()),
    );
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn sigterm_sets_the_cancel_flag() {
        let cancel = Arc::new(AtomicBool::new(false));
        watch_for_shutdown(cancel.clone()).unwrap();

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), async {
            while !cancel.load(Ordering::Relaxed) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }
}
