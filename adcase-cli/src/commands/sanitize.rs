use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use adcase_lib::{load_dataset, sanitize_dataset, save_dataset};

use crate::{CliError, log_blank};

/// Run the sanitize command.
pub(crate) fn run_sanitize(dataset: &Path, dry_run: bool) -> Result<(), CliError> {
    let mut records = load_dataset(dataset)?;
    log::info!(
        "Sanitizing: {} ({} records)",
        dataset.display().if_supports_color(Stdout, |t| t.cyan()),
        records.len(),
    );
    if dry_run {
        log::info!(
            "{}",
            "Dry run: no files will be modified".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log_blank();

    let summary = sanitize_dataset(&mut records);
    if summary.records_changed == 0 {
        log::info!(
            "  {} Nothing to clean",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        );
        return Ok(());
    }

    let rows = [
        ("URLs normalized", summary.urls_normalized),
        ("Redirects unwrapped", summary.redirects_unwrapped),
        ("Thumbnails reset", summary.thumbnails_reset),
        ("Duplicate tags removed", summary.tags_removed),
    ];
    for (label, n) in rows.iter().filter(|(_, n)| *n > 0) {
        log::info!("  {:<24} {}", label, n.if_supports_color(Stdout, |t| t.bold()));
    }
    log_blank();

    if dry_run {
        log::info!(
            "{} records would change",
            summary.records_changed.if_supports_color(Stdout, |t| t.bold()),
        );
        return Ok(());
    }

    save_dataset(dataset, &records)?;
    log::info!(
        "  {} {} records updated",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        summary.records_changed,
    );
    Ok(())
}
