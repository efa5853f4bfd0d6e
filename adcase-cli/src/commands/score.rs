use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use adcase_core::scorer::score;
use adcase_lib::{PipelineSettings, load_dataset};

use crate::{CliError, log_blank};

/// Run the score command: show how a candidate title scores against a record.
pub(crate) fn run_score(dataset: &Path, id: &str, text: &str, url: &str) -> Result<(), CliError> {
    let records = load_dataset(dataset)?;
    let record = records
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| CliError::UnknownRecord(id.to_string()))?;
    let settings = PipelineSettings::load()?;

    log::info!(
        "{} {}",
        record.id.if_supports_color(Stdout, |t| t.bold()),
        record.identity_text().if_supports_color(Stdout, |t| t.dimmed()),
    );
    log::info!("  Candidate: {}", text);
    if !url.is_empty() {
        log::info!("  URL:       {}", url.if_supports_color(Stdout, |t| t.cyan()));
    }
    log_blank();

    let breakdown = score(record, text, url);
    log::info!("  Overlap:   {:.3}", breakdown.overlap);
    log::info!("  Host:      +{:.2}", breakdown.host_bonus);
    log::info!("  Year:      +{:.2}", breakdown.year_bonus);
    log::info!("  Brand:     +{:.2}", breakdown.brand_bonus);
    log::info!("  Title:     +{:.2}", breakdown.title_bonus);
    log::info!("  Penalty:   -{:.2}", breakdown.penalty);
    log_blank();

    let threshold = settings.min_score;
    if breakdown.total >= threshold {
        log::info!(
            "  Total {} {} (min score {:.2})",
            format!("{:.3}", breakdown.total).if_supports_color(Stdout, |t| t.bold()),
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            threshold,
        );
    } else {
        log::info!(
            "  Total {} {} (min score {:.2})",
            format!("{:.3}", breakdown.total).if_supports_color(Stdout, |t| t.bold()),
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            threshold,
        );
    }
    Ok(())
}
