use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use adcase_lib::PipelineSettings;
use adcase_lib::settings::{render_settings, save_settings_file, settings_path};

use crate::{CliError, log_blank};

/// Show effective settings: defaults, then the settings file, then the environment.
pub(crate) fn run_config_show() -> Result<(), CliError> {
    let path = settings_path();
    log::info!(
        "{}",
        "Pipeline Settings".if_supports_color(Stdout, |t| t.bold()),
    );
    log_blank();
    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log_blank();

    let settings = PipelineSettings::load()?;
    for line in render_settings(&settings)?.lines() {
        log::info!("  {}", line);
    }
    log_blank();
    log::info!(
        "{}",
        "Environment variables (CONCURRENCY, MAX_ITEMS, MIN_SCORE, ...) override the file."
            .if_supports_color(Stdout, |t| t.dimmed()),
    );
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() {
    println!("{}", settings_path().display());
}

/// Write a settings file populated with the defaults.
pub(crate) fn run_config_init(force: bool) -> Result<(), CliError> {
    let path = settings_path();
    if path.exists() && !force {
        log::warn!(
            "{} already exists (use --force to overwrite)",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
        );
        return Ok(());
    }
    save_settings_file(&path, &PipelineSettings::default())?;
    log::info!(
        "{} Wrote {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}
