//! adcase CLI
//!
//! Command-line interface for repairing dead links and thumbnails in an
//! advertising case-study dataset.

mod cli_types;
mod commands;
mod error;
mod logging;
mod spinner;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cli_types::{Cli, Commands, ConfigAction};
pub(crate) use error::CliError;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("{}", e);
        std::process::exit(2);
    }
    let quiet = cli.quiet;

    let result = match cli.command {
        Commands::Repair {
            data,
            mode,
            restart,
            dry_run,
            pipeline,
        } => commands::repair::run_repair_command(
            data.dataset,
            mode,
            restart,
            dry_run,
            pipeline,
            quiet,
        ),
        Commands::Sanitize { data, dry_run } => {
            commands::sanitize::run_sanitize(&data.dataset, dry_run)
        }
        Commands::Score {
            data,
            id,
            text,
            url,
        } => commands::score::run_score(&data.dataset, &id, &text, &url),
        Commands::Status { data, mode } => commands::status::run_status(&data.dataset, mode),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(),
            ConfigAction::Path => {
                commands::config::run_config_path();
                Ok(())
            }
            ConfigAction::Init { force } => commands::config::run_config_init(force),
        },
    };

    if let Err(e) = result {
        log::error!(
            "{} {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            e,
        );
        std::process::exit(1);
    }
}

/// Log an empty line at info level (suppressed by `--quiet`).
pub(crate) fn log_blank() {
    log::info!("");
}
