//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use adcase_core::{GathererKind, RepairMode};
use adcase_lib::PipelineSettings;

#[derive(Parser)]
#[command(name = "adcase")]
#[command(about = "Repair dead links and thumbnails in an ad-campaign dataset", long_about = None)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// The dataset file every data command works on.
#[derive(Args, Clone)]
pub(crate) struct DatasetArgs {
    /// Path to the campaign dataset (a JSON array of records)
    #[arg(short, long, default_value = "campaigns.json")]
    pub dataset: PathBuf,
}

/// Flags overriding the settings file and environment for one run.
#[derive(Args, Clone, Default)]
pub(crate) struct PipelineArgs {
    /// Records resolved in parallel
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Maximum records to process this run
    #[arg(short = 'l', long)]
    pub max_items: Option<usize>,

    /// Minimum score a candidate needs to be considered
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Minimum score for video-search candidates
    #[arg(long)]
    pub min_video_score: Option<f64>,

    /// Minimum score for web-search candidates
    #[arg(long)]
    pub min_web_score: Option<f64>,

    /// Start at this dataset index (ignores the checkpoint)
    #[arg(long)]
    pub start_index: Option<usize>,

    /// Only repair records from this year on
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Only repair records up to this year
    #[arg(long)]
    pub end_year: Option<i32>,

    /// Save dataset and checkpoint after this many records
    #[arg(long)]
    pub save_every: Option<usize>,

    /// How many ranked candidates to validate per record
    #[arg(long)]
    pub lookahead: Option<usize>,

    /// Candidate sources to use (e.g., direct,video,web,source)
    #[arg(long, value_delimiter = ',')]
    pub gatherers: Option<Vec<GathererKind>>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,

    /// Don't resume from the saved checkpoint
    #[arg(long)]
    pub no_resume: bool,

    /// Treat every existing value as healthy without probing it
    #[arg(long)]
    pub no_check_existing: bool,

    /// Only accept candidates on known video or case-study hosts
    #[arg(long)]
    pub restrict_hosts: bool,
}

impl PipelineArgs {
    /// Overlay the flags that were given onto `settings`.
    pub(crate) fn apply(&self, settings: &mut PipelineSettings) {
        if let Some(n) = self.concurrency {
            settings.concurrency = n;
        }
        if self.max_items.is_some() {
            settings.max_items = self.max_items;
        }
        if let Some(s) = self.min_score {
            settings.min_score = s;
        }
        if self.min_video_score.is_some() {
            settings.min_video_score = self.min_video_score;
        }
        if self.min_web_score.is_some() {
            settings.min_web_score = self.min_web_score;
        }
        if self.start_index.is_some() {
            settings.start_index = self.start_index;
        }
        if self.start_year.is_some() {
            settings.start_year = self.start_year;
        }
        if self.end_year.is_some() {
            settings.end_year = self.end_year;
        }
        if let Some(n) = self.save_every {
            settings.save_every = n;
        }
        if let Some(n) = self.lookahead {
            settings.lookahead = n;
        }
        if let Some(kinds) = &self.gatherers {
            settings.gatherers = Some(kinds.clone());
        }
        if let Some(ms) = self.request_timeout_ms {
            settings.request_timeout_ms = ms;
        }
        if self.no_resume {
            settings.resume = false;
        }
        if self.no_check_existing {
            settings.check_existing = false;
        }
        if self.restrict_hosts {
            settings.restrict_hosts = true;
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Find and validate replacements for dead links or thumbnails
    Repair {
        #[command(flatten)]
        data: DatasetArgs,

        /// Field to repair: link or thumbnail
        #[arg(short, long, default_value = "link")]
        mode: RepairMode,

        /// Ignore the saved checkpoint and start from the beginning
        #[arg(long)]
        restart: bool,

        /// Resolve records but don't write the dataset or checkpoint
        #[arg(short = 'n', long)]
        dry_run: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Clean URLs, placeholder thumbnails and duplicate tags in place
    Sanitize {
        #[command(flatten)]
        data: DatasetArgs,

        /// Show what would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Score a candidate title against a record
    Score {
        #[command(flatten)]
        data: DatasetArgs,

        /// Record ID to score against
        #[arg(long)]
        id: String,

        /// Candidate title or link text
        text: String,

        /// Candidate URL (affects the host bonus)
        #[arg(long, default_value = "")]
        url: String,
    },

    /// Show the saved checkpoint and last report for a dataset
    Status {
        #[command(flatten)]
        data: DatasetArgs,

        /// Repair mode whose progress to show
        #[arg(short, long, default_value = "link")]
        mode: RepairMode,
    },

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show effective settings (file + environment)
    Show,

    /// Print the settings file path
    Path,

    /// Write a settings file with the defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
