//! Pipeline configuration.
//!
//! Layers, last one wins:
//!
//! 1. Built-in defaults
//! 2. `[pipeline]` table in `~/.config/adcase/settings.toml`
//! 3. Environment variables (`CONCURRENCY`, `MIN_SCORE`, ...)
//! 4. CLI flags (applied by the binary)
//!
//! An unparseable value in any layer is an error, never silently ignored.

use std::path::{Path, PathBuf};
use std::time::Duration;

use adcase_core::{CandidateSource, GathererKind, RepairMode};
use serde::{Deserialize, Serialize};

use crate::dataset::tmp_sibling;
use crate::error::SettingsError;

/// Web results are noisier than video results; without an explicit
/// `MIN_WEB_SCORE` they need this much more than `MIN_SCORE`.
pub const WEB_SCORE_MARGIN: f64 = 0.05;

/// Slack between the per-record timeout and the worker pool's own limit.
pub const POOL_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Worker pool size.
    pub concurrency: usize,
    /// Cap on records processed per run. `None` means the rest of the dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    /// Timeout for every HTTP request.
    pub request_timeout_ms: u64,
    /// Hard limit on one record's gather + validate work.
    pub record_timeout_ms: u64,
    /// Minimum score for a candidate to be validated at all.
    pub min_score: f64,
    /// Threshold for video-search candidates; falls back to `min_score`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_video_score: Option<f64>,
    /// Threshold for web-search candidates; falls back to
    /// `min_score + WEB_SCORE_MARGIN`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_web_score: Option<f64>,
    /// Continue from the saved checkpoint.
    pub resume: bool,
    /// Persist dataset and checkpoint after this many completed records.
    pub save_every: usize,
    /// Explicit start index. Overrides the checkpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_index: Option<usize>,
    /// Only records with `year >= start_year` are targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
    /// Only records with `year <= end_year` are targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_year: Option<i32>,
    /// How many ranked candidates the validator examines per record.
    pub lookahead: usize,
    /// Active gatherers. `None` uses the repair mode's default set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gatherers: Option<Vec<GathererKind>>,
    pub max_redirects: usize,
    /// Minimum spacing between requests to search pages, across workers.
    pub search_interval_ms: u64,
    /// Liveness-check the existing link before deciding a record needs work.
    /// When off, only empty or malformed values are repaired.
    pub check_existing: bool,
    /// Only accept candidates on the preferred-host allow-list.
    pub restrict_hosts: bool,
    /// Emit a progress log line every this many records.
    pub progress_every: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            concurrency: 8,
            max_items: None,
            request_timeout_ms: 12_000,
            record_timeout_ms: 90_000,
            min_score: 0.45,
            min_video_score: None,
            min_web_score: None,
            resume: true,
            save_every: 25,
            start_index: None,
            start_year: None,
            end_year: None,
            lookahead: 8,
            gatherers: None,
            max_redirects: 5,
            search_interval_ms: 1_000,
            check_existing: true,
            restrict_hosts: false,
            progress_every: 25,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    pipeline: PipelineSettings,
}

impl PipelineSettings {
    /// Defaults, then the settings file, then the process environment.
    pub fn load() -> Result<Self, SettingsError> {
        let mut settings = load_settings_file(&settings_path())?;
        settings.apply_env(|name| std::env::var(name).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Overlay environment variables, read through `lookup`.
    ///
    /// Empty values count as unset. `MAX_ITEMS` wins over `MAX_FIXES` and
    /// `SAVE_EVERY` over `CHECKPOINT_EVERY`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(|v| (name, v))
        };

        if let Some((n, v)) = get("CONCURRENCY") {
            self.concurrency = parse_num(n, &v)?;
        }
        if let Some((n, v)) = get("MAX_ITEMS").or_else(|| get("MAX_FIXES")) {
            let cap: usize = parse_num(n, &v)?;
            self.max_items = (cap > 0).then_some(cap);
        }
        if let Some((n, v)) = get("REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = parse_num(n, &v)?;
        }
        if let Some((n, v)) = get("RECORD_TIMEOUT_MS") {
            self.record_timeout_ms = parse_num(n, &v)?;
        }
        if let Some((n, v)) = get("MIN_SCORE") {
            self.min_score = parse_score(n, &v)?;
        }
        if let Some((n, v)) = get("MIN_VIDEO_SCORE") {
            self.min_video_score = Some(parse_score(n, &v)?);
        }
        if let Some((n, v)) = get("MIN_WEB_SCORE") {
            self.min_web_score = Some(parse_score(n, &v)?);
        }
        if let Some((n, v)) = get("RESUME") {
            self.resume = parse_bool(n, &v)?;
        }
        if let Some((n, v)) = get("SAVE_EVERY").or_else(|| get("CHECKPOINT_EVERY")) {
            self.save_every = parse_num(n, &v)?;
        }
        if let Some((n, v)) = get("START_INDEX") {
            self.start_index = Some(parse_num(n, &v)?);
        }
        if let Some((n, v)) = get("START_YEAR") {
            self.start_year = Some(parse_num(n, &v)?);
        }
        if let Some((n, v)) = get("END_YEAR") {
            self.end_year = Some(parse_num(n, &v)?);
        }
        if let Some((n, v)) = get("LOOKAHEAD") {
            self.lookahead = parse_num(n, &v)?;
        }
        if let Some((n, v)) = get("GATHERERS") {
            let kinds = GathererKind::parse_list(&v).map_err(|e| invalid_env(n, &v, e))?;
            self.gatherers = Some(kinds);
        }
        if let Some((n, v)) = get("MAX_REDIRECTS") {
            self.max_redirects = parse_num(n, &v)?;
        }
        if let Some((n, v)) = get("SEARCH_INTERVAL_MS") {
            self.search_interval_ms = parse_num(n, &v)?;
        }
        if let Some((n, v)) = get("CHECK_EXISTING") {
            self.check_existing = parse_bool(n, &v)?;
        }
        if let Some((n, v)) = get("RESTRICT_HOSTS") {
            self.restrict_hosts = parse_bool(n, &v)?;
        }
        if let Some((n, v)) = get("PROGRESS_EVERY") {
            self.progress_every = parse_num(n, &v)?;
        }
        Ok(())
    }

    /// Reject combinations the driver can't run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.concurrency == 0 {
            return Err(SettingsError::invalid("concurrency", "must be at least 1"));
        }
        if self.save_every == 0 {
            return Err(SettingsError::invalid("save_every", "must be at least 1"));
        }
        if self.lookahead == 0 {
            return Err(SettingsError::invalid("lookahead", "must be at least 1"));
        }
        if self.request_timeout_ms == 0 || self.record_timeout_ms == 0 {
            return Err(SettingsError::invalid("timeout", "must be greater than 0"));
        }
        for (field, value) in [
            ("min_score", Some(self.min_score)),
            ("min_video_score", self.min_video_score),
            ("min_web_score", self.min_web_score),
        ] {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(SettingsError::invalid(field, "must be a finite number"));
            }
        }
        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            if start > end {
                return Err(SettingsError::invalid(
                    "start_year",
                    format!("{} is after end_year {}", start, end),
                ));
            }
        }
        if matches!(self.gatherers.as_deref(), Some([])) {
            return Err(SettingsError::invalid("gatherers", "at least one is required"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn record_timeout(&self) -> Duration {
        Duration::from_millis(self.record_timeout_ms)
    }

    /// Limit handed to the worker pool. Always longer than the per-record
    /// timeout, so a slow record comes back as errored instead of vanishing.
    pub fn pool_item_timeout(&self) -> Duration {
        self.record_timeout() + POOL_TIMEOUT_MARGIN
    }

    pub fn search_interval(&self) -> Duration {
        Duration::from_millis(self.search_interval_ms)
    }

    /// Score a candidate from `source` must reach to be validated.
    pub fn threshold_for(&self, source: CandidateSource) -> f64 {
        match source {
            CandidateSource::Video => self.min_video_score.unwrap_or(self.min_score),
            CandidateSource::Web => self
                .min_web_score
                .unwrap_or(self.min_score + WEB_SCORE_MARGIN),
            CandidateSource::Direct | CandidateSource::SourcePage => self.min_score,
        }
    }

    /// Active gatherers for a run in `mode`.
    pub fn gatherers_for(&self, mode: RepairMode) -> Vec<GathererKind> {
        match &self.gatherers {
            Some(kinds) => kinds.clone(),
            None => mode.default_gatherers().to_vec(),
        }
    }

    /// Whether a record's year passes the `START_YEAR`/`END_YEAR` filter.
    ///
    /// Records without a year only pass when no filter is set.
    pub fn year_in_range(&self, year: Option<i32>) -> bool {
        if self.start_year.is_none() && self.end_year.is_none() {
            return true;
        }
        let Some(year) = year else {
            return false;
        };
        self.start_year.is_none_or(|s| year >= s) && self.end_year.is_none_or(|e| year <= e)
    }
}

fn invalid_env(name: &'static str, value: &str, reason: impl ToString) -> SettingsError {
    SettingsError::InvalidEnv {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_num<T>(name: &'static str, value: &str) -> Result<T, SettingsError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| invalid_env(name, value, e))
}

fn parse_score(name: &'static str, value: &str) -> Result<f64, SettingsError> {
    let v: f64 = parse_num(name, value)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(invalid_env(name, value, "not a finite number"))
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, SettingsError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid_env(name, value, "expected 1/0, true/false, yes/no")),
    }
}

/// Canonical path to the settings file: `~/.config/adcase/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("adcase").join("settings.toml")
}

/// Read the `[pipeline]` table. A missing file yields the defaults.
pub fn load_settings_file(path: &Path) -> Result<PipelineSettings, SettingsError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(PipelineSettings::default());
        }
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let file: SettingsFile = toml::from_str(&contents).map_err(|source| SettingsError::File {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.pipeline)
}

/// Write `settings` as the `[pipeline]` table, replacing the file atomically.
pub fn save_settings_file(path: &Path, settings: &PipelineSettings) -> Result<(), SettingsError> {
    let io_err = |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = SettingsFile {
        pipeline: settings.clone(),
    };
    let serialized = toml::to_string_pretty(&file)
        .map_err(|e| SettingsError::invalid("settings", e.to_string()))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let tmp = tmp_sibling(path);
    std::fs::write(&tmp, serialized).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

/// Effective settings rendered as TOML, for `config show`.
pub fn render_settings(settings: &PipelineSettings) -> Result<String, SettingsError> {
    let file = SettingsFile {
        pipeline: settings.clone(),
    };
    toml::to_string_pretty(&file).map_err(|e| SettingsError::invalid("settings", e.to_string()))
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
