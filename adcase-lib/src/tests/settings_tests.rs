use super::*;
use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn defaults_are_valid() {
    let settings = PipelineSettings::default();
    settings.validate().unwrap();
    assert_eq!(settings.concurrency, 8);
    assert_eq!(settings.save_every, 25);
    assert_eq!(settings.request_timeout(), Duration::from_secs(12));
    assert!(settings.resume);
}

#[test]
fn env_overrides_defaults() {
    let mut settings = PipelineSettings::default();
    settings
        .apply_env(env(&[
            ("CONCURRENCY", "12"),
            ("MAX_ITEMS", "500"),
            ("REQUEST_TIMEOUT_MS", "8000"),
            ("MIN_SCORE", "0.3"),
            ("RESUME", "0"),
            ("CHECKPOINT_EVERY", "40"),
            ("START_INDEX", "100"),
            ("START_YEAR", "2010"),
            ("END_YEAR", "2015"),
            ("GATHERERS", "direct,video"),
            ("CHECK_EXISTING", "false"),
        ]))
        .unwrap();
    assert_eq!(settings.concurrency, 12);
    assert_eq!(settings.max_items, Some(500));
    assert_eq!(settings.request_timeout_ms, 8000);
    assert_eq!(settings.min_score, 0.3);
    assert!(!settings.resume);
    assert_eq!(settings.save_every, 40);
    assert_eq!(settings.start_index, Some(100));
    assert_eq!(settings.start_year, Some(2010));
    assert_eq!(settings.end_year, Some(2015));
    assert_eq!(
        settings.gatherers,
        Some(vec![GathererKind::Direct, GathererKind::VideoSearch])
    );
    assert!(!settings.check_existing);
    settings.validate().unwrap();
}

#[test]
fn primary_names_win_over_aliases() {
    let mut settings = PipelineSettings::default();
    settings
        .apply_env(env(&[
            ("MAX_ITEMS", "5"),
            ("MAX_FIXES", "50"),
            ("SAVE_EVERY", "10"),
            ("CHECKPOINT_EVERY", "99"),
        ]))
        .unwrap();
    assert_eq!(settings.max_items, Some(5));
    assert_eq!(settings.save_every, 10);

    let mut settings = PipelineSettings::default();
    settings.apply_env(env(&[("MAX_FIXES", "50")])).unwrap();
    assert_eq!(settings.max_items, Some(50));
}

#[test]
fn empty_and_zero_values() {
    let mut settings = PipelineSettings::default();
    settings
        .apply_env(env(&[("CONCURRENCY", "  "), ("MAX_ITEMS", "0")]))
        .unwrap();
    assert_eq!(settings.concurrency, 8);
    assert_eq!(settings.max_items, None);
}

#[test]
fn invalid_env_values_are_errors() {
    for (name, value) in [
        ("CONCURRENCY", "many"),
        ("MIN_SCORE", "high"),
        ("MIN_SCORE", "NaN"),
        ("RESUME", "maybe"),
        ("GATHERERS", "direct,ftp"),
        ("START_YEAR", "20x0"),
    ] {
        let mut settings = PipelineSettings::default();
        let err = settings.apply_env(env(&[(name, value)])).unwrap_err();
        match err {
            SettingsError::InvalidEnv { name: n, .. } => assert_eq!(n, name),
            other => panic!("unexpected error for {}: {}", name, other),
        }
    }
}

#[test]
fn validate_rejects_unusable_combinations() {
    let mut s = PipelineSettings::default();
    s.concurrency = 0;
    assert!(s.validate().is_err());

    let mut s = PipelineSettings::default();
    s.start_year = Some(2020);
    s.end_year = Some(2010);
    assert!(s.validate().is_err());

    let mut s = PipelineSettings::default();
    s.gatherers = Some(vec![]);
    assert!(s.validate().is_err());
}

#[test]
fn pool_timeout_outlasts_long_record_timeouts() {
    let mut s = PipelineSettings::default();
    s.record_timeout_ms = 600_000;
    assert!(s.validate().is_ok());
    assert!(s.pool_item_timeout() > s.record_timeout());
    assert!(s.pool_item_timeout() > crate::worker_pool::SAFETY_TIMEOUT);

    s.record_timeout_ms = 50;
    assert_eq!(
        s.pool_item_timeout(),
        Duration::from_millis(50) + POOL_TIMEOUT_MARGIN
    );
}

#[test]
fn thresholds_fall_back_to_min_score() {
    let mut s = PipelineSettings::default();
    assert_eq!(s.threshold_for(CandidateSource::Video), 0.45);
    assert_eq!(s.threshold_for(CandidateSource::SourcePage), 0.45);
    assert!((s.threshold_for(CandidateSource::Web) - 0.5).abs() < 1e-9);

    s.min_video_score = Some(0.6);
    s.min_web_score = Some(0.7);
    assert_eq!(s.threshold_for(CandidateSource::Video), 0.6);
    assert_eq!(s.threshold_for(CandidateSource::Web), 0.7);
    assert_eq!(s.threshold_for(CandidateSource::Direct), 0.45);
}

#[test]
fn gatherers_default_per_mode() {
    let s = PipelineSettings::default();
    assert_eq!(s.gatherers_for(RepairMode::Link).len(), 4);
    assert!(
        !s.gatherers_for(RepairMode::Thumbnail)
            .contains(&GathererKind::WebSearch)
    );
}

#[test]
fn year_filter() {
    let mut s = PipelineSettings::default();
    assert!(s.year_in_range(None));
    assert!(s.year_in_range(Some(1999)));

    s.start_year = Some(2010);
    s.end_year = Some(2015);
    assert!(s.year_in_range(Some(2010)));
    assert!(s.year_in_range(Some(2015)));
    assert!(!s.year_in_range(Some(2009)));
    assert!(!s.year_in_range(Some(2016)));
    assert!(!s.year_in_range(None));
}

#[test]
fn settings_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("adcase").join("settings.toml");
    assert_eq!(load_settings_file(&path).unwrap(), PipelineSettings::default());

    let mut settings = PipelineSettings::default();
    settings.concurrency = 3;
    settings.min_web_score = Some(0.55);
    settings.gatherers = Some(vec![GathererKind::WebSearch, GathererKind::SourcePage]);
    save_settings_file(&path, &settings).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("[pipeline]"));
    assert!(text.contains("\"sourcepage\""));
    assert_eq!(load_settings_file(&path).unwrap(), settings);
}

#[test]
fn partial_settings_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "[pipeline]\nconcurrency = 2\ngatherers = [\"video\", \"web\"]\n").unwrap();
    let settings = load_settings_file(&path).unwrap();
    assert_eq!(settings.concurrency, 2);
    assert_eq!(settings.save_every, 25);
    assert_eq!(
        settings.gatherers,
        Some(vec![GathererKind::VideoSearch, GathererKind::WebSearch])
    );

    std::fs::write(&path, "[pipeline]\nconcurrency = \"two\"\n").unwrap();
    assert!(matches!(
        load_settings_file(&path).unwrap_err(),
        SettingsError::File { .. }
    ));
}
