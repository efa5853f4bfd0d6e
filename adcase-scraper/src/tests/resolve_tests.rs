use super::*;
use crate::testing::ScriptedHttp;
use adcase_core::{CandidateSource, GathererKind};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Hands back a fixed candidate list and counts how often it was asked.
struct FixedGatherer {
    candidates: Vec<Candidate>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Gatherer for FixedGatherer {
    fn kind(&self) -> GathererKind {
        GathererKind::VideoSearch
    }

    async fn gather(&self, _record: &CampaignRecord) -> Vec<Candidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.candidates.clone()
    }
}

fn partners() -> CampaignRecord {
    CampaignRecord::new("rec-1")
        .with_title("Partners")
        .with_brand("Extra Gum")
        .with_year(2015)
        .with_outbound_url("https://dead.example/x")
}

fn youtube(title: &str) -> Candidate {
    Candidate::new(
        "https://www.youtube.com/watch?v=abc12345678",
        title,
        CandidateSource::Video,
    )
    .unwrap()
}

fn live_youtube() -> Arc<ScriptedHttp> {
    Arc::new(
        ScriptedHttp::new()
            .status("https://www.youtube.com/watch?*", 200)
            .status("https://www.youtube.com/oembed?*", 200)
            .image("https://i.ytimg.com/*")
            .status("https://live.example/*", 200),
    )
}

fn resolver(
    mode: RepairMode,
    http: Arc<ScriptedHttp>,
    candidates: Vec<Candidate>,
    settings: PipelineSettings,
) -> (Resolver, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let gatherer = FixedGatherer {
        candidates,
        calls: calls.clone(),
    };
    let validator = Validator::new(http, HostPolicy::default(), settings.lookahead);
    (
        Resolver::new(mode, vec![Box::new(gatherer)], validator, settings),
        calls,
    )
}

#[tokio::test]
async fn dead_link_is_replaced_by_matching_video() {
    let (resolver, _) = resolver(
        RepairMode::Link,
        live_youtube(),
        vec![youtube("Extra Gum 'Partners' 2015 commercial")],
        PipelineSettings::default(),
    );
    let res = resolver.resolve(partners()).await;

    assert_eq!(res.outcome, Outcome::Replaced);
    assert_eq!(res.record.outbound_url, "https://www.youtube.com/watch?v=abc12345678");
    assert_eq!(
        res.record.thumbnail_url,
        "https://i.ytimg.com/vi/abc12345678/hqdefault.jpg"
    );
    let change = res.change.unwrap();
    assert_eq!(change.field, "outboundUrl");
    assert_eq!(change.old_url, "https://dead.example/x");
    assert!(change.score >= 0.6, "score {}", change.score);
}

#[tokio::test]
async fn compilation_scores_too_low() {
    let original = partners();
    let (resolver, _) = resolver(
        RepairMode::Link,
        live_youtube(),
        vec![youtube("Top 10 Funniest Super Bowl Fails Compilation 2015")],
        PipelineSettings::default(),
    );
    let res = resolver.resolve(original.clone()).await;
    assert_eq!(res.outcome, Outcome::LowScore);
    assert_eq!(res.record, original);
    assert!(res.change.is_none());
    assert!(res.detail.starts_with("best "));
}

#[tokio::test]
async fn live_link_is_skipped_without_gathering() {
    let (resolver, calls) = resolver(
        RepairMode::Link,
        live_youtube(),
        vec![youtube("Extra Gum Partners")],
        PipelineSettings::default(),
    );
    let record = partners().with_outbound_url("https://live.example/partners");
    let res = resolver.resolve(record).await;
    assert_eq!(res.outcome, Outcome::Skipped);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unchecked_links_are_trusted() {
    let http = Arc::new(ScriptedHttp::new());
    let mut settings = PipelineSettings::default();
    settings.check_existing = false;
    let (resolver, calls) = resolver(RepairMode::Link, http.clone(), vec![], settings);

    let res = resolver.resolve(partners()).await;
    assert_eq!(res.outcome, Outcome::Skipped);
    assert_eq!(http.call_count(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // A search wrapper is never trusted
    let wrapped = partners().with_outbound_url("https://www.bing.com/search?q=extra+gum");
    let res = resolver.resolve(wrapped).await;
    assert_eq!(res.outcome, Outcome::NoCandidates);
}

#[tokio::test]
async fn year_filter_skips_early() {
    let http = Arc::new(ScriptedHttp::new());
    let mut settings = PipelineSettings::default();
    settings.start_year = Some(2016);
    let (resolver, _) = resolver(RepairMode::Link, http.clone(), vec![], settings);
    let res = resolver.resolve(partners()).await;
    assert_eq!(res.outcome, Outcome::Skipped);
    assert_eq!(res.detail, "outside year range");
    assert_eq!(http.call_count(), 0);
}

#[tokio::test]
async fn nothing_found_is_no_candidates() {
    let (resolver, calls) = resolver(
        RepairMode::Link,
        Arc::new(ScriptedHttp::new()),
        vec![],
        PipelineSettings::default(),
    );
    let res = resolver.resolve(partners()).await;
    assert_eq!(res.outcome, Outcome::NoCandidates);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_validation_leaves_record_alone() {
    // The watch page is live but oEmbed says the video is gone
    let http = Arc::new(ScriptedHttp::new().status("https://www.youtube.com/watch?*", 200));
    let (resolver, _) = resolver(
        RepairMode::Link,
        http,
        vec![youtube("Extra Gum 'Partners' 2015")],
        PipelineSettings::default(),
    );
    let original = partners();
    let res = resolver.resolve(original.clone()).await;
    assert_eq!(res.outcome, Outcome::Unavailable);
    assert_eq!(res.record, original);
    assert!(res.detail.contains("video unavailable"));
}

#[tokio::test]
async fn thumbnail_mode_only_touches_thumbnail() {
    let record = partners().with_thumbnail_url("https://cdn.example.com/placeholder.png");
    let (resolver, _) = resolver(
        RepairMode::Thumbnail,
        live_youtube(),
        vec![youtube("Extra Gum 'Partners' 2015")],
        PipelineSettings::default(),
    );
    let res = resolver.resolve(record).await;
    assert_eq!(res.outcome, Outcome::Replaced);
    assert_eq!(res.record.outbound_url, "https://dead.example/x");
    assert_eq!(
        res.record.thumbnail_url,
        "https://i.ytimg.com/vi/abc12345678/hqdefault.jpg"
    );
    assert_eq!(res.change.unwrap().field, "thumbnailUrl");
}

#[tokio::test]
async fn current_value_and_duplicates_are_not_candidates() {
    let (resolver, _) = resolver(
        RepairMode::Link,
        live_youtube(),
        vec![
            Candidate::new("https://dead.example/x", "Extra Gum Partners", CandidateSource::Web)
                .unwrap(),
            youtube("Extra Gum Partners"),
            youtube("Extra Gum Partners again"),
        ],
        PipelineSettings::default(),
    );
    let found = resolver.gather(&partners()).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].url, "https://www.youtube.com/watch?v=abc12345678");
}
