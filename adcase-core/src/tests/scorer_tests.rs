use super::*;
use crate::platform::VideoRef;

fn extra_gum() -> CampaignRecord {
    CampaignRecord::new("extra-partners")
        .with_title("Partners")
        .with_brand("Extra Gum")
        .with_year(2015)
        .with_outbound_url("https://dead.example/x")
}

const YT_URL: &str = "https://www.youtube.com/watch?v=abc12345678";

#[test]
fn full_identity_match_scores_high() {
    let s = score(&extra_gum(), "Extra Gum 'Partners' 2015 commercial", YT_URL);
    assert!(s.total >= 0.6, "expected >= 0.6, got {}", s);
    assert_eq!(s.overlap, 1.0);
    assert_eq!(s.host_bonus, VIDEO_HOST_BONUS);
    assert_eq!(s.year_bonus, YEAR_BONUS);
    assert_eq!(s.brand_bonus, BRAND_BONUS);
    assert_eq!(s.title_bonus, TITLE_BONUS);
    assert_eq!(s.penalty, 0.0);
}

#[test]
fn garbage_compilation_falls_below_threshold() {
    let s = score(
        &extra_gum(),
        "Top 10 Funniest Super Bowl Fails Compilation 2015",
        YT_URL,
    );
    assert!(s.penalty > 0.0);
    assert!(s.total < 0.45, "expected < 0.45, got {}", s);
}

#[test]
fn empty_token_sets_score_zero() {
    let record = extra_gum();
    assert_eq!(score(&record, "", YT_URL), ScoreBreakdown::default());
    assert_eq!(score(&record, "the official commercial", YT_URL).total, 0.0);

    let blank = CampaignRecord::new("blank");
    assert_eq!(score(&blank, "Extra Gum Partners", YT_URL).total, 0.0);
}

#[test]
fn scores_are_finite_and_bounded() {
    let records = [
        extra_gum(),
        CampaignRecord::new("empty"),
        CampaignRecord::new("short").with_title("Go"),
        CampaignRecord::new("reaction-brand")
            .with_title("Reaction Compilation Review Top 10 Ranking")
            .with_brand("Live Stream Parody"),
    ];
    let long_text = "word ".repeat(500);
    let texts: [&str; 6] = [
        "",
        "Extra Gum Partners 2015",
        "reaction reaction compilation ranking explained live stream parody review top 10",
        "Top 10 Funniest Super Bowl Fails Compilation 2015",
        long_text.as_str(),
        "\u{0}\u{ffff}",
    ];
    let urls = [YT_URL, "", "garbage", "https://adsoftheworld.com/campaigns/x"];
    for record in &records {
        for text in texts {
            for url in urls {
                let s = score(record, text, url);
                assert!(s.total.is_finite(), "non-finite score for {:?}", text);
                assert!((MIN_TOTAL..=MAX_TOTAL).contains(&s.total));
            }
        }
    }
}

#[test]
fn adding_brand_never_decreases_score() {
    let records = [
        extra_gum(),
        CampaignRecord::new("r2").with_title("Extra Gum Partners").with_brand("Extra Gum"),
        CampaignRecord::new("r3").with_title("The Reaction").with_brand("Reaction Labs"),
        CampaignRecord::new("r4").with_title("Dumb Ways to Die").with_brand("Metro Trains"),
    ];
    let texts = [
        "",
        "Partners",
        "Extra Gum",
        "Partners 2015",
        "gum ad partners reaction",
        "Top 10 compilation",
        "Dumb Ways to Die",
        "Metro",
        "something unrelated entirely",
    ];
    for record in &records {
        for text in texts {
            let base = score(record, text, YT_URL).total;
            for with_brand in [
                format!("{} {}", text, record.brand),
                format!("{} {}", record.brand, text),
            ] {
                let boosted = score(record, &with_brand, YT_URL).total;
                assert!(
                    boosted >= base,
                    "brand decreased score for {:?} / {:?}: {} -> {}",
                    record.id,
                    with_brand,
                    base,
                    boosted
                );
            }
        }
    }
}

#[test]
fn garbage_words_in_identity_are_not_penalized() {
    let record = CampaignRecord::new("r")
        .with_title("Reaction")
        .with_brand("Acme");
    let s = score(&record, "Acme Reaction", "https://example.com/x");
    assert_eq!(s.penalty, 0.0);
}

#[test]
fn overlap_denominator_has_floor_and_cap() {
    // One wanted token out of a floor of four
    let short = CampaignRecord::new("s").with_title("Partners");
    let s = score(&short, "Partners", "https://example.com/");
    assert_eq!(s.overlap, 0.25);

    // Twenty distinct wanted tokens, capped denominator of sixteen
    let long_title: Vec<String> = (0..20).map(|i| format!("word{:02}", i)).collect();
    let long = CampaignRecord::new("l").with_title(long_title.join(" "));
    let s = score(&long, &long_title[..8].join(" "), "https://example.com/");
    assert_eq!(s.overlap, 0.5);
}

#[test]
fn case_study_hosts_get_smaller_bonus() {
    let record = extra_gum();
    let text = "Extra Gum Partners";
    let yt = score(&record, text, YT_URL);
    let site = score(&record, text, "https://www.adsoftheworld.com/campaigns/partners");
    let other = score(&record, text, "https://blog.example.com/partners");
    assert_eq!(site.host_bonus, CASE_STUDY_HOST_BONUS);
    assert_eq!(other.host_bonus, 0.0);
    assert!(yt.total > site.total && site.total > other.total);
}

#[test]
fn host_rank_orders_platforms_then_case_study_sites() {
    assert_eq!(host_rank("youtube.com"), 0);
    assert_eq!(host_rank("vimeo.com"), 1);
    assert_eq!(host_rank("adsoftheworld.com"), 2);
    assert!(host_rank("behance.net") < host_rank("example.com"));
    assert!(is_preferred_host("youtu.be"));
    assert!(!is_preferred_host("example.com"));
}

#[test]
fn ranking_sorts_by_score_then_host_then_order() {
    let record = extra_gum();
    let candidates = vec![
        Candidate::new("https://blog.example.com/a", "Extra Gum Partners", CandidateSource::Web)
            .unwrap(),
        Candidate::new("https://vimeo.com/123456789", "Extra Gum Partners", CandidateSource::Web)
            .unwrap(),
        Candidate::new("https://blog.example.com/b", "unrelated", CandidateSource::Web).unwrap(),
        Candidate::new("https://blog.example.com/c", "Extra Gum Partners", CandidateSource::Web)
            .unwrap(),
    ];
    let ranked = rank_candidates(&record, candidates);
    let urls: Vec<&str> = ranked.iter().map(|c| c.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://vimeo.com/123456789",
            "https://blog.example.com/a",
            "https://blog.example.com/c",
            "https://blog.example.com/b",
        ]
    );
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn equal_scores_prefer_better_host() {
    let record = extra_gum();
    // Same text, and both video hosts get the same bonus
    let vimeo = Candidate::from_video(
        VideoRef::new(crate::platform::VideoPlatform::Vimeo, "123456789").unwrap(),
        "Extra Gum Partners",
        CandidateSource::Video,
    );
    let youtube = Candidate::from_video(
        VideoRef::new(crate::platform::VideoPlatform::YouTube, "abc12345678").unwrap(),
        "Extra Gum Partners",
        CandidateSource::Video,
    );
    let ranked = rank_candidates(&record, vec![vimeo, youtube]);
    assert_eq!(ranked[0].host, "youtube.com");
    assert_eq!(ranked[0].score, ranked[1].score);
}

#[test]
fn direct_candidates_get_confidence_floor() {
    let record = extra_gum();
    let direct = Candidate::from_video(
        VideoRef::new(crate::platform::VideoPlatform::YouTube, "abc12345678").unwrap(),
        "",
        CandidateSource::Direct,
    );
    let ranked = rank_candidates(&record, vec![direct]);
    assert_eq!(ranked[0].score, DIRECT_SCORE_FLOOR);
}
