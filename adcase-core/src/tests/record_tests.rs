use super::*;

#[test]
fn deserializes_camel_case_with_defaults() {
    let json = r#"{"id": "c-1", "title": "Partners", "outboundUrl": "https://dead.example/x"}"#;
    let record: CampaignRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.id, "c-1");
    assert_eq!(record.title, "Partners");
    assert_eq!(record.outbound_url, "https://dead.example/x");
    assert_eq!(record.brand, "");
    assert_eq!(record.year, None);
    assert!(record.topics.is_empty());
    assert!(record.extra.is_empty());
}

#[test]
fn unknown_fields_survive_round_trip() {
    let json = r#"{
        "id": "c-2",
        "title": "Partners",
        "year": 2015,
        "awardTier": "Gold",
        "views": 1200,
        "credits": {"director": "Someone"}
    }"#;
    let record: CampaignRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.year, Some(2015));
    assert_eq!(record.award_tier, "Gold");
    assert_eq!(record.extra.len(), 2);

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["views"], 1200);
    assert_eq!(value["credits"]["director"], "Someone");
    assert_eq!(value["awardTier"], "Gold");
    assert_eq!(value["year"], 2015);

    let again: CampaignRecord = serde_json::from_value(value).unwrap();
    assert_eq!(again, record);
}

#[test]
fn absent_optional_fields_are_not_written() {
    let record = CampaignRecord::new("c-3").with_title("Partners");
    let value = serde_json::to_value(&record).unwrap();
    let obj = value.as_object().unwrap();
    assert!(!obj.contains_key("year"));
    assert!(!obj.contains_key("awardTier"));
    assert!(!obj.contains_key("formatHints"));
    // The repair fields are always present so consumers can rely on them
    assert_eq!(obj["outboundUrl"], "");
    assert_eq!(obj["thumbnailUrl"], "");
}

#[test]
fn rewrite_keeps_the_input_shape() {
    let json = r#"{"id":"c-4","outboundUrl":"https://vimeo.com/123456","sourceUrl":"","thumbnailUrl":""}"#;
    let record: CampaignRecord = serde_json::from_str(json).unwrap();
    let value = serde_json::to_value(&record).unwrap();
    let keys: Vec<&str> = value
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["id", "outboundUrl", "sourceUrl", "thumbnailUrl"]);
}

#[test]
fn identity_text_skips_empty_parts() {
    let record = CampaignRecord::new("c-4")
        .with_title("Partners")
        .with_brand("Extra Gum")
        .with_year(2015);
    assert_eq!(record.identity_text(), "Partners Extra Gum 2015");

    let with_agency = record.clone().with_agency("Energy BBDO");
    assert_eq!(with_agency.identity_text(), "Partners Extra Gum Energy BBDO 2015");
    assert_eq!(with_agency.search_query(), "Extra Gum Partners 2015");

    assert_eq!(CampaignRecord::new("c-5").identity_text(), "");
}

#[test]
fn topics_are_case_insensitive_sets() {
    let mut record = CampaignRecord::new("c-6");
    assert!(record.add_topic("Humor"));
    assert!(!record.add_topic("humor"));
    assert!(!record.add_topic("  "));
    assert!(record.has_topic("HUMOR"));
    assert_eq!(record.topics, vec!["Humor"]);
}

#[test]
fn dedupe_keeps_first_spelling() {
    let mut record = CampaignRecord::new("c-7");
    record.topics = vec![
        "Humor".into(),
        "Film".into(),
        "humor".into(),
        "".into(),
        "FILM ".into(),
    ];
    record.format_hints = vec!["Video".into(), "video".into()];
    assert_eq!(record.dedupe_tags(), 4);
    assert_eq!(record.topics, vec!["Humor", "Film"]);
    assert_eq!(record.format_hints, vec!["Video"]);
    assert_eq!(record.dedupe_tags(), 0);
}
