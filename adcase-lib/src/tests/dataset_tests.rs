use super::*;
use std::path::Path;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn load_reads_records_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "campaigns.json",
        r#"[{"id":"a","title":"One"},{"id":"b","title":"Two","year":2019}]"#,
    );
    let records = load_dataset(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "a");
    assert_eq!(records[1].year, Some(2019));
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_dataset(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, DatasetError::NotFound(_)));
}

#[test]
fn corrupt_json_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "campaigns.json", r#"[{"id":"a"},"#);
    assert!(matches!(
        load_dataset(&path).unwrap_err(),
        DatasetError::Parse { .. }
    ));

    let path = write(dir.path(), "object.json", r#"{"id":"a"}"#);
    assert!(matches!(
        load_dataset(&path).unwrap_err(),
        DatasetError::Parse { .. }
    ));
}

#[test]
fn duplicate_ids_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "campaigns.json",
        r#"[{"id":"a"},{"id":"b"},{"id":"a"}]"#,
    );
    match load_dataset(&path).unwrap_err() {
        DatasetError::DuplicateId { id, index, .. } => {
            assert_eq!(id, "a");
            assert_eq!(index, 2);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn save_is_pretty_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "campaigns.json",
        r#"[{"id":"a","title":"One","custom":{"k":[1,2]}},{"id":"b"}]"#,
    );
    let mut records = load_dataset(&path).unwrap();
    records[1].outbound_url = "https://vimeo.com/123456789".into();
    save_dataset(&path, &records).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("[\n  {\n    \"id\": \"a\""));
    assert!(text.ends_with("]\n"));
    assert!(!dir.path().join("campaigns.json.tmp").exists());

    let reloaded = load_dataset(&path).unwrap();
    assert_eq!(reloaded, records);
    assert_eq!(reloaded[0].extra["custom"]["k"][1], 2);
}

#[test]
fn artifact_paths_sit_beside_dataset() {
    let paths = ArtifactPaths::for_dataset(Path::new("/data/campaigns.json"), RepairMode::Link);
    assert_eq!(paths.progress, Path::new("/data/campaigns.link.progress.json"));
    assert_eq!(paths.report, Path::new("/data/campaigns.link.report.json"));
    assert_eq!(paths.log, Path::new("/data/campaigns.link.log"));

    let paths = ArtifactPaths::for_dataset(Path::new("campaigns.json"), RepairMode::Thumbnail);
    assert_eq!(paths.progress, Path::new("campaigns.thumbnail.progress.json"));
}
