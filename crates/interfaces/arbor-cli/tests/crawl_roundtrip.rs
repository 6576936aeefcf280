use arbor_cli::commands;
use camino::Utf8PathBuf;

const SNAPSHOT: &str = r#"{
    "linkPrefix": "https://bi.example.com/open?path=",
    "entries": [
        { "type": "leaf", "name": "overview", "kind": "Dashboard" },
        {
            "type": "folder",
            "name": "Finance",
            "entries": [
                { "type": "leaf", "name": "forecast", "kind": "Report" },
                { "type": "folder", "name": "Archive", "entries": [] }
            ]
        }
    ]
}"#;

#[tokio::test(flavor = "multi_thread")]
async fn crawl_writes_an_export_document() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = Utf8PathBuf::from_path_buf(dir.path().join("tree.json")).unwrap();
    let output = Utf8PathBuf::from_path_buf(dir.path().join("export.json")).unwrap();
    std::fs::write(&snapshot, SNAPSHOT).unwrap();

    commands::cmd_crawl(snapshot, output.clone(), None)
        .await
        .unwrap();

    let raw = std::fs::read_to_string(&output).unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entries = document["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["name"], "overview");
    assert_eq!(entries[0]["path"], "/");
    assert_eq!(
        entries[1]["link"],
        "https://bi.example.com/open?path=Finance/forecast"
    );
    assert_eq!(entries[2]["kind"], "Empty Folder");
    assert_eq!(entries[2]["path"], "/Finance/");
}

#[tokio::test(flavor = "multi_thread")]
async fn crawl_starting_inside_a_subfolder() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = Utf8PathBuf::from_path_buf(dir.path().join("tree.json")).unwrap();
    let output = Utf8PathBuf::from_path_buf(dir.path().join("export.json")).unwrap();
    std::fs::write(&snapshot, SNAPSHOT).unwrap();

    commands::cmd_crawl(snapshot, output.clone(), Some("/Finance".to_string()))
        .await
        .unwrap();

    let raw = std::fs::read_to_string(&output).unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entries = document["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["name"], "forecast");
    assert_eq!(entries[0]["path"], "/Finance/");
}

#[tokio::test(flavor = "multi_thread")]
async fn crawl_of_a_missing_start_folder_reports_the_failure() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = Utf8PathBuf::from_path_buf(dir.path().join("tree.json")).unwrap();
    let output = Utf8PathBuf::from_path_buf(dir.path().join("export.json")).unwrap();
    std::fs::write(&snapshot, SNAPSHOT).unwrap();

    let err = commands::cmd_crawl(snapshot, output, Some("/Nope".to_string()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Crawl failed"));
}
