//! CLI command integration tests.
//! Each test writes its configuration into a temp directory passed via TABVIEW_CONFIG_DIR.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TABS: &str = r#"[
    {
        "slug": "geo",
        "label": "Geography",
        "content": {
            "primarySelect": "region/country",
            "secondarySelect": ["year", ["sex", "age"]],
            "dataSource": "census"
        }
    },
    {
        "slug": "time",
        "label": "Time series",
        "content": { "primarySelect": null, "secondarySelect": ["year"] }
    }
]"#;

const SOURCES: &str = r#"[
    { "id": "census", "label": "Census 2021" },
    { "id": "survey" }
]"#;

fn config_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("data-tabs.json"), TABS).unwrap();
    std::fs::write(dir.path().join("data-sources.json"), SOURCES).unwrap();
    dir
}

fn tabview_cmd(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("tabview").unwrap();
    cmd.env("TABVIEW_CONFIG_DIR", dir.path());
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn tabs_lists_slugs_and_labels() {
    let dir = config_dir();
    tabview_cmd(&dir)
        .arg("tabs")
        .assert()
        .success()
        .stdout(predicate::str::contains("geo\tGeography"))
        .stdout(predicate::str::contains("time\tTime series"));
}

#[test]
fn show_prints_normalized_content() {
    let dir = config_dir();
    let output = tabview_cmd(&dir).args(["show", "geo"]).output().unwrap();
    let json = stdout_json(&output);

    assert_eq!(json["primarySelect"], serde_json::json!([["region", "country"]]));
    assert_eq!(
        json["secondarySelect"],
        serde_json::json!([["year"], ["sex", "age"]])
    );
    assert_eq!(json["dataSource"], "census");
}

#[test]
fn show_null_primary_is_empty() {
    let dir = config_dir();
    let output = tabview_cmd(&dir).args(["show", "time"]).output().unwrap();
    let json = stdout_json(&output);
    assert_eq!(json["primarySelect"], serde_json::json!([]));
}

#[test]
fn show_missing_tab_fails() {
    let dir = config_dir();
    tabview_cmd(&dir)
        .args(["show", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tab 'missing' not found"));
}

#[test]
fn show_skips_malformed_sibling_tab() {
    let dir = config_dir();
    let tabs = r#"[
        { "slug": "geo", "label": "Geography", "content": { "primarySelect": "region" } },
        { "slug": "bad", "label": "Bad", "content": { "secondarySelect": [null] } }
    ]"#;
    std::fs::write(dir.path().join("data-tabs.json"), tabs).unwrap();

    let output = tabview_cmd(&dir).args(["show", "geo"]).output().unwrap();
    assert_eq!(stdout_json(&output)["primarySelect"], serde_json::json!([["region"]]));

    tabview_cmd(&dir)
        .args(["show", "bad"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid dimension path"));
}

#[test]
fn show_uses_default_tab() {
    let dir = config_dir();
    std::fs::write(dir.path().join("tabview.toml"), "default_tab = \"time\"\n").unwrap();
    let output = tabview_cmd(&dir).arg("show").output().unwrap();
    let json = stdout_json(&output);
    assert_eq!(json["secondarySelect"], serde_json::json!([["year"]]));
}

#[test]
fn show_without_slug_or_default_fails() {
    let dir = config_dir();
    tabview_cmd(&dir)
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no default_tab configured"));
}

#[test]
fn config_dir_flag_overrides_env() {
    let dir = config_dir();
    let empty = TempDir::new().unwrap();
    tabview_cmd(&empty)
        .arg("--config-dir")
        .arg(dir.path())
        .arg("tabs")
        .assert()
        .success()
        .stdout(predicate::str::contains("geo"));
}

#[test]
fn missing_config_files_fail() {
    let empty = TempDir::new().unwrap();
    tabview_cmd(&empty)
        .arg("tabs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("data-tabs.json"));
}

#[test]
fn sources_lists_ids() {
    let dir = config_dir();
    tabview_cmd(&dir)
        .arg("sources")
        .assert()
        .success()
        .stdout(predicate::str::contains("census\tCensus 2021"))
        .stdout(predicate::str::contains("survey\tsurvey"));
}

#[test]
fn filter_toggle() {
    let dir = config_dir();
    let output = tabview_cmd(&dir)
        .args(["filter", "toggle", "--selected", "a,b", "--key", "c"])
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output), serde_json::json!(["a", "b", "c"]));

    let output = tabview_cmd(&dir)
        .args(["filter", "toggle", "--selected", "a,b", "--key", "a"])
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output), serde_json::json!(["b"]));
}

#[test]
fn filter_toggle_requires_key() {
    let dir = config_dir();
    tabview_cmd(&dir)
        .args(["filter", "toggle", "--selected", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--key is required"));
}

#[test]
fn filter_only_keeps_foreign_selection() {
    let dir = config_dir();
    let output = tabview_cmd(&dir)
        .args([
            "filter",
            "only",
            "--selected",
            "fr,de,2020",
            "--allowed",
            "fr,de,it",
            "--key",
            "it",
        ])
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output), serde_json::json!(["2020", "it"]));
}

#[test]
fn filter_all_and_none() {
    let dir = config_dir();
    let output = tabview_cmd(&dir)
        .args(["filter", "all", "--selected", "x", "--allowed", "a,b"])
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output), serde_json::json!(["x", "a", "b"]));

    let output = tabview_cmd(&dir)
        .args(["filter", "none", "--selected", "x,a", "--allowed", "a,b"])
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output), serde_json::json!(["x"]));
}

#[test]
fn filter_empty_list_has_no_keys() {
    let dir = config_dir();
    let output = tabview_cmd(&dir)
        .args(["filter", "all", "--selected", "", "--allowed", "a"])
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output), serde_json::json!(["a"]));

    let output = tabview_cmd(&dir)
        .args(["filter", "view", "--values", "a", "--allowed", "", "--selected", ""])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    assert_eq!(json["tally"], serde_json::json!({ "selected": 0, "allowed": 0 }));
}

#[test]
fn filter_sort_partitions() {
    let dir = config_dir();
    let output = tabview_cmd(&dir)
        .args(["filter", "sort", "--values", "a,b,c,d", "--allowed", "b,d"])
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output), serde_json::json!(["b", "d", "a", "c"]));

    let output = tabview_cmd(&dir)
        .args([
            "filter", "sort", "--values", "a,b,c,d", "--allowed", "b,d", "--disabled",
        ])
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output), serde_json::json!(["a", "b", "c", "d"]));
}

#[test]
fn filter_view_reports_tally() {
    let dir = config_dir();
    let output = tabview_cmd(&dir)
        .args([
            "filter",
            "view",
            "--values",
            "a,b,c",
            "--allowed",
            "b,c",
            "--shown",
            "c",
            "--selected",
            "b,z",
        ])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    assert_eq!(json["tally"], serde_json::json!({ "selected": 1, "allowed": 2 }));
    let order: Vec<&str> = json["options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["value"].as_str().unwrap())
        .collect();
    assert_eq!(order, ["b", "c", "a"]);
    assert_eq!(json["options"][0]["checked"], true);
    assert_eq!(json["options"][1]["highlighted"], true);
    assert_eq!(json["options"][2]["enabled"], false);
}
