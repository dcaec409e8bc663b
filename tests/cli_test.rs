mod common;

use assert_cmd::Command;
use predicates::prelude::*;

use common::{sample_feed, serve_once};

fn cmd() -> Command {
    Command::new(assert_cmd::cargo_bin!("flickr"))
}

fn state_file(dir: &tempfile::TempDir) -> String {
    dir.path().join("last_query").to_string_lossy().into_owned()
}

#[test]
fn top_level_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Search Flickr's public photo feed from the terminal",
        ))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("saved"))
        .stdout(predicate::str::contains("mcp"))
        .stdout(predicate::str::contains("Examples:"))
        .stdout(predicate::str::contains("flickr search cats"));
}

#[test]
fn top_level_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("flickr 0.3.0"));
}

#[test]
fn search_help_shows_options() {
    cmd()
        .args(["search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[TAG]..."))
        .stdout(predicate::str::contains("--any"))
        .stdout(predicate::str::contains("--lang <CODE>"))
        .stdout(predicate::str::contains("--base-url <URL>"))
        .stdout(predicate::str::contains("--top <N>"))
        .stdout(predicate::str::contains("--compact"))
        .stdout(predicate::str::contains("--json"))
        .stdout(predicate::str::contains("--pretty"))
        .stdout(predicate::str::contains("--detail <N>"))
        .stdout(predicate::str::contains("--open <N>"))
        .stdout(predicate::str::contains("--url"))
        .stdout(predicate::str::contains("--blocking"))
        .stdout(predicate::str::contains("--no-save"))
        .stdout(predicate::str::contains("--proxy <URL>"))
        .stdout(predicate::str::contains("--timeout <SECS>"))
        .stdout(predicate::str::contains("[default: en-us]"))
        .stdout(predicate::str::contains("[default: 30]"))
        .stdout(predicate::str::contains("Any tag:"));
}

#[test]
fn url_prints_feed_url() {
    cmd()
        .args(["search", "cats", "--url"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "tags=cats&tagmode=ALL&lang=en-us&format=json&nojsoncallback=1",
        ));
}

#[test]
fn url_joins_tags_and_match_any() {
    cmd()
        .args(["search", "cats", "dogs", "--any", "--lang", "de-de", "--url"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "tags=cats%2Cdogs&tagmode=ANY&lang=de-de",
        ));
}

#[test]
fn no_tags_and_no_saved_search_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["--state-file", &state_file(&dir), "search"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no tags given and no saved search"));
}

#[test]
fn no_tags_uses_saved_search() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("last_query"), "harbour").unwrap();
    cmd()
        .args(["--state-file", &state_file(&dir), "search", "--url"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tags=harbour&tagmode=ALL"));
}

#[test]
fn non_http_base_url_is_not_configured() {
    cmd()
        .args(["search", "cats", "--base-url", "ftp://example.com/feed", "--json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"invalid_url\""))
        .stdout(predicate::str::contains("NOT_CONFIGURED"));
}

#[test]
fn unreachable_feed_fails_with_network_code() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args([
            "--state-file",
            &state_file(&dir),
            "search",
            "cats",
            "--base-url",
            "http://127.0.0.1:9/feed",
            "--timeout",
            "5",
            "--json",
        ])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("FAILED_OR_EMPTY"));
    assert!(!dir.path().join("last_query").exists());
}

#[test]
fn search_prints_json_and_saves_query() {
    let dir = tempfile::tempdir().unwrap();
    let base_url = serve_once("200 OK", &sample_feed());
    cmd()
        .args([
            "--state-file",
            &state_file(&dir),
            "search",
            "cats",
            "--base-url",
            &base_url,
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\":\"OK\""))
        .stdout(predicate::str::contains("Sleepy cat"))
        .stdout(predicate::str::contains("1_aaa_b.jpg"));

    let saved = std::fs::read_to_string(dir.path().join("last_query")).unwrap();
    assert_eq!(saved, "cats");
}

#[test]
fn search_blocking_compact_top() {
    let dir = tempfile::tempdir().unwrap();
    let base_url = serve_once("200 OK", &sample_feed());
    let output = cmd()
        .args([
            "--state-file",
            &state_file(&dir),
            "search",
            "cats",
            "--base-url",
            &base_url,
            "--blocking",
            "--compact",
            "--top",
            "2",
            "--no-save",
        ])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("1 | Sleepy cat | 111@N01 |"));
    assert!(lines[1].starts_with("2 | Garden cat |"));
    assert!(!dir.path().join("last_query").exists());
}

#[test]
fn search_detail_view() {
    let dir = tempfile::tempdir().unwrap();
    let base_url = serve_once("200 OK", &sample_feed());
    cmd()
        .args([
            "--state-file",
            &state_file(&dir),
            "search",
            "cats",
            "--base-url",
            &base_url,
            "--detail",
            "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Garden cat"))
        .stdout(predicate::str::contains("cat, garden, summer"))
        .stdout(predicate::str::contains("2_bbb_b.jpg"));
}

#[test]
fn search_detail_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let base_url = serve_once("200 OK", &sample_feed());
    cmd()
        .args([
            "--state-file",
            &state_file(&dir),
            "search",
            "cats",
            "--base-url",
            &base_url,
            "--detail",
            "9",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn malformed_feed_exits_with_parse_code() {
    let dir = tempfile::tempdir().unwrap();
    let base_url = serve_once("200 OK", "{\"items\": [{\"title\": 1}]}");
    cmd()
        .args([
            "--state-file",
            &state_file(&dir),
            "search",
            "cats",
            "--base-url",
            &base_url,
        ])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("feed item 0 is malformed"));
}

#[test]
fn saved_shows_and_clears() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_file(&dir);

    cmd()
        .args(["--state-file", &state, "saved"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved search."));

    std::fs::write(&state, "cats,kittens").unwrap();
    cmd()
        .args(["--state-file", &state, "saved"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cats,kittens"));

    cmd()
        .args(["--state-file", &state, "saved", "--clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved search cleared."));
    assert!(!dir.path().join("last_query").exists());
}
