//! Integration tests for oszx-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use oszx_core::test_utils::write_bundle;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn oszx_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("oszx");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// One wrapped beatmap, one skin (not a beatmap) and one corrupt file.
fn songs_fixture(dir: &Path) {
    write_bundle(
        dir,
        "1 Artist - Title.osz",
        &[
            ("1 Artist - Title/", b""),
            ("1 Artist - Title/Artist - Title (Mapper) [Hard].osu", b"osu file format v14"),
            ("1 Artist - Title/audio.mp3", b"ID3"),
        ],
    );
    write_bundle(dir, "skin.osz", &[("skin.ini", b"[General]")]);
    fs::write(dir.join("broken.osz"), b"not a zip").unwrap();
}

#[test]
fn test_version_flag() {
    oszx_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("oszx"));
}

#[test]
fn test_help_flag() {
    oszx_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_extract_help() {
    oszx_cmd()
        .arg("extract")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Extract every beatmap bundle"))
        .stdout(predicate::str::contains("--strict"));
}

#[test]
fn test_extract_reports_every_bundle() {
    let temp = TempDir::new().expect("failed to create temp dir");
    songs_fixture(temp.path());

    oszx_cmd()
        .arg("extract")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("extracted"))
        .stdout(predicate::str::contains("1 Artist - Title.osz"))
        .stdout(predicate::str::contains("skipped"))
        .stdout(predicate::str::contains("skin.osz"))
        .stdout(predicate::str::contains("failed"))
        .stdout(predicate::str::contains("broken.osz"))
        .stdout(predicate::str::contains("1 extracted, 1 skipped, 1 failed"));

    let song = temp.path().join("1 Artist - Title");
    assert_eq!(
        fs::read(song.join("Artist - Title (Mapper) [Hard].osu")).unwrap(),
        b"osu file format v14"
    );
    assert!(song.join("audio.mp3").is_file());
    assert!(!temp.path().join("skin").exists());
}

#[test]
fn test_extract_default_source_dir_is_songs() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let songs = temp.path().join("songs");
    fs::create_dir(&songs).unwrap();
    write_bundle(&songs, "a.osz", &[("a.osu", b"v14")]);

    oszx_cmd()
        .current_dir(temp.path())
        .arg("extract")
        .assert()
        .success();

    assert!(songs.join("a").join("a.osu").is_file());
}

#[test]
fn test_extract_output_option() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let output = temp.path().join("library");
    songs_fixture(temp.path());

    oszx_cmd()
        .arg("extract")
        .arg(temp.path())
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    assert!(output.join("1 Artist - Title").join("audio.mp3").is_file());
    assert!(!temp.path().join("1 Artist - Title").exists());
}

#[test]
fn test_extract_strict_fails_on_bad_bundle() {
    let temp = TempDir::new().expect("failed to create temp dir");
    songs_fixture(temp.path());

    oszx_cmd()
        .arg("extract")
        .arg("--strict")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 3 bundles failed"));
}

#[test]
fn test_extract_missing_source_dir() {
    let temp = TempDir::new().expect("failed to create temp dir");

    oszx_cmd()
        .arg("extract")
        .arg(temp.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source directory not found"))
        .stderr(predicate::str::contains("HINT"));
}

#[test]
fn test_extract_json_output() {
    let temp = TempDir::new().expect("failed to create temp dir");
    songs_fixture(temp.path());

    let output = oszx_cmd()
        .arg("extract")
        .arg("--json")
        .arg(temp.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["operation"], "extract");
    assert_eq!(json["status"], "partial");
    assert_eq!(json["data"]["total"], 3);
    assert_eq!(json["data"]["extracted"], 1);
    assert_eq!(json["data"]["skipped"], 1);
    assert_eq!(json["data"]["failed"], 1);

    let archives = json["data"]["archives"].as_array().unwrap();
    let broken = archives
        .iter()
        .find(|a| a["archive"].as_str().unwrap().ends_with("broken.osz"))
        .unwrap();
    assert_eq!(broken["outcome"], "failed");
    assert_eq!(broken["error"]["kind"], "open");
}

#[test]
fn test_extract_empty_dir_warns() {
    let temp = TempDir::new().expect("failed to create temp dir");

    oszx_cmd()
        .arg("extract")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("no .osz files found"));
}

#[test]
fn test_extract_custom_extension() {
    let temp = TempDir::new().expect("failed to create temp dir");
    write_bundle(temp.path(), "pack.zip", &[("pack/", b""), ("pack/x.osu", b"v14")]);

    oszx_cmd()
        .arg("extract")
        .arg(temp.path())
        .arg("--extension")
        .arg("zip")
        .assert()
        .success();

    assert!(temp.path().join("pack").join("x.osu").is_file());
}

#[test]
fn test_check_does_not_extract() {
    let temp = TempDir::new().expect("failed to create temp dir");
    songs_fixture(temp.path());

    oszx_cmd()
        .arg("check")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("beatmap"))
        .stdout(predicate::str::contains("not-a-beatmap"))
        .stdout(predicate::str::contains("unreadable"))
        .stdout(predicate::str::contains("1 of 3 bundles contain beatmaps"));

    assert!(!temp.path().join("1 Artist - Title").exists());
}

#[test]
fn test_check_json_output() {
    let temp = TempDir::new().expect("failed to create temp dir");
    songs_fixture(temp.path());

    let output = oszx_cmd()
        .args(["--json", "check"])
        .arg(temp.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["operation"], "check");
    assert_eq!(json["data"]["conforming"], 1);
    assert_eq!(json["data"]["not_conforming"], 1);
    assert_eq!(json["data"]["unreadable"], 1);
}

#[test]
fn test_quiet_suppresses_report() {
    let temp = TempDir::new().expect("failed to create temp dir");
    songs_fixture(temp.path());

    oszx_cmd()
        .arg("-q")
        .arg("extract")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_completion_bash() {
    oszx_cmd()
        .arg("completion")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("oszx"));
}
