mod common;

use common::{write_temp, OdcBuilder};
use std::process::Command;

fn odcpio() -> Command {
    Command::new(env!("CARGO_BIN_EXE_odcpio"))
}

#[test]
fn missing_arguments_exit_1() {
    let out = odcpio().output().unwrap();
    assert_eq!(out.status.code(), Some(1));

    let tmp = write_temp(&OdcBuilder::new().trailer().build());
    let out = odcpio().arg(tmp.path()).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn unopenable_input_exit_1() {
    let dir = tempfile::tempdir().unwrap();
    let out = odcpio()
        .arg(dir.path().join("absent.cpio"))
        .arg(dir.path().join("out"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Could not open file"));
}

#[test]
fn lists_entries() {
    let bytes = OdcBuilder::new()
        .file("a", b"12345")
        .file("description", b"about")
        .trailer()
        .build();
    let tmp = write_temp(&bytes);
    let dir = tempfile::tempdir().unwrap();

    let out = odcpio().arg(tmp.path()).arg(dir.path().join("out")).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("description"));
    assert!(stdout.contains("2 entries"));
    assert!(!stdout.contains("TRAILER!!!"));
    // The output path is never created.
    assert!(!dir.path().join("out").exists());
}

#[test]
fn prints_description_payload() {
    let bytes = OdcBuilder::new()
        .file("description", b"line one\nline two\n")
        .trailer()
        .build();
    let tmp = write_temp(&bytes);

    let out = odcpio().arg(tmp.path()).arg("unused").arg("--description").output().unwrap();
    assert!(out.status.success());
    assert_eq!(out.stdout, b"line one\nline two\n");
}

#[test]
fn missing_description_exit_1() {
    let tmp = write_temp(&OdcBuilder::new().file("a", b"1").trailer().build());
    let out = odcpio().arg(tmp.path()).arg("unused").arg("--description").output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Entry not found"));
}

#[test]
fn partial_archive_warns_and_strict_fails() {
    let bytes = OdcBuilder::new().file("a", b"1").raw(b"junk").build();
    let tmp = write_temp(&bytes);

    let out = odcpio().arg(tmp.path()).arg("unused").output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("partial"));

    let out = odcpio().arg(tmp.path()).arg("unused").arg("--strict").output().unwrap();
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn json_listing() {
    let tmp = write_temp(&OdcBuilder::new().file("a", b"abc").trailer().build());
    let out = odcpio().arg(tmp.path()).arg("unused").arg("--json").output().unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v[0]["name"], "a");
    assert_eq!(v[0]["size"], 3);
}
