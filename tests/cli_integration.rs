// CLI integration tests for the jsonbundle binary.
use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value;

fn cmd(dir: &Path) -> Command {
    let exe = env!("CARGO_BIN_EXE_jsonbundle");
    let mut command = Command::new(exe);
    command
        .env_remove("JSONBUNDLE_DIR")
        .env_remove("RUST_LOG")
        .args(["--dir", dir.to_str().expect("utf8 dir")]);
    command
}

fn parse_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("valid json")
}

fn assets() -> tempfile::TempDir {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(
        temp.path().join("record.json"),
        br#"{ "id": 1, "createdAt": "2020-01-01T00:00:00Z", "payload": "aGVsbG8=" }"#,
    )
    .expect("record");
    fs::write(temp.path().join("broken.json"), b"{not json").expect("broken");
    temp
}

#[test]
fn list_check_and_fmt_flow() {
    let temp = assets();

    let list = cmd(temp.path()).arg("list").output().expect("list");
    assert!(list.status.success());
    assert_eq!(parse_json(&list.stdout), serde_json::json!(["broken", "record"]));

    let check = cmd(temp.path()).args(["check", "record"]).output().expect("check");
    assert!(check.status.success());
    let check_json = parse_json(&check.stdout);
    assert_eq!(check_json["resource"], "record");
    assert_eq!(check_json["ok"], true);

    let fmt = cmd(temp.path()).args(["fmt", "record", "--pretty"]).output().expect("fmt");
    assert!(fmt.status.success());
    let text = String::from_utf8(fmt.stdout).expect("utf8");
    assert!(text.contains("\n  \"id\": 1"));
    assert_eq!(parse_json(text.as_bytes())["payload"], "aGVsbG8=");
}

#[test]
fn cat_writes_raw_bytes() {
    let temp = assets();
    let cat = cmd(temp.path()).args(["cat", "broken"]).output().expect("cat");
    assert!(cat.status.success());
    assert_eq!(cat.stdout, b"{not json");
}

#[test]
fn date_shows_decode_encode_asymmetry() {
    let temp = assets();
    let date = cmd(temp.path())
        .args(["date", "2020-01-01T00:00:00Z"])
        .output()
        .expect("date");
    assert!(date.status.success());
    let json = parse_json(&date.stdout);
    assert_eq!(json["encoded"], "2020-01-01T00:00:00.000Z");
    assert_eq!(json["unix_seconds"], 1_577_836_800);

    let reparse = cmd(temp.path())
        .args(["date", "2020-01-01T00:00:00.000Z"])
        .output()
        .expect("reparse");
    assert_eq!(reparse.status.code(), Some(6));
}

#[test]
fn date_format_flag_changes_decode_pattern() {
    let temp = assets();
    let date = cmd(temp.path())
        .args(["--date-format", "dd/MM/yyyy", "date", "31/12/1999"])
        .output()
        .expect("date");
    assert!(date.status.success());
    assert_eq!(parse_json(&date.stdout)["encoded"], "1999-12-31T00:00:00.000Z");
}

#[test]
fn missing_resource_exits_not_found_with_json_error() {
    let temp = assets();
    let out = cmd(temp.path()).args(["check", "missing"]).output().expect("check");
    assert_eq!(out.status.code(), Some(3));
    let err = parse_json(&out.stderr);
    assert_eq!(err["error"]["kind"], "NotFound");
    assert_eq!(err["error"]["resource"], "missing");
    assert!(err["error"]["hint"].as_str().is_some());
}

#[test]
fn broken_resource_exits_decode_with_category() {
    let temp = assets();
    let out = cmd(temp.path()).args(["check", "broken"]).output().expect("check");
    assert_eq!(out.status.code(), Some(6));
    let err = parse_json(&out.stderr);
    assert_eq!(err["error"]["kind"], "Decode");
    assert_eq!(err["error"]["category"], "syntax");
    assert_eq!(err["error"]["resource"], "broken");
}

#[test]
fn invalid_date_format_is_usage_error() {
    let temp = assets();
    let out = cmd(temp.path())
        .args(["--date-format", "QQQ", "list"])
        .output()
        .expect("list");
    assert_eq!(out.status.code(), Some(2));
    assert_eq!(parse_json(&out.stderr)["error"]["kind"], "Usage");
}
