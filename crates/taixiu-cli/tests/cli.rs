use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/rounds.json")
}

fn taixiu() -> Command {
    let mut cmd = Command::cargo_bin("taixiu").unwrap();
    cmd.env_remove("TAIXIU_CONFIG")
        .env_remove("TAIXIU_LOG")
        .env_remove("TAIXIU_INTERVAL_MS");
    cmd
}

#[test]
fn test_init_then_validate() {
    let dir = TempDir::new().unwrap();
    let cfg = dir.path().join("taixiu.yaml");

    taixiu()
        .args(["init", "--config"])
        .arg(&cfg)
        .assert()
        .success()
        .stderr(contains("created"));
    assert!(cfg.exists());
    let original = fs::read_to_string(&cfg).unwrap();

    taixiu()
        .args(["init", "--config"])
        .arg(&cfg)
        .assert()
        .code(1)
        .stderr(contains("refusing to overwrite"));
    assert_eq!(fs::read_to_string(&cfg).unwrap(), original);

    taixiu()
        .args(["validate", "--strict", "--config"])
        .arg(&cfg)
        .assert()
        .success()
        .stderr(contains("config ok"))
        .stderr(contains("md5"));
}

#[test]
fn test_validate_strict_rejects_unknown_keys() {
    let dir = TempDir::new().unwrap();
    let cfg = dir.path().join("taixiu.yaml");
    fs::write(
        &cfg,
        r#"
version: 1
pol:
  interval_ms: 1000
feeds:
  - name: tx
    url: https://example.invalid/tx
"#,
    )
    .unwrap();

    taixiu()
        .args(["validate", "--config"])
        .arg(&cfg)
        .assert()
        .success();

    let out = taixiu()
        .args(["validate", "--strict", "--format", "json", "--config"])
        .arg(&cfg)
        .assert()
        .code(2)
        .get_output()
        .stdout
        .clone();
    let v: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["ok"], false);
    assert!(v["error"].as_str().unwrap().contains("pol"));
}

#[test]
fn test_replay_one_record_per_cycle() {
    let out = taixiu()
        .args(["replay", "--format", "json", "--rounds"])
        .arg(fixture())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(v["feed"], "rounds");
    assert_eq!(v["cycles"], 21);
    let snap = &v["snapshot"];
    assert_eq!(snap["status"], "ready");
    assert_eq!(snap["latest"]["id"], 1020);
    assert_eq!(snap["history"], "BSBSBBSBSBSBSBSSBSBS");
    // Every round after the first settles the prediction issued one cycle earlier.
    assert_eq!(snap["stats"]["total_resolved"], 19);
    assert_eq!(snap["prediction"]["target_round_id"], 1021);

    let last = v["outcomes"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["outcome"], "empty");
    assert_eq!(last["rejected"], 1);
}

#[test]
fn test_replay_batches_only_resolve_cross_batch_predictions() {
    let out = taixiu()
        .args(["replay", "--format", "json", "--batch", "5", "--seed", "7", "--rounds"])
        .arg(fixture())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(v["cycles"], 5);
    assert_eq!(v["snapshot"]["stats"]["total_resolved"], 3);
}

#[test]
fn test_replay_text_report() {
    taixiu()
        .args(["replay", "--rounds"])
        .arg(fixture())
        .assert()
        .success()
        .stderr(contains("Summary: 21 cycles, 19 resolved"))
        .stderr(contains("#1021"));
}

#[test]
fn test_replay_without_usable_rounds_fails() {
    let dir = TempDir::new().unwrap();
    let rounds = dir.path().join("junk.jsonl");
    fs::write(&rounds, "{\"id\": 1}\n{\"id\": 2, \"dice\": [7, 1, 1]}\n").unwrap();

    taixiu()
        .args(["replay", "--rounds"])
        .arg(&rounds)
        .assert()
        .code(1)
        .stderr(contains("no usable rounds"));
}

#[test]
fn test_watch_unknown_feed_is_config_error() {
    let dir = TempDir::new().unwrap();
    let cfg = dir.path().join("taixiu.yaml");
    taixiu()
        .args(["init", "--config"])
        .arg(&cfg)
        .assert()
        .success();

    taixiu()
        .args(["watch", "--feed", "nope", "--cycles", "1", "--config"])
        .arg(&cfg)
        .assert()
        .code(2)
        .stderr(contains("unknown feed 'nope'"));
}

#[test]
fn test_watch_rejects_interval_below_floor() {
    let dir = TempDir::new().unwrap();
    let cfg = dir.path().join("taixiu.yaml");
    taixiu()
        .args(["init", "--config"])
        .arg(&cfg)
        .assert()
        .success();

    taixiu()
        .args(["watch", "--feed", "tx", "--cycles", "1", "--interval-ms", "0", "--config"])
        .arg(&cfg)
        .assert()
        .code(2)
        .stderr(contains("interval override must be >= 500"));

    taixiu()
        .env("TAIXIU_INTERVAL_MS", "10")
        .args(["watch", "--feed", "tx", "--cycles", "1", "--config"])
        .arg(&cfg)
        .assert()
        .code(2)
        .stderr(contains("got 10"));
}

#[test]
fn test_version() {
    taixiu()
        .arg("version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}
