use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const POLICY: &str = r#"
version: "pacm-v1"
requirements:
  signature_required: true
allowed_signers:
  - public_key: "K1"
constraints:
  max_parameter_count: 1000000
"#;

const GOOD_FACTS: &str = r#"{
  "signature_valid": true,
  "signer_public_key": "K1",
  "parameter_count": 500000,
  "fingerprint_match": true
}"#;

struct Workspace {
    _tmp: TempDir,
    model: PathBuf,
    cert: PathBuf,
    policy: PathBuf,
}

impl Workspace {
    fn new(policy: &str) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let model = tmp.path().join("model.pth");
        let cert = tmp.path().join("cert.json");
        let policy_path = tmp.path().join("policy.yaml");

        fs::write(&model, b"weights").unwrap();
        fs::write(&cert, b"{}").unwrap();
        fs::write(&policy_path, policy).unwrap();

        Self {
            _tmp: tmp,
            model,
            cert,
            policy: policy_path,
        }
    }

    fn write_facts(&self, facts: &str) -> PathBuf {
        let path = self.cert.with_file_name("cert.json.facts.json");
        fs::write(&path, facts).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("pacm").unwrap();
        cmd.env_remove("RUST_LOG")
            .arg(&self.model)
            .arg(&self.cert)
            .arg(&self.policy);
        cmd
    }
}

#[test]
fn allow_exits_zero() {
    let ws = Workspace::new(POLICY);
    ws.write_facts(GOOD_FACTS);

    ws.cmd()
        .assert()
        .success()
        .stdout(contains("Decision: ALLOW"))
        .stdout(contains("Reason: Policy satisfied"));
}

#[test]
fn deny_exits_one() {
    let ws = Workspace::new(POLICY);
    ws.write_facts(r#"{"signature_valid": true, "signer_public_key": "K2", "fingerprint_match": true}"#);

    ws.cmd()
        .assert()
        .code(1)
        .stdout(contains("Decision: DENY"))
        .stdout(contains("Reason: Signer is not in allowed_signers"));
}

#[test]
fn explicit_facts_file() {
    let ws = Workspace::new(POLICY);
    let facts = ws.model.with_file_name("facts.json");
    fs::write(&facts, GOOD_FACTS).unwrap();

    let mut cmd = Command::cargo_bin("pacm").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--facts")
        .arg(&facts)
        .arg(&ws.model)
        .arg(&ws.cert)
        .arg(&ws.policy)
        .assert()
        .success()
        .stdout(contains("Decision: ALLOW"));
}

#[test]
fn json_output() {
    let ws = Workspace::new(POLICY);
    ws.write_facts(r#"{"signature_valid": true, "signer_public_key": "K1"}"#);

    ws.cmd()
        .arg("--json")
        .assert()
        .code(1)
        .stdout(contains("\"decision\": \"DENY\""))
        .stdout(contains("Fingerprint mismatch"));
}

#[test]
fn policy_error_is_fatal() {
    let ws = Workspace::new("version: \"pacm-v1\"\nrequirements:\n  signature_required: true\nallowed_signers: []\n");
    ws.write_facts(GOOD_FACTS);

    ws.cmd()
        .assert()
        .code(1)
        .stderr(contains("Policy error"))
        .stderr(contains("constraints"))
        .stdout(contains("Decision").not());
}

#[test]
fn missing_facts_is_fatal() {
    let ws = Workspace::new(POLICY);

    ws.cmd()
        .assert()
        .code(1)
        .stderr(contains("Verification failed"))
        .stdout(contains("Decision").not());
}

#[test]
fn missing_model_is_fatal() {
    let ws = Workspace::new(POLICY);
    ws.write_facts(GOOD_FACTS);
    fs::remove_file(&ws.model).unwrap();

    ws.cmd()
        .assert()
        .code(1)
        .stderr(contains("model artifact not found"));
}

#[test]
fn wrong_arity_is_usage_error() {
    Command::cargo_bin("pacm")
        .unwrap()
        .args(["model.pth", "cert.json"])
        .assert()
        .code(2)
        .stderr(contains("Usage"));
}

#[test]
fn check_valid_policy() {
    let ws = Workspace::new(POLICY);

    Command::cargo_bin("pacm")
        .unwrap()
        .arg("check")
        .arg(&ws.policy)
        .assert()
        .success()
        .stdout(contains("Policy file is valid"))
        .stdout(contains("max parameters: 1000000"));
}

#[test]
fn check_invalid_policy() {
    let ws = Workspace::new("version: \"pacm-v2\"\n");

    Command::cargo_bin("pacm")
        .unwrap()
        .arg("check")
        .arg(&ws.policy)
        .assert()
        .code(1)
        .stderr(contains("Unsupported or missing policy version"));
}

#[test]
fn version_flag() {
    Command::cargo_bin("pacm")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("pacm "));
}

#[test]
fn model_named_check_is_evaluated() {
    let ws = Workspace::new(POLICY);
    ws.write_facts(GOOD_FACTS);
    let model = ws.model.with_file_name("check");
    fs::write(&model, b"weights").unwrap();

    Command::cargo_bin("pacm")
        .unwrap()
        .env_remove("RUST_LOG")
        .current_dir(model.parent().unwrap())
        .args(["check", "cert.json", "policy.yaml"])
        .assert()
        .success()
        .stdout(contains("Decision: ALLOW"));
}

#[test]
fn separator_before_positionals() {
    let ws = Workspace::new(POLICY);
    ws.write_facts(GOOD_FACTS);

    Command::cargo_bin("pacm")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg("--")
        .arg(&ws.model)
        .arg(&ws.cert)
        .arg(&ws.policy)
        .assert()
        .success()
        .stdout(contains("Decision: ALLOW"));
}

#[test]
fn float_parameter_count_over_limit_denies() {
    let ws = Workspace::new(POLICY);
    ws.write_facts(
        r#"{"signature_valid": true, "signer_public_key": "K1",
            "parameter_count": 2000000.0, "fingerprint_match": true}"#,
    );

    ws.cmd()
        .assert()
        .code(1)
        .stdout(contains("Reason: Model exceeds max_parameter_count"));
}
