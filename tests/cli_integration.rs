use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const ABANDON: &str = "abandon abandon abandon abandon abandon abandon \
                       abandon abandon abandon abandon abandon about";
const PASSWORD: &str = "correcthorsebattery";

fn vault_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("meh-vault-cli-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir.join("vault.json")
}

fn run(vault: &Path, args: &[&str]) -> Output {
    let binary_path = assert_cmd::cargo::cargo_bin!("meh-vault");
    Command::new(binary_path)
        .arg("--vault")
        .arg(vault)
        .args(args)
        .env("MEH_VAULT_PASSWORD", PASSWORD)
        .env_remove("MEH_VAULT_PATH")
        .env_remove("RUST_LOG")
        .output()
        .expect("cli runs")
}

fn run_json(vault: &Path, args: &[&str]) -> Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let output = run(vault, &full);
    assert!(
        output.status.success(),
        "cli exited unsuccessfully: {:?}",
        output
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout is utf8");
    serde_json::from_str(&stdout).expect("stdout is valid json")
}

#[test]
fn mnemonic_prints_valid_phrase() {
    let vault = vault_path("mnemonic");
    for words in [12usize, 24] {
        let output = run_json(&vault, &["mnemonic", "--words", &words.to_string()]);
        let phrase = output["mnemonic"].as_str().expect("mnemonic field");
        assert_eq!(phrase.split(' ').count(), words);
        assert!(meh_vault::is_valid_seed_phrase(phrase));
    }

    let output = run(&vault, &["mnemonic", "--words", "15"]);
    assert!(!output.status.success());
}

#[test]
fn derive_is_stateless() {
    let vault = vault_path("derive");
    let output = run_json(
        &vault,
        &["derive", "--chain", "solana", "--mnemonic", ABANDON, "--count", "3"],
    );

    let entries = output.as_array().expect("array output");
    let keys: Vec<&str> = entries
        .iter()
        .map(|e| e["publicKey"].as_str().expect("publicKey"))
        .collect();
    assert_eq!(
        keys,
        [
            "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk",
            "Hh8QwFUA6MtVu1qAoq12ucvFHNwCcVTV7hpWjeY1Hztb",
            "7WktogJEd2wQ9eH2oWusmcoFTgeYi6rS632UviTBJ2jm",
        ]
    );
    assert_eq!(entries[1]["path"], "m/44'/501'/1'/0'");
    assert!(!vault.exists());

    let output = run_json(
        &vault,
        &["derive", "--chain", "ethereum", "--mnemonic", ABANDON, "--index", "1"],
    );
    assert_eq!(output[0]["publicKey"], "0x6Fac4D18c912343BF86fa7049364Dd4E424Ab9C0");
    assert_eq!(output[0]["path"], "m/44'/60'/0'/0/1");
}

#[test]
fn vault_lifecycle() {
    let vault = vault_path("lifecycle");

    let status = run_json(&vault, &["status"]);
    assert_eq!(status["exists"], false);

    let created = run_json(
        &vault,
        &["create", "--chain", "ethereum", "--mnemonic", ABANDON],
    );
    assert_eq!(created["blockchain"], "ethereum");
    assert_eq!(created["seedPhrase"], ABANDON);

    // A second create needs --force
    let output = run(&vault, &["create", "--chain", "solana"]);
    assert!(!output.status.success());

    let added = run_json(&vault, &["add", "--count", "2"]);
    assert_eq!(added[0]["id"], 1);
    assert_eq!(added[0]["publicKey"], "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
    assert!(added[0].get("privateKey").is_none());

    let listed = run_json(&vault, &["list", "--show-private"]);
    assert_eq!(listed.as_array().map(Vec::len), Some(2));
    assert!(listed[1]["privateKey"].as_str().expect("privateKey").starts_with("0x"));

    let status = run_json(&vault, &["status"]);
    assert_eq!(status["walletCount"], 2);

    run_json(&vault, &["clear"]);
    let listed = run_json(&vault, &["list"]);
    assert_eq!(listed.as_array().map(Vec::len), Some(0));

    // Delete needs explicit confirmation
    assert!(!run(&vault, &["delete"]).status.success());
    assert_eq!(run_json(&vault, &["delete", "--yes"])["deleted"], true);
    assert!(!vault.exists());

    let _ = std::fs::remove_dir_all(vault.parent().expect("parent dir"));
}

#[test]
fn wrong_password_is_reported() {
    let vault = vault_path("password");
    run_json(&vault, &["create", "--chain", "solana", "--mnemonic", ABANDON]);

    let output = run(&vault, &["--password", "notthepassword", "list"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Incorrect password"), "stderr: {stderr}");

    let _ = std::fs::remove_dir_all(vault.parent().expect("parent dir"));
}

#[test]
fn address_is_checked_and_normalized() {
    let vault = vault_path("address");
    let output = run_json(
        &vault,
        &[
            "address",
            "--chain",
            "ethereum",
            "0x9858effd232b4033e47d90003d41ec34ecaeda94",
        ],
    );
    assert_eq!(output["address"], "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");

    // Broken checksum and wrong chain are both rejected
    let output = run(
        &vault,
        &["address", "--chain", "ethereum", "0x9858efFD232B4033E47d90003D41EC34EcaEda94"],
    );
    assert!(!output.status.success());
    let output = run(
        &vault,
        &["address", "--chain", "solana", "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid Solana address"));
}
