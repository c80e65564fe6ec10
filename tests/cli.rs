//! CLI argument parsing and validation tests: no network I/O.
//!
//! These tests verify that invalid input is rejected before any cassette
//! or live adapter is consulted.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("brandgen").unwrap();
    cmd.env("BRANDGEN_CONFIG", "/nonexistent/brandgen/config.toml")
        .env_remove("BRANDGEN_REPLAY")
        .env_remove("BRANDGEN_REC")
        .env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY");
    cmd
}

#[test]
fn empty_company_name_is_rejected() {
    // Rejected before the missing API key would be noticed
    cmd()
        .args(["--company", "  ", "--description", "Anvils", "--industry", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("company name is required"));
}

#[test]
fn empty_description_is_rejected() {
    cmd()
        .args(["--company", "Acme", "--description", "", "--industry", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("description is required"));
}

#[test]
fn closed_stdin_is_rejected() {
    // Every field is prompted for; EOF leaves them empty
    cmd()
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Company name:"))
        .stderr(predicate::str::contains("company name is required"));
}

#[test]
fn prompted_fields_are_used() {
    // Valid input read from stdin gets as far as the credential check
    cmd()
        .write_stdin("Acme\nAnvils for everyone\n\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API key for Gemini"));
}

#[test]
fn invalid_text_model_exits_with_error() {
    cmd()
        .args(["--text-model", "gpt-4o", "-c", "Acme", "-d", "Anvils", "-i", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported model 'gpt-4o'"));
}

#[test]
fn invalid_aspect_ratio_exits_with_error() {
    cmd()
        .args(["--aspect-ratio", "100:200", "-c", "Acme", "-d", "Anvils", "-i", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported aspect ratio"));
}

#[test]
fn missing_api_key_exits_with_error() {
    cmd()
        .args(["-c", "Acme", "-d", "Anvils", "-i", "Manufacturing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn invalid_config_file_exits_with_error() {
    let path = std::env::temp_dir().join("brandgen_cli_bad_config.toml");
    std::fs::write(&path, "[defaults]\nconcept_count = 0\n").unwrap();

    cmd()
        .args(["--config", path.to_str().unwrap(), "-c", "Acme", "-d", "Anvils", "-i", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("concept_count"));

    let _ = std::fs::remove_file(&path);
}
