use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const RULES_JSON: &str = r#"[
    {"symptoms": ["itching", "skin rash", "nodal skin eruptions"], "diagnosis": "Fungal infection"},
    {"symptoms": ["cough", "fever", "chills", "fatigue"], "diagnosis": "Flu"}
]"#;

/// Command with a private HOME so no user config file is picked up
fn cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("symptom-expert").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("SYMPTOM_EXPERT_SYMPTOMS")
        .env_remove("SYMPTOM_EXPERT_RULES")
        .env_remove("SYMPTOM_EXPERT_SESSION_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn write_rules(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("rules.json");
    fs::write(&path, RULES_JSON).unwrap();
    path
}

#[test]
fn test_version_command() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "symptom-expert {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("chat"));
}

#[test]
fn test_unknown_command_fails() {
    let home = TempDir::new().unwrap();
    cmd(&home).arg("frobnicate").assert().code(2);
}

#[test]
fn test_diagnose_exact() {
    let home = TempDir::new().unwrap();
    let rules = write_rules(&home);
    cmd(&home)
        .args(["diagnose", "--rules"])
        .arg(&rules)
        .args(["itching", "Skin_Rash", "nodal skin eruptions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"exact\""))
        .stdout(predicate::str::contains("Fungal infection"));
}

#[test]
fn test_diagnose_partial() {
    let home = TempDir::new().unwrap();
    let rules = write_rules(&home);
    cmd(&home)
        .args(["diagnose", "--rules"])
        .arg(&rules)
        .args(["cough", "fever", "chills"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"partial\""))
        .stdout(predicate::str::contains("\"confidence\": 0.75"));
}

#[test]
fn test_diagnose_without_rules_fails() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .args(["diagnose", "cough"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No rules file configured"));
}

#[test]
fn test_rules_from_environment() {
    let home = TempDir::new().unwrap();
    let rules = write_rules(&home);
    cmd(&home)
        .env("SYMPTOM_EXPERT_RULES", &rules)
        .args(["diagnose", "itching"])
        .assert()
        .success()
        .stdout(predicate::str::contains("inconclusive"));
}

#[test]
fn test_chat_session() {
    let home = TempDir::new().unwrap();
    let rules = write_rules(&home);
    cmd(&home)
        .args(["chat", "--rules"])
        .arg(&rules)
        .write_stdin(
            "hello\n\
             I have itching and skin rash\n\
             also nodal skin eruptions\n\
             /followup what treatment should I use\n\
             /quit\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("describe your first symptom"))
        .stdout(predicate::str::contains("Currently, I have 2 symptom(s)"))
        .stdout(predicate::str::contains("Diagnosis: **Fungal infection**"))
        .stdout(predicate::str::contains("antifungal"));
}

#[test]
fn test_chat_follow_up_without_session() {
    let home = TempDir::new().unwrap();
    let rules = write_rules(&home);
    cmd(&home)
        .args(["chat", "--rules"])
        .arg(&rules)
        .write_stdin("/followup explain\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Session ID is required"));
}

#[test]
fn test_import_rules() {
    let home = TempDir::new().unwrap();
    let sheet = home.path().join("rules.txt");
    let output = home.path().join("rules.json");
    fs::write(
        &sheet,
        "IF acidity AND chest pain THEN diagnosis = 'GERD'\nbroken line\n",
    )
    .unwrap();

    cmd(&home)
        .arg("import-rules")
        .arg(&sheet)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("line 2: Invalid format"));

    let json = fs::read_to_string(&output).unwrap();
    assert!(json.contains("GERD"));
    assert!(json.contains("chest pain"));
}

#[test]
fn test_import_rules_with_nothing_valid_fails() {
    let home = TempDir::new().unwrap();
    let sheet = home.path().join("rules.txt");
    fs::write(&sheet, "nothing here\n").unwrap();

    cmd(&home)
        .arg("import-rules")
        .arg(&sheet)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No valid rules"));
}
