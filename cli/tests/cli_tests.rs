use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const GROUP_VARIABLES: [&str; 5] = [
    "GROUP_ADMIN",
    "GROUP_EDITOR",
    "GROUP_MEMBER",
    "GROUP_AGENT",
    "GROUP_VIEWER",
];

/// Runs `dsctl` from an empty directory so no `.env` file is picked up.
fn dsctl(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dsctl").unwrap();
    cmd.current_dir(workdir.path());
    for variable in GROUP_VARIABLES {
        cmd.env_remove(variable);
    }
    cmd.env_remove("AUTOCREATE_USERS")
        .env_remove("DEFAULT_ACCOUNT_NAME");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    dsctl(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rules"))
        .stdout(predicate::str::contains("can"))
        .stdout(predicate::str::contains("groups"))
        .stdout(predicate::str::contains("health"));
}

#[test]
fn test_admin_rule_table_ends_with_wildcard() {
    let dir = TempDir::new().unwrap();
    dsctl(&dir)
        .args(["rules", "--role", "admin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("can manage all"))
        .stdout(predicate::str::contains("can read user where account_id = account"));
}

#[test]
fn test_rule_table_without_role_has_base_rules_only() {
    let dir = TempDir::new().unwrap();
    let output = dsctl(&dir)
        .args(["rules", "--format", "json", "--actor-id", "u1"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rules = json["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[1]["description"], "can manage user where id = u1");
}

#[test]
fn test_unknown_role_fails() {
    let dir = TempDir::new().unwrap();
    dsctl(&dir)
        .args(["rules", "--role", "superadmin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid role"));
}

#[test]
fn test_viewer_cannot_create_template() {
    let dir = TempDir::new().unwrap();
    dsctl(&dir)
        .args(["can", "--role", "viewer", "--action", "create", "--resource", "template"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DENIED"))
        .stdout(predicate::str::contains("cannot manage template"));
}

#[test]
fn test_member_folder_checks_on_instance() {
    let dir = TempDir::new().unwrap();
    dsctl(&dir)
        .args([
            "can",
            "--role",
            "member",
            "--action",
            "create",
            "--resource",
            "template_folder",
            "--account-id",
            "account",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ALLOWED"));

    dsctl(&dir)
        .args([
            "can",
            "--role",
            "member",
            "--action",
            "update",
            "--resource",
            "template_folder",
            "--id",
            "f1",
            "--account-id",
            "account",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("DENIED"))
        .stdout(predicate::str::contains("cannot update template_folder"));
}

#[test]
fn test_class_level_check_skips_scoped_rules() {
    let dir = TempDir::new().unwrap();
    let output = dsctl(&dir)
        .args([
            "can",
            "--role",
            "member",
            "--action",
            "read",
            "--resource",
            "template",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["allowed"], false);
    assert!(json["decided_by"].is_null());
}

#[test]
fn test_unknown_action_fails() {
    let dir = TempDir::new().unwrap();
    dsctl(&dir)
        .args(["can", "--role", "admin", "--action", "obliterate", "--resource", "template"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid action"));
}

#[test]
fn test_groups_shows_defaults() {
    let dir = TempDir::new().unwrap();
    dsctl(&dir)
        .arg("groups")
        .assert()
        .success()
        .stdout(predicate::str::contains("group-admin"))
        .stdout(predicate::str::contains("group-viewer"))
        .stdout(predicate::str::contains("GROUP_AGENT"));
}

#[test]
fn test_groups_reads_environment_overrides() {
    let dir = TempDir::new().unwrap();
    let output = dsctl(&dir)
        .env("GROUP_ADMIN", "sso-admins")
        .args(["groups", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let groups = json["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 5);
    let admin = groups
        .iter()
        .find(|g| g["variable"] == "GROUP_ADMIN")
        .unwrap();
    assert_eq!(admin["token"], "sso-admins");
    assert_eq!(admin["role"], "admin");
}

#[test]
fn test_groups_rejects_duplicate_tokens() {
    let dir = TempDir::new().unwrap();
    dsctl(&dir)
        .env("GROUP_ADMIN", "staff")
        .env("GROUP_MEMBER", "staff")
        .arg("groups")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid group configuration"));
}

#[test]
fn test_health_fails_when_server_unreachable() {
    let dir = TempDir::new().unwrap();
    dsctl(&dir)
        .args(["health", "--url", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Server not reachable"));
}
