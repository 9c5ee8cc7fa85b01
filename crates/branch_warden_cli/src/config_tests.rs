//! Tests for CLI configuration management.

use super::*;

const FULL_CONFIG: &str = r#"
[repository]
owner = "acme"
slug = "widgets"

[authentication]
username = "ci-bot"

[rules]
branch_pattern = "release/*"
merge_access_users = "alice, bob"
merge_access_groups = "release-managers"
require_default_reviewer_approvals = true
default_reviewer_approvals = 1
require_approvals = true
required_approvals = 2
require_passing_builds = false
"#;

#[test]
fn test_load_full_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
    fs::write(&path, FULL_CONFIG).unwrap();

    let config = AppConfig::load(&path).expect("Failed to load config");

    assert_eq!(config.repository.owner, "acme");
    assert_eq!(config.repository.slug, "widgets");
    assert_eq!(config.authentication.username, "ci-bot");
    assert_eq!(config.rules.branch_pattern, "release/*");
    assert_eq!(config.rules.merge_access_users, "alice, bob");
    assert!(config.rules.require_approvals);
    assert_eq!(config.rules.required_approvals, 2);
    assert!(!config.rules.require_passing_builds);
}

#[test]
fn test_load_applies_section_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
    fs::write(
        &path,
        r#"
[repository]
owner = "acme"
slug = "widgets"

[rules]
branch_pattern = "main"
"#,
    )
    .unwrap();

    let config = AppConfig::load(&path).expect("Failed to load config");

    assert_eq!(config.authentication.username, "");
    assert_eq!(config.rules.merge_access_users, "");
    assert!(!config.rules.require_approvals);
    assert_eq!(config.rules.required_approvals, 1);
}

#[test]
fn test_load_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let result = AppConfig::load(&path);

    match result {
        Err(Error::Config(message)) => assert!(message.contains("not found")),
        other => panic!("Expected config error, got {other:?}"),
    }
}

#[test]
fn test_load_invalid_toml_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
    fs::write(&path, "invalid = toml = syntax").unwrap();

    let result = AppConfig::load(&path);

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_save_and_reload_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join(DEFAULT_CONFIG_FILENAME);

    let config = AppConfig::default();
    config.save(&path).expect("Failed to save config");

    let reloaded = AppConfig::load(&path).expect("Failed to reload config");

    assert_eq!(reloaded.repository.owner, config.repository.owner);
    assert_eq!(reloaded.rules.branch_pattern, config.rules.branch_pattern);
}

#[test]
fn test_default_config_has_placeholder_repository() {
    let config = AppConfig::default();

    assert_eq!(config.repository.owner, "your-workspace");
    assert_eq!(config.repository.slug, "your-repository");
    assert_eq!(config.rules.branch_pattern, "main");
}

#[test]
fn test_get_config_path_with_explicit_path() {
    let path = get_config_path(Some("/tmp/custom.toml"));
    assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
}

#[test]
fn test_get_config_path_defaults_to_current_directory() {
    let path = get_config_path(None);
    assert!(path.ends_with(DEFAULT_CONFIG_FILENAME));
}
