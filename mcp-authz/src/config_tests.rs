//! Tests for configuration loading

use crate::config::AuthzConfig;
use crate::error::ConfigError;
use crate::policy::{CredentialMapping, PermittedOperations};
use std::io::Write;

#[test]
fn test_default_config() {
    let config = AuthzConfig::default();
    assert_eq!(config.default_role, "viewer");
    assert_eq!(config.role_env_var, "AGENT_ROLE");
    assert_eq!(config.api_key_env_var, "AGENT_API_KEY");
    assert!(config.roles.is_empty());
    assert!(config.credential_prefixes.is_empty());
    assert!(config.known_operations.is_none());
}

#[test]
fn test_empty_toml_is_default() {
    let config = AuthzConfig::from_toml_str("").unwrap();
    assert_eq!(config, AuthzConfig::default());
}

#[test]
fn test_full_toml_document() {
    let config = AuthzConfig::from_toml_str(
        r#"
default_role = "author"
role_env_var = "MCP_ROLE"
api_key_env_var = "MCP_KEY"
known_operations = ["list_entries", "get_entry"]

[roles.root]
name = "Root"
access_level = "full"
tools = "all"

[roles.reviewer]
name = "Reviewer"
description = "Reads drafts"
tools = ["list_entries", "get_entry"]
blocked_tools = ["delete_entry"]

[[credential_prefixes]]
prefix = "rev_"
role = "reviewer"

[[credential_prefixes]]
prefix = "re"
role = "root"
"#,
    )
    .unwrap();

    assert_eq!(config.default_role, "author");
    assert_eq!(config.role_env_var, "MCP_ROLE");
    assert_eq!(config.known_operations.as_ref().unwrap().len(), 2);
    assert!(config.roles["root"].is_wildcard());
    assert_eq!(
        config.roles["reviewer"].tools,
        PermittedOperations::only(["get_entry", "list_entries"])
    );
    assert_eq!(
        config.credential_prefixes,
        vec![
            CredentialMapping::new("rev_", "reviewer"),
            CredentialMapping::new("re", "root"),
        ]
    );
}

#[test]
fn test_invalid_toml_is_reported() {
    let err = AuthzConfig::from_toml_str("default_role = ").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
    assert!(err.to_string().starts_with("Invalid TOML config"));
}

#[test]
fn test_bad_tools_keyword() {
    let err = AuthzConfig::from_toml_str("[roles.x]\ntools = \"some\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn test_empty_default_role_rejected() {
    let err = AuthzConfig::from_toml_str("default_role = \"\"").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_empty_env_var_name_rejected() {
    let err = AuthzConfig::from_toml_str("role_env_var = \"\"").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid configuration: role_env_var and api_key_env_var must not be empty"
    );
}

#[test]
fn test_empty_prefix_rejected() {
    let err = AuthzConfig::from_json_str(
        r#"{"credential_prefixes": [{"prefix": "", "role": "admin"}]}"#,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid configuration: credential prefix for role 'admin' must not be empty"
    );
}

#[test]
fn test_unknown_roles_in_mappings_are_accepted() {
    let config = AuthzConfig::from_json_str(
        r#"{"credential_prefixes": [{"prefix": "x_", "role": "does_not_exist"}]}"#,
    )
    .unwrap();
    assert_eq!(config.credential_prefixes[0].role, "does_not_exist");
}

#[test]
fn test_from_file_by_extension() {
    let dir = tempfile::tempdir().unwrap();

    let toml_path = dir.path().join("authz.toml");
    std::fs::File::create(&toml_path)
        .unwrap()
        .write_all(b"default_role = \"editor\"\n")
        .unwrap();
    assert_eq!(AuthzConfig::from_file(&toml_path).unwrap().default_role, "editor");

    let json_path = dir.path().join("authz.json");
    std::fs::write(&json_path, r#"{"default_role": "author"}"#).unwrap();
    assert_eq!(AuthzConfig::from_file(&json_path).unwrap().default_role, "author");
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = AuthzConfig::from_file(dir.path().join("nope.toml")).unwrap_err();
    match err {
        ConfigError::Io { path, source } => {
            assert!(path.ends_with("nope.toml"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("Expected Io error, got {other:?}"),
    }
}

#[test]
fn test_toml_output_reloads() {
    let config = AuthzConfig::default()
        .with_role(
            "reviewer",
            crate::policy::RoleDefinition::limited("Reviewer", ["get_entry"]),
        )
        .with_credential_prefix("rev_", "reviewer")
        .with_env_vars("R", "K");

    let text = config.to_toml_string().unwrap();
    assert_eq!(AuthzConfig::from_toml_str(&text).unwrap(), config);
}
