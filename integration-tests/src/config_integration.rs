//! Configuration files driving a live authorizer

use crate::test_utils::*;
use pulseengine_mcp_authz::{AuthzConfig, ConfigError, PolicyWarning, create_authorizer_from_file};
use std::io::Write;

const POLICY_TOML: &str = r#"
default_role = "reader"

[roles.reader]
name = "Reader"
description = "Read-only access to entries"
tools = ["list_entries", "get_entry"]

[roles.ops]
name = "Operations"
access_level = "full"
tools = "all"

[roles.editor]
name = "Restricted Editor"
tools = ["list_entries", "update_entry"]
blocked_tools = ["delete_entry"]

[[credential_prefixes]]
prefix = "ops_"
role = "ops"

[[credential_prefixes]]
prefix = "rd_"
role = "reader"
"#;

#[test]
fn test_toml_policy_drives_decisions() {
    let config = AuthzConfig::from_toml_str(POLICY_TOML).unwrap();
    let authz = authorizer_with_env(config, &[("AGENT_API_KEY", "ops_0123456789abcdef")]);

    assert_eq!(authz.resolve_role(), "ops");
    assert!(authz.is_allowed(None, "delete_user"));
    assert_eq!(authz.resolve_role_from_credential("rd_key"), "reader");
    assert_eq!(authz.resolve_role_from_credential("zz_key"), "reader");
}

#[test]
fn test_override_replaces_builtin_in_place() {
    let config = AuthzConfig::from_toml_str(POLICY_TOML).unwrap();
    let authz = authorizer_with_env(config, &[]);

    assert_eq!(authz.allowed_operations(Some("editor")).len(), 2);
    assert_eq!(
        authz.blocked_operations(Some("editor")).into_iter().collect::<Vec<_>>(),
        vec!["delete_entry".to_string()]
    );
    assert_eq!(authz.role_keys()[1], "editor");
}

#[test]
fn test_policy_file_loading() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(POLICY_TOML.as_bytes()).unwrap();

    let authz = create_authorizer_from_file(file.path()).unwrap();
    assert!(authz.role("ops").is_some());
    assert_eq!(authz.default_role(), "reader");
}

#[test]
fn test_json_policy_file_loading() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    let body = serde_json::json!({
        "roles": { "bot": { "name": "Bot", "tools": ["get_system_info"] } },
        "credential_prefixes": [{ "prefix": "bot_", "role": "bot" }]
    });
    file.write_all(body.to_string().as_bytes()).unwrap();

    let authz = create_authorizer_from_file(file.path()).unwrap();
    assert_eq!(authz.resolve_role_from_credential("bot_1"), "bot");
    assert!(authz.is_allowed(Some("bot"), "get_system_info"));
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    match create_authorizer_from_file(&path) {
        Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn test_validate_flags_policy_mistakes() {
    let config = AuthzConfig::from_toml_str(POLICY_TOML)
        .unwrap()
        .with_credential_prefix("ghost_", "ghost");
    let authz = authorizer_with_env(config, &[]);

    let warnings = authz.validate();
    assert!(warnings.contains(&PolicyWarning::UnregisteredMappedRole {
        role: "ghost".to_string()
    }));
    assert!(
        !warnings
            .iter()
            .any(|w| matches!(w, PolicyWarning::UnregisteredDefaultRole { .. }))
    );
}
