//! End-to-end scenarios against the built-in policy

use crate::test_utils::*;
use pulseengine_mcp_authz::{
    AuthzConfig, FnObserver, KNOWN_OPERATIONS, RoleDefinition, ResolutionSource,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[test]
fn test_editor_role_scenario() {
    let authz = authorizer_with_env(AuthzConfig::default(), &[]);

    assert!(authz.is_allowed(Some("editor"), "list_entries"));
    assert!(!authz.is_allowed(Some("editor"), "create_user"));
    assert_eq!(authz.allowed_operations(Some("editor")).len(), 26);
    assert!(authz.blocked_operations(Some("editor")).contains("create_user"));
}

#[test]
fn test_viewer_role_scenario() {
    let authz = authorizer_with_env(AuthzConfig::default(), &[]);

    assert_eq!(authz.allowed_operations(Some("viewer")).len(), 13);
    assert!(!authz.is_allowed(Some("viewer"), "delete_entry"));
}

#[test]
fn test_admin_sees_entire_universe() {
    let authz = authorizer_with_env(AuthzConfig::default(), &[("AGENT_ROLE", "admin")]);

    let allowed = authz.allowed_operations(None);
    assert_eq!(allowed.len(), KNOWN_OPERATIONS.len());
    assert!(authz.is_allowed(None, "a_tool_nobody_has_heard_of"));
    assert!(authz.blocked_operations(None).is_empty());
}

#[test]
fn test_runtime_role_does_not_disturb_others() {
    let authz = authorizer_with_env(AuthzConfig::default(), &[]);
    let editor_before = authz.allowed_operations(Some("editor"));

    authz.register_role("tester", RoleDefinition::limited("Tester", ["list_entries"]));

    assert!(authz.is_allowed(Some("tester"), "list_entries"));
    assert!(!authz.is_allowed(Some("tester"), "create_user"));
    assert_eq!(authz.allowed_operations(Some("editor")), editor_before);
    assert_eq!(authz.role_keys(), vec!["admin", "editor", "author", "viewer", "tester"]);
}

#[test]
fn test_role_claim_beats_credential() {
    let config = AuthzConfig::default().with_credential_prefix("admin_", "admin");
    let authz = authorizer_with_env(
        config,
        &[("AGENT_ROLE", "author"), ("AGENT_API_KEY", "admin_abc123xyz")],
    );

    let resolution = authz.resolve();
    assert_eq!(resolution.role, "author");
    assert_eq!(resolution.source, ResolutionSource::RoleClaim);
}

#[test]
fn test_unregistered_claim_falls_through_to_credential() {
    let config = AuthzConfig::default().with_credential_prefix("admin_", "admin");
    let authz = authorizer_with_env(
        config,
        &[("AGENT_ROLE", "superuser"), ("AGENT_API_KEY", "admin_abc123xyz")],
    );

    assert_eq!(authz.resolve_role(), "admin");
    let auth = authz.authenticate();
    assert!(auth.authenticated);
    assert!(auth.identity.unwrap().starts_with("api_key:"));
}

#[test]
fn test_identity_changes_between_calls() {
    let (authz, env) = authorizer_with_handle(AuthzConfig::default());
    assert_eq!(authz.resolve_role(), "viewer");
    assert!(!authz.is_allowed(None, "create_entry"));

    env.set("AGENT_ROLE", "author");
    assert_eq!(authz.resolve_role(), "author");
    assert!(authz.is_allowed(None, "create_entry"));

    env.clear();
    assert_eq!(authz.resolve_role(), "viewer");
}

#[test]
fn test_default_role_may_be_unregistered() {
    let authz = authorizer_with_env(AuthzConfig::default().with_default_role("guest"), &[]);

    assert_eq!(authz.resolve_role(), "guest");
    assert!(authz.allowed_operations(None).is_empty());
    assert!(!authz.is_allowed(None, "list_entries"));

    let auth = authz.authenticate();
    assert!(!auth.authenticated);
    assert_eq!(auth.error.as_deref(), Some("Unknown role: guest"));
}

#[test]
fn test_filter_map_for_resolved_role() {
    let authz = authorizer_with_env(AuthzConfig::default(), &[("AGENT_ROLE", "viewer")]);
    let handlers: HashMap<&str, usize> = KNOWN_OPERATIONS
        .iter()
        .enumerate()
        .map(|(i, name)| (*name, i))
        .collect();

    let visible: BTreeMap<&str, usize> = authz.filter(handlers.clone(), None);
    assert_eq!(visible.len(), 13);
    for (name, index) in &visible {
        assert_eq!(handlers[name], *index);
    }

    let none: BTreeMap<&str, usize> = authz.filter(handlers, Some("nobody"));
    assert!(none.is_empty());
}

#[test]
fn test_agent_summary_for_each_builtin_role() {
    let (authz, env) = authorizer_with_handle(AuthzConfig::default());
    for (role, allowed) in [("editor", 26), ("author", 12), ("viewer", 13)] {
        env.set("AGENT_ROLE", role);
        let summary = authz.agent_summary();
        assert_eq!(summary.role, role);
        assert_eq!(summary.allowed_count, allowed);
        assert!(summary.blocked_count > 0);
    }
}

#[test]
fn test_denials_reach_observers() {
    let authz = authorizer_with_env(AuthzConfig::default(), &[("AGENT_ROLE", "viewer")]);
    let denied = Arc::new(Mutex::new(Vec::new()));
    let sink = denied.clone();
    authz.add_observer(Arc::new(FnObserver::new().on_denied(move |tool, role| {
        sink.lock().push(format!("{role}:{tool}"));
    })));

    assert!(authz.check_invocation("list_entries").allowed);
    assert!(!authz.check_invocation("delete_user").allowed);

    assert_eq!(*denied.lock(), vec!["viewer:delete_user".to_string()]);
}
