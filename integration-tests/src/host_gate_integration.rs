//! The authorized tool host in front of a CMS-like backend

use crate::test_utils::*;
use parking_lot::Mutex;
use pulseengine_mcp_authz::{AuthorizedToolHost, AuthzConfig, FnObserver, HostError};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_viewer_listing_and_calls() {
    let authz = authorizer_with_env(AuthzConfig::default(), &[("AGENT_ROLE", "viewer")]);
    let host = AuthorizedToolHost::new(CmsHost::new(), authz);

    let listed = host.list_tools().await.unwrap();
    assert_eq!(listed.tools.len(), 13);
    assert!(listed.tools.iter().all(|tool| tool.name != "delete_entry"));

    let ok = host
        .call_tool("list_entries", Some(json!({"collection": "blog"})))
        .await
        .unwrap();
    assert!(!ok.is_error());

    let denied = host.call_tool("delete_entry", None).await.unwrap();
    assert!(denied.is_error());
    assert_eq!(
        denied.content[0].as_text(),
        Some("Access denied: tool 'delete_entry' is not permitted for role 'viewer'")
    );
    assert_eq!(host.inner().calls(), vec!["list_entries".to_string()]);
}

#[tokio::test]
async fn test_credential_switch_changes_visibility() {
    let (authz, env) = authorizer_with_handle(
        AuthzConfig::default().with_credential_prefix("sk_admin_", "admin"),
    );
    let host = AuthorizedToolHost::new(CmsHost::new(), authz);

    let before = host.list_tools().await.unwrap().tools.len();
    env.set("AGENT_API_KEY", "sk_admin_7f3a9c");
    let after = host.list_tools().await.unwrap().tools.len();

    assert_eq!(before, 13);
    assert_eq!(after, pulseengine_mcp_authz::KNOWN_OPERATIONS.len());
}

#[tokio::test]
async fn test_permitted_tool_missing_from_host() {
    let authz = authorizer_with_env(AuthzConfig::default(), &[("AGENT_ROLE", "admin")]);
    let host = AuthorizedToolHost::new(CmsHost::with_tools(["list_entries"]), authz);

    let result = host.call_tool("get_entry", None).await.unwrap();
    assert!(result.is_error());
    assert_eq!(result.content[0].as_text(), Some("Tool not found: get_entry"));
    assert!(host.inner().calls().is_empty());
}

#[tokio::test]
async fn test_host_failures_propagate_without_execution_event() {
    let authz = authorizer_with_env(AuthzConfig::default(), &[("AGENT_ROLE", "admin")]);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let sink = executed.clone();
    authz.add_observer(Arc::new(FnObserver::new().on_executed(move |tool, _| {
        sink.lock().push(tool.to_string());
    })));
    let host = AuthorizedToolHost::new(CmsHost::new(), authz);

    let err = host.call_tool("clear_cache", None).await.unwrap_err();
    assert!(matches!(err, HostError::Execution(_)));

    host.call_tool("get_system_info", None).await.unwrap();
    assert_eq!(*executed.lock(), vec!["get_system_info".to_string()]);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_policy() {
    let authz = authorizer_with_env(AuthzConfig::default(), &[("AGENT_ROLE", "editor")]);
    let host = Arc::new(AuthorizedToolHost::new(CmsHost::new(), authz.clone()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let host = host.clone();
        let authz = authz.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                authz.register_role(
                    format!("worker_{i}"),
                    pulseengine_mcp_authz::RoleDefinition::limited("Worker", ["list_entries"]),
                );
            }
            host.call_tool("update_entry", None).await.unwrap()
        }));
    }

    for handle in handles {
        assert!(!handle.await.unwrap().is_error());
    }
    assert_eq!(authz.role_keys().len(), 8);
}
