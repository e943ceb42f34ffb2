//! Tests for the authorized tool host

use crate::authorizer::Authorizer;
use crate::config::AuthzConfig;
use crate::gate::*;
use crate::identity::StaticEnvironment;
use crate::observer::FnObserver;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Default)]
struct RecordingHost {
    tools: Vec<Tool>,
    calls: Mutex<Vec<String>>,
}

impl RecordingHost {
    fn with_tools(names: &[&str]) -> Self {
        Self {
            tools: names
                .iter()
                .map(|name| Tool::new(*name, format!("{name} tool"), json!({"type": "object", "title": name})))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ToolHost for RecordingHost {
    async fn list_tools(&self) -> Result<Vec<Tool>, HostError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Option<Value>) -> Result<CallToolResult, HostError> {
        self.calls.lock().push(name.to_string());
        match name {
            "explode" => Err(HostError::execution("boom")),
            "crash" => Err(HostError::internal("catalog unavailable")),
            _ => Ok(CallToolResult::text(format!(
                "{name} ran with {}",
                arguments.unwrap_or(Value::Null)
            ))),
        }
    }
}

fn gated(
    names: &[&str],
    env: StaticEnvironment,
    config: AuthzConfig,
) -> AuthorizedToolHost<RecordingHost> {
    let authz = Arc::new(Authorizer::with_ambient(config, Arc::new(env)));
    AuthorizedToolHost::new(RecordingHost::with_tools(names), authz)
}

#[tokio::test]
async fn test_list_tools_filters_and_preserves_schemas() {
    let host = gated(
        &["create_user", "list_entries", "delete_entry", "get_entry"],
        StaticEnvironment::new(),
        AuthzConfig::default(),
    );

    let listing = host.list_tools().await.unwrap();
    let names: Vec<&str> = listing.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["list_entries", "get_entry"]);
    assert_eq!(listing.tools[0].input_schema["title"], "list_entries");
}

#[tokio::test]
async fn test_denied_call_is_not_delegated() {
    let host = gated(&["create_user"], StaticEnvironment::new(), AuthzConfig::default());

    let result = host.call_tool("create_user", None).await.unwrap();
    assert!(result.is_error());
    let text = result.content[0].as_text().unwrap();
    assert!(text.contains("create_user"));
    assert!(text.contains("viewer"));
    assert!(host.inner().calls.lock().is_empty());
}

#[tokio::test]
async fn test_permitted_call_is_delegated_and_observed() {
    let env = StaticEnvironment::new().with("AGENT_ROLE", "editor");
    let host = gated(&["delete_entry"], env, AuthzConfig::default());
    let executed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&executed);
    host.authorizer().add_observer(Arc::new(FnObserver::new().on_executed(move |tool, role| {
        sink.lock().push(format!("{tool}@{role}"));
    })));

    let result = host
        .call_tool("delete_entry", Some(json!({"id": 7})))
        .await
        .unwrap();
    assert!(!result.is_error());
    assert_eq!(result.content[0].as_text(), Some("delete_entry ran with {\"id\":7}"));
    assert_eq!(*host.inner().calls.lock(), vec!["delete_entry"]);
    assert_eq!(*executed.lock(), vec!["delete_entry@editor"]);
}

#[tokio::test]
async fn test_permitted_but_missing_tool_is_distinct_from_denial() {
    let env = StaticEnvironment::new().with("AGENT_ROLE", "admin");
    let host = gated(&["list_entries"], env, AuthzConfig::default());

    let result = host.call_tool("publish_entry", None).await.unwrap();
    assert!(result.is_error());
    assert_eq!(result.content[0].as_text(), Some("Tool not found: publish_entry"));
    assert!(host.inner().calls.lock().is_empty());
}

#[tokio::test]
async fn test_host_failures_propagate() {
    let env = StaticEnvironment::new().with("AGENT_ROLE", "admin");
    let host = gated(&["explode"], env, AuthzConfig::default());

    let err = host.call_tool("explode", None).await.unwrap_err();
    assert!(matches!(err, HostError::Execution(_)));
    assert_eq!(err.to_string(), "Tool execution failed: boom");
}

#[tokio::test]
async fn test_internal_host_errors_propagate_without_execution_event() {
    let env = StaticEnvironment::new().with("AGENT_ROLE", "admin");
    let host = gated(&["crash"], env, AuthzConfig::default());
    let executed = Arc::new(Mutex::new(Vec::new()));
    let sink = executed.clone();
    host.authorizer().add_observer(Arc::new(FnObserver::new().on_executed(move |tool, _| {
        sink.lock().push(tool.to_string());
    })));

    let err = host.call_tool("crash", None).await.unwrap_err();
    assert!(matches!(err, HostError::Internal(_)));
    assert_eq!(err.to_string(), "Internal host error: catalog unavailable");
    assert!(executed.lock().is_empty());
}

#[tokio::test]
async fn test_credential_switches_listing() {
    let env = Arc::new(StaticEnvironment::new());
    let authz = Arc::new(Authorizer::with_ambient(
        AuthzConfig::default().with_credential_prefix("admin_", "admin"),
        env.clone(),
    ));
    let host = AuthorizedToolHost::new(
        RecordingHost::with_tools(&["list_entries", "create_user"]),
        authz,
    );

    assert_eq!(host.list_tools().await.unwrap().tools.len(), 1);
    env.set("AGENT_API_KEY", "admin_0123456789abcdef");
    assert_eq!(host.list_tools().await.unwrap().tools.len(), 2);
}

#[test]
fn test_call_result_wire_shape() {
    let value = serde_json::to_value(CallToolResult::error_text("nope")).unwrap();
    assert_eq!(value, json!({"content": [{"type": "text", "text": "nope"}], "isError": true}));

    let tool = serde_json::to_value(Tool::new("get_entry", "Get", json!({}))).unwrap();
    assert_eq!(tool["inputSchema"], json!({}));
}
