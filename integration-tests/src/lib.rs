//! Integration tests for the PulseEngine MCP tool authorization crate
//!
//! These exercise the public API the way an embedding server would: load a
//! configuration, resolve identities from an ambient source and gate a tool
//! host.

#![allow(unused_imports)] // Allow unused imports in integration tests
#![allow(clippy::uninlined_format_args)] // Allow traditional format strings in tests

pub mod config_integration;
pub mod end_to_end_scenarios;
pub mod host_gate_integration;

/// Common test utilities for integration tests
pub mod test_utils {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pulseengine_mcp_authz::{
        AuthzConfig, Authorizer, CallToolResult, HostError, KNOWN_OPERATIONS, StaticEnvironment,
        Tool, ToolHost,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;

    /// An authorizer whose identity comes from the given variables
    pub fn authorizer_with_env(config: AuthzConfig, vars: &[(&str, &str)]) -> Arc<Authorizer> {
        let env: StaticEnvironment = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Arc::new(Authorizer::with_ambient(config, Arc::new(env)))
    }

    /// An authorizer together with a handle for changing its environment
    pub fn authorizer_with_handle(config: AuthzConfig) -> (Arc<Authorizer>, Arc<StaticEnvironment>) {
        let env = Arc::new(StaticEnvironment::new());
        let authz = Arc::new(Authorizer::with_ambient(config, env.clone()));
        (authz, env)
    }

    /// A CMS-like host that serves every built-in tool and records calls
    #[derive(Default)]
    pub struct CmsHost {
        tools: Vec<Tool>,
        calls: Mutex<Vec<String>>,
    }

    impl CmsHost {
        pub fn new() -> Self {
            Self::with_tools(KNOWN_OPERATIONS.iter().copied())
        }

        pub fn with_tools<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
            Self {
                tools: names
                    .into_iter()
                    .map(|name| {
                        Tool::new(
                            name,
                            format!("CMS operation {name}"),
                            json!({"type": "object", "properties": {}}),
                        )
                    })
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl ToolHost for CmsHost {
        async fn list_tools(&self) -> Result<Vec<Tool>, HostError> {
            Ok(self.tools.clone())
        }

        async fn call_tool(
            &self,
            name: &str,
            arguments: Option<Value>,
        ) -> Result<CallToolResult, HostError> {
            self.calls.lock().push(name.to_string());
            if name == "clear_cache" {
                return Err(HostError::execution("cache backend unavailable"));
            }
            Ok(CallToolResult::text(format!(
                "{name}: {}",
                arguments.unwrap_or(Value::Null)
            )))
        }
    }
}
