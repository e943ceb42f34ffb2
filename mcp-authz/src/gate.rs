//! Host integration
//!
//! The host owns its tool catalog and the tool implementations. It exposes
//! them through [`ToolHost`]; [`AuthorizedToolHost`] wraps that and applies
//! the authorizer at the two integration points: listing and invocation.

use crate::authorizer::Authorizer;
use crate::filter::NamedOperation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

/// Tool descriptor as returned to clients
///
/// `input_schema` is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Unique tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON schema for the tool arguments
    pub input_schema: Value,
}

impl Tool {
    /// Create a tool descriptor
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

impl NamedOperation for Tool {
    fn operation_name(&self) -> &str {
        &self.name
    }
}

/// List tools result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListToolsResult {
    /// Tools visible to the caller
    pub tools: Vec<Tool>,
}

/// Content types for tool responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Content {
    /// Plain text
    #[serde(rename = "text")]
    Text {
        /// Text payload
        text: String,
    },
}

impl Content {
    /// Text content
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Text payload, if this is text content
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
        }
    }
}

/// Tool call result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    /// Result content
    pub content: Vec<Content>,
    /// Whether the result is an error
    pub is_error: Option<bool>,
}

impl CallToolResult {
    /// Successful result with the given content
    pub fn success(content: Vec<Content>) -> Self {
        Self {
            content,
            is_error: Some(false),
        }
    }

    /// Error result with the given content
    pub fn error(content: Vec<Content>) -> Self {
        Self {
            content,
            is_error: Some(true),
        }
    }

    /// Successful result with a single text item
    pub fn text(text: impl Into<String>) -> Self {
        Self::success(vec![Content::text(text)])
    }

    /// Error result with a single text item
    pub fn error_text(text: impl Into<String>) -> Self {
        Self::error(vec![Content::text(text)])
    }

    /// Whether this result reports an error
    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }
}

/// Errors a host can report
#[derive(Debug, Error)]
pub enum HostError {
    /// The host does not know the tool
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// The tool ran and failed
    #[error("Tool execution failed: {0}")]
    Execution(String),

    /// The host itself failed
    #[error("Internal host error: {0}")]
    Internal(String),
}

impl HostError {
    /// Tool not found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Tool execution error
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Internal host error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// The host's tool catalog and executor
#[async_trait]
pub trait ToolHost: Send + Sync {
    /// Every tool the host offers, unfiltered
    async fn list_tools(&self) -> Result<Vec<Tool>, HostError>;

    /// Run a tool
    async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<CallToolResult, HostError>;

    /// Whether the catalog contains `name`
    async fn has_tool(&self, name: &str) -> Result<bool, HostError> {
        Ok(self.list_tools().await?.iter().any(|tool| tool.name == name))
    }
}

/// A [`ToolHost`] behind an [`Authorizer`]
pub struct AuthorizedToolHost<H> {
    host: H,
    authorizer: Arc<Authorizer>,
}

impl<H: ToolHost> AuthorizedToolHost<H> {
    /// Wrap `host` behind `authorizer`
    pub fn new(host: H, authorizer: Arc<Authorizer>) -> Self {
        Self { host, authorizer }
    }

    /// The authorizer applied to every call
    pub fn authorizer(&self) -> &Arc<Authorizer> {
        &self.authorizer
    }

    /// The wrapped host
    pub fn inner(&self) -> &H {
        &self.host
    }

    /// Tools the resolved role may see, in host catalog order
    #[instrument(skip(self))]
    pub async fn list_tools(&self) -> Result<ListToolsResult, HostError> {
        let catalog = self.host.list_tools().await?;
        let total = catalog.len();

        let visible: Vec<(String, Tool)> = self.authorizer.filter(
            catalog.into_iter().map(|tool| (tool.name.clone(), tool)),
            None,
        );
        debug!(total, visible = visible.len(), "Filtered tool listing");

        Ok(ListToolsResult {
            tools: visible.into_iter().map(|(_, tool)| tool).collect(),
        })
    }

    /// Invoke a tool if the resolved role may use it
    ///
    /// A denial is returned as an error result naming the tool and role; the
    /// host is not called. A permitted name the host does not know yields a
    /// separate "not found" error result.
    #[instrument(skip(self, arguments))]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<CallToolResult, HostError> {
        let decision = self.authorizer.check_invocation(name);
        if !decision.allowed {
            return Ok(CallToolResult::error_text(decision.denial_message()));
        }

        if !self.host.has_tool(name).await? {
            debug!(tool = %name, "Permitted tool is not in the host catalog");
            return Ok(CallToolResult::error_text(
                HostError::not_found(name).to_string(),
            ));
        }

        match self.host.call_tool(name, arguments).await {
            Ok(result) => {
                self.authorizer.record_execution(name, &decision.role);
                Ok(result)
            }
            Err(HostError::NotFound(missing)) => Ok(CallToolResult::error_text(
                HostError::NotFound(missing).to_string(),
            )),
            Err(err) => Err(err),
        }
    }
}
