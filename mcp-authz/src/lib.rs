//! # MCP Tool Authorization
//!
//! Role-based authorization for MCP tool servers. Given an identity signal
//! (a role claim or an API key) the authorizer decides which tools that
//! identity may list and invoke.
//!
//! ## Quick Start
//!
//! ```rust
//! use pulseengine_mcp_authz::{Authorizer, AuthzConfig, RoleDefinition};
//!
//! let authz = Authorizer::new(
//!     AuthzConfig::default().with_credential_prefix("admin_", "admin"),
//! );
//!
//! assert!(authz.is_allowed(Some("editor"), "list_entries"));
//! assert!(!authz.is_allowed(Some("editor"), "create_user"));
//! assert_eq!(authz.resolve_role_from_credential("admin_abc123xyz"), "admin");
//!
//! // Extend the policy at runtime
//! authz.register_role("tester", RoleDefinition::limited("Tester", ["list_entries"]));
//! assert!(authz.is_allowed(Some("tester"), "list_entries"));
//! ```
//!
//! ## Role resolution
//!
//! The effective role is re-resolved on every call:
//!
//! 1. `AGENT_ROLE`, if it names a registered role
//! 2. `AGENT_API_KEY`, mapped through the credential prefix table
//! 3. the default role (`viewer`)
//!
//! ## Host integration
//!
//! Hosts implement [`ToolHost`] and wrap it in [`AuthorizedToolHost`], which
//! filters `tools/list` and gates `tools/call`.

#![deny(missing_docs)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::new_without_default)]

pub mod authorizer;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod filter;
pub mod gate;
pub mod identity;
pub mod logging;
pub mod observer;
pub mod policy;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod gate_tests;

// Re-export main types
pub use authorizer::{
    API_KEY_IDENTITY_PREFIX, AccessDecision, AgentSummary, AuthResult, Authorizer,
    ENV_ROLE_IDENTITY, PolicyWarning, RoleSummary,
};
pub use config::AuthzConfig;
pub use error::{ConfigError, LoggingError};
pub use evaluator::PermissionEvaluator;
pub use filter::{CollectionFilter, NamedOperation};
pub use gate::{
    AuthorizedToolHost, CallToolResult, Content, HostError, ListToolsResult, Tool, ToolHost,
};
pub use identity::{
    AmbientSource, EffectiveIdentity, IdentityResolver, ProcessEnvironment, Resolution,
    ResolutionSource, StaticEnvironment, credential_digest,
};
pub use logging::{LogFormat, LoggingConfig};
pub use observer::{AccessObserver, FnObserver, TracingObserver};
pub use policy::{
    AccessLevel, CredentialMapping, KNOWN_OPERATIONS, PermittedOperations, PolicyStore,
    RoleDefinition,
};

/// Create an authorizer reading identity from the process environment
pub fn create_authorizer(config: AuthzConfig) -> Authorizer {
    Authorizer::new(config)
}

/// Create an authorizer from a TOML or JSON configuration file
pub fn create_authorizer_from_file(
    path: impl AsRef<std::path::Path>,
) -> Result<Authorizer, ConfigError> {
    Ok(Authorizer::new(AuthzConfig::from_file(path)?))
}
