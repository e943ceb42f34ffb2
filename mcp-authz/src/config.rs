//! Authorizer configuration
//!
//! Every field is optional. A TOML file looks like:
//!
//! ```toml
//! default_role = "viewer"
//! role_env_var = "AGENT_ROLE"
//! api_key_env_var = "AGENT_API_KEY"
//!
//! [roles.reviewer]
//! name = "Reviewer"
//! description = "Reads drafts"
//! tools = ["list_entries", "get_entry"]
//!
//! [[credential_prefixes]]
//! prefix = "rev_"
//! role = "reviewer"
//! ```

use crate::error::ConfigError;
use crate::identity::{DEFAULT_API_KEY_ENV_VAR, DEFAULT_ROLE_ENV_VAR};
use crate::policy::{CredentialMapping, DEFAULT_ROLE, RoleDefinition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Construction-time configuration for an [`Authorizer`](crate::Authorizer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthzConfig {
    /// Roles merged over the built-in defaults; these win on key collision
    pub roles: BTreeMap<String, RoleDefinition>,

    /// Role used when nothing else resolves
    pub default_role: String,

    /// Credential prefix mappings, scanned in this order
    pub credential_prefixes: Vec<CredentialMapping>,

    /// Replaces the built-in tool universe when set
    pub known_operations: Option<Vec<String>>,

    /// Name of the role-claim variable
    pub role_env_var: String,

    /// Name of the credential variable
    pub api_key_env_var: String,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            roles: BTreeMap::new(),
            default_role: DEFAULT_ROLE.to_string(),
            credential_prefixes: Vec::new(),
            known_operations: None,
            role_env_var: DEFAULT_ROLE_ENV_VAR.to_string(),
            api_key_env_var: DEFAULT_API_KEY_ENV_VAR.to_string(),
        }
    }
}

impl AuthzConfig {
    /// Parse a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.check()?;
        Ok(config)
    }

    /// Parse a JSON document
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.check()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are parsed as JSON, anything else as TOML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_toml_str(&contents),
        }
    }

    /// Serialize as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Add or replace a role override
    pub fn with_role(mut self, key: impl Into<String>, definition: RoleDefinition) -> Self {
        self.roles.insert(key.into(), definition);
        self
    }

    /// Set the fallback role
    pub fn with_default_role(mut self, role: impl Into<String>) -> Self {
        self.default_role = role.into();
        self
    }

    /// Append a credential prefix mapping
    pub fn with_credential_prefix(mut self, prefix: impl Into<String>, role: impl Into<String>) -> Self {
        self.credential_prefixes
            .push(CredentialMapping::new(prefix, role));
        self
    }

    /// Replace the built-in tool universe
    pub fn with_known_operations<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_operations = Some(tools.into_iter().map(Into::into).collect());
        self
    }

    /// Set the role-claim and credential variable names
    pub fn with_env_vars(mut self, role_var: impl Into<String>, api_key_var: impl Into<String>) -> Self {
        self.role_env_var = role_var.into();
        self.api_key_env_var = api_key_var.into();
        self
    }

    /// Reject settings that would make resolution meaningless
    ///
    /// Unknown role keys and tool names are accepted.
    fn check(&self) -> Result<(), ConfigError> {
        if self.default_role.is_empty() {
            return Err(ConfigError::invalid("default_role must not be empty"));
        }
        if self.role_env_var.is_empty() || self.api_key_env_var.is_empty() {
            return Err(ConfigError::invalid(
                "role_env_var and api_key_env_var must not be empty",
            ));
        }
        if let Some(mapping) = self.credential_prefixes.iter().find(|m| m.prefix.is_empty()) {
            return Err(ConfigError::invalid(format!(
                "credential prefix for role '{}' must not be empty",
                mapping.role
            )));
        }
        Ok(())
    }
}
