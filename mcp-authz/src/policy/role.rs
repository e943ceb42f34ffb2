//! Role definitions
//!
//! A role is a named bundle of tool permissions. Permission is a flat
//! set-membership test of (role, tool name); there are no expressions,
//! attributes or resource scopes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Keyword accepted in configuration files for the wildcard grant
pub const ALL_TOOLS_KEYWORD: &str = "all";

/// Advisory access tier attached to a role
///
/// `Full` is metadata shown during introspection. It does not grant anything
/// on its own; only [`PermittedOperations::All`] does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Shown as full access
    Full,
    /// Shown as limited access
    #[default]
    Limited,
}

impl AccessLevel {
    /// Lowercase name used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Limited => "limited",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The set of tools a role may list and invoke
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PermittedRepr", into = "PermittedRepr")]
pub enum PermittedOperations {
    /// Every current and future known tool
    All,
    /// Exactly the named tools
    Only(BTreeSet<String>),
}

impl PermittedOperations {
    /// Build an explicit grant from any list of tool names
    pub fn only<I, S>(tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(tools.into_iter().map(Into::into).collect())
    }

    /// Whether this is the wildcard grant
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Membership test; always true for the wildcard
    pub fn permits(&self, tool: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(tools) => tools.contains(tool),
        }
    }
}

impl Default for PermittedOperations {
    fn default() -> Self {
        Self::Only(BTreeSet::new())
    }
}

/// On-disk shape: either the `"all"` keyword or a list of tool names
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PermittedRepr {
    Keyword(String),
    List(BTreeSet<String>),
}

impl TryFrom<PermittedRepr> for PermittedOperations {
    type Error = String;

    fn try_from(repr: PermittedRepr) -> Result<Self, Self::Error> {
        match repr {
            PermittedRepr::Keyword(word) if word == ALL_TOOLS_KEYWORD => Ok(Self::All),
            PermittedRepr::Keyword(word) => Err(format!(
                "expected \"{ALL_TOOLS_KEYWORD}\" or a list of tool names, got \"{word}\""
            )),
            PermittedRepr::List(tools) => Ok(Self::Only(tools)),
        }
    }
}

impl From<PermittedOperations> for PermittedRepr {
    fn from(value: PermittedOperations) -> Self {
        match value {
            PermittedOperations::All => Self::Keyword(ALL_TOOLS_KEYWORD.to_string()),
            PermittedOperations::Only(tools) => Self::List(tools),
        }
    }
}

/// A role as stored in the policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Human-readable label
    #[serde(default)]
    pub name: String,

    /// Human-readable summary
    #[serde(default)]
    pub description: String,

    /// Advisory access tier
    #[serde(default)]
    pub access_level: AccessLevel,

    /// Tools this role may use
    #[serde(default)]
    pub tools: PermittedOperations,

    /// Tools documented as off-limits for this role
    ///
    /// Author-supplied and purely informational: it is never consulted when
    /// deciding access and is never derived from the known-tool universe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_tools: Option<BTreeSet<String>>,
}

impl RoleDefinition {
    /// A role granted every known tool, with the `full` access tier
    pub fn wildcard(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            access_level: AccessLevel::Full,
            tools: PermittedOperations::All,
            blocked_tools: None,
        }
    }

    /// A role granted exactly `tools`, with the `limited` access tier
    pub fn limited<I, S>(name: impl Into<String>, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: String::new(),
            access_level: AccessLevel::Limited,
            tools: PermittedOperations::only(tools),
            blocked_tools: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the access tier
    pub fn with_access_level(mut self, access_level: AccessLevel) -> Self {
        self.access_level = access_level;
        self
    }

    /// Attach a documented-blocked list
    pub fn with_blocked<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_tools = Some(tools.into_iter().map(Into::into).collect());
        self
    }

    /// Whether the role is granted every known tool
    pub fn is_wildcard(&self) -> bool {
        self.tools.is_wildcard()
    }
}

/// Maps a literal credential prefix to a role key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialMapping {
    /// Literal prefix of the credential
    pub prefix: String,
    /// Role key the prefix maps to
    pub role: String,
}

impl CredentialMapping {
    /// Create a mapping
    pub fn new(prefix: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            role: role.into(),
        }
    }
}
