//! Authorization facade
//!
//! [`Authorizer`] is the single object a host integrates against. It owns
//! the policy store, resolves the effective role from its ambient source on
//! every call and answers listing and invocation questions for it.
//!
//! There is no process-wide instance. Build one at startup and pass it (or
//! an `Arc` of it) to whatever needs it.

use crate::config::AuthzConfig;
use crate::evaluator::PermissionEvaluator;
use crate::filter::{CollectionFilter, NamedOperation};
use crate::identity::{
    AmbientSource, EffectiveIdentity, IdentityResolver, ProcessEnvironment, Resolution,
    ResolutionSource,
};
use crate::observer::AccessObserver;
use crate::policy::{
    AccessLevel, CredentialMapping, PermittedOperations, PolicyStore, RoleDefinition,
    default_roles, known_operations,
};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Identity tag reported when the role came from the role claim or the default
pub const ENV_ROLE_IDENTITY: &str = "env_role";

/// Prefix of the identity tag reported when a credential was consulted
pub const API_KEY_IDENTITY_PREFIX: &str = "api_key:";

/// The resolved role for the current caller, with counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    /// Resolved role key
    pub role: String,
    /// Display name of the role, or of the default role when unregistered
    pub name: String,
    /// Description of the role, or of the default role when unregistered
    pub description: String,
    /// Number of tools the resolved role may use
    pub allowed_count: usize,
    /// Number of tools documented as blocked
    pub blocked_count: usize,
}

/// One registered role, with its tool count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    /// Role key
    pub key: String,
    /// Display name
    pub name: String,
    /// Human-readable summary
    pub description: String,
    /// Advisory access tier
    pub access_level: AccessLevel,
    /// Number of tools the role may use
    pub tool_count: usize,
}

/// Outcome of [`Authorizer::authenticate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResult {
    /// Whether the resolved role is registered
    pub authenticated: bool,
    /// Resolved role key when authenticated
    pub role: Option<String>,
    /// `api_key:<digest>` or `env_role` when authenticated
    pub identity: Option<String>,
    /// Failure reason when not authenticated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Decision for a single tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    /// Tool that was requested
    pub tool: String,
    /// Role the decision was made for
    pub role: String,
    /// Whether the invocation may proceed
    pub allowed: bool,
}

impl AccessDecision {
    /// User-facing text for a refused invocation
    pub fn denial_message(&self) -> String {
        format!(
            "Access denied: tool '{}' is not permitted for role '{}'",
            self.tool, self.role
        )
    }
}

/// Advisory finding from [`Authorizer::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyWarning {
    /// A role grants a tool outside the known-tool universe
    UnknownTool {
        /// Role granting the tool
        role: String,
        /// Tool name missing from the universe
        tool: String,
    },
    /// A credential prefix points at a role that is not registered
    UnregisteredMappedRole {
        /// Role the prefix points at
        role: String,
    },
    /// The default role is not registered
    UnregisteredDefaultRole {
        /// Configured default role
        role: String,
    },
}

impl fmt::Display for PolicyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTool { role, tool } => {
                write!(f, "role '{role}' grants unknown tool '{tool}'")
            }
            Self::UnregisteredMappedRole { role } => {
                write!(f, "credential prefix maps to unregistered role '{role}'")
            }
            Self::UnregisteredDefaultRole { role } => {
                write!(f, "default role '{role}' is not registered")
            }
        }
    }
}

/// Role-based tool authorizer
pub struct Authorizer {
    store: PolicyStore,
    resolver: IdentityResolver,
    known_operations: Vec<String>,
    ambient: Arc<dyn AmbientSource>,
    observers: RwLock<Vec<Arc<dyn AccessObserver>>>,
}

impl Authorizer {
    /// Create an authorizer reading identity from the process environment
    pub fn new(config: AuthzConfig) -> Self {
        Self::with_ambient(config, Arc::new(ProcessEnvironment))
    }

    /// Create an authorizer reading identity from `ambient`
    pub fn with_ambient(config: AuthzConfig, ambient: Arc<dyn AmbientSource>) -> Self {
        let AuthzConfig {
            roles,
            default_role,
            credential_prefixes,
            known_operations: universe,
            role_env_var,
            api_key_env_var,
        } = config;

        let store = PolicyStore::seeded(default_roles(), roles, credential_prefixes);
        let resolver = IdentityResolver::new(role_env_var, api_key_env_var, default_role);
        let mut known_operations = universe.unwrap_or_else(known_operations);
        let mut seen = HashSet::new();
        known_operations.retain(|tool| seen.insert(tool.clone()));

        debug!(
            default_role = %resolver.default_role(),
            known_operations = known_operations.len(),
            "Created authorizer"
        );

        Self {
            store,
            resolver,
            known_operations,
            ambient,
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Direct access to the underlying policy store
    pub fn store(&self) -> &PolicyStore {
        &self.store
    }

    /// Tool universe used to expand wildcard grants, duplicates removed
    pub fn known_operations(&self) -> &[String] {
        &self.known_operations
    }

    /// Role used when nothing else resolves
    pub fn default_role(&self) -> &str {
        self.resolver.default_role()
    }

    /// Cloned definition for `key`
    pub fn role(&self, key: &str) -> Option<RoleDefinition> {
        self.store.role(key)
    }

    /// Registered role keys in registration order
    pub fn role_keys(&self) -> Vec<String> {
        self.store.role_keys()
    }

    /// Credential mappings in registration order
    pub fn credential_mappings(&self) -> Vec<CredentialMapping> {
        self.store.credential_mappings()
    }

    /// Add or replace a role at runtime
    pub fn register_role(
        &self,
        key: impl Into<String>,
        definition: RoleDefinition,
    ) -> Option<RoleDefinition> {
        self.store.register_role(key, definition)
    }

    /// Add or replace a credential prefix mapping at runtime
    pub fn map_credential_prefix(
        &self,
        prefix: impl Into<String>,
        role: impl Into<String>,
    ) -> Option<String> {
        self.store.map_credential_prefix(prefix, role)
    }

    /// Register an observer for invocation decisions
    pub fn add_observer(&self, observer: Arc<dyn AccessObserver>) {
        self.observers.write().push(observer);
    }

    /// Full resolution result for the current ambient inputs
    pub fn resolve(&self) -> Resolution {
        self.resolver.resolve(&self.store.read(), self.ambient.as_ref())
    }

    /// Effective role key for the current ambient inputs
    pub fn resolve_role(&self) -> String {
        self.resolve().role
    }

    /// Resolved role and credential digest for the current ambient inputs
    pub fn resolve_identity(&self) -> EffectiveIdentity {
        self.resolve().identity()
    }

    /// Role a credential maps to, or the default role
    pub fn resolve_role_from_credential(&self, credential: &str) -> String {
        self.resolver
            .resolve_from_credential(&self.store.read(), credential)
    }

    /// Whether `role` (or the resolved role when `None`) may use `tool`
    pub fn is_allowed(&self, role: Option<&str>, tool: &str) -> bool {
        let policy = self.store.read();
        let role = self.role_or_resolved(&policy, role);
        PermissionEvaluator::new(&policy, &self.known_operations).is_allowed(&role, tool)
    }

    /// Tools `role` (or the resolved role when `None`) may use
    pub fn allowed_operations(&self, role: Option<&str>) -> BTreeSet<String> {
        let policy = self.store.read();
        let role = self.role_or_resolved(&policy, role);
        PermissionEvaluator::new(&policy, &self.known_operations).allowed_operations(&role)
    }

    /// Documented-blocked tools; see
    /// [`PermissionEvaluator::blocked_operations`]
    pub fn blocked_operations(&self, role: Option<&str>) -> BTreeSet<String> {
        let policy = self.store.read();
        let role = self.role_or_resolved(&policy, role);
        PermissionEvaluator::new(&policy, &self.known_operations).blocked_operations(&role)
    }

    /// Filter a keyed collection for `role` (or the resolved role)
    pub fn filter<K, V, I, B>(&self, collection: I, role: Option<&str>) -> B
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        B: FromIterator<(K, V)>,
    {
        let policy = self.store.read();
        let role = self.role_or_resolved(&policy, role);
        CollectionFilter::new(&policy).filter(collection, &role)
    }

    /// Filter a slice of named entries for `role` (or the resolved role)
    pub fn filter_named<'c, T: NamedOperation>(
        &self,
        entries: &'c [T],
        role: Option<&str>,
    ) -> Vec<&'c T> {
        let policy = self.store.read();
        let role = self.role_or_resolved(&policy, role);
        CollectionFilter::new(&policy).filter_named(entries, &role)
    }

    /// Summary of the resolved role for the current caller
    ///
    /// Name and description fall back to the default role's when the
    /// resolved role is unregistered; counts always describe the resolved role.
    pub fn agent_summary(&self) -> AgentSummary {
        let policy = self.store.read();
        let role = self
            .resolver
            .resolve(&policy, self.ambient.as_ref())
            .role;
        let evaluator = PermissionEvaluator::new(&policy, &self.known_operations);

        let (name, description) = policy
            .role(&role)
            .or_else(|| policy.role(self.resolver.default_role()))
            .map(|definition| (definition.name.clone(), definition.description.clone()))
            .unwrap_or_else(|| (role.clone(), String::new()));

        AgentSummary {
            allowed_count: evaluator.tool_count(&role),
            blocked_count: evaluator.blocked_count(&role),
            role,
            name,
            description,
        }
    }

    /// Every registered role in registration order
    pub fn all_role_summaries(&self) -> Vec<RoleSummary> {
        let policy = self.store.read();
        let evaluator = PermissionEvaluator::new(&policy, &self.known_operations);
        policy
            .roles()
            .map(|(key, definition)| RoleSummary {
                key: key.to_string(),
                name: definition.name.clone(),
                description: definition.description.clone(),
                access_level: definition.access_level,
                tool_count: evaluator.tool_count(key),
            })
            .collect()
    }

    /// Authenticate the current caller
    ///
    /// Fails only when the resolved role is unregistered.
    pub fn authenticate(&self) -> AuthResult {
        let policy = self.store.read();
        let resolution = self.resolver.resolve(&policy, self.ambient.as_ref());

        if !policy.contains_role(&resolution.role) {
            warn!(role = %resolution.role, "Authentication failed for unregistered role");
            return AuthResult {
                authenticated: false,
                role: None,
                identity: None,
                error: Some(format!("Unknown role: {}", resolution.role)),
            };
        }

        let identity = match (resolution.source, &resolution.credential_digest) {
            (ResolutionSource::Credential, Some(digest)) => {
                format!("{API_KEY_IDENTITY_PREFIX}{digest}")
            }
            _ => ENV_ROLE_IDENTITY.to_string(),
        };

        debug!(role = %resolution.role, source = ?resolution.source, "Authenticated");
        AuthResult {
            authenticated: true,
            role: Some(resolution.role),
            identity: Some(identity),
            error: None,
        }
    }

    /// Decide an invocation of `tool` for the resolved role
    ///
    /// Observers hear about denials here. Hosts report completed executions
    /// with [`record_execution`](Self::record_execution).
    pub fn check_invocation(&self, tool: &str) -> AccessDecision {
        let decision = {
            let policy = self.store.read();
            let role = self
                .resolver
                .resolve(&policy, self.ambient.as_ref())
                .role;
            let allowed =
                PermissionEvaluator::new(&policy, &self.known_operations).is_allowed(&role, tool);
            AccessDecision {
                tool: tool.to_string(),
                role,
                allowed,
            }
        };

        if !decision.allowed {
            warn!(tool = %decision.tool, role = %decision.role, "Tool invocation denied");
            for observer in self.observers_snapshot() {
                observer.on_access_denied(&decision.tool, &decision.role);
            }
        }
        decision
    }

    /// Notify observers that a permitted invocation ran
    pub fn record_execution(&self, tool: &str, role: &str) {
        for observer in self.observers_snapshot() {
            observer.on_operation_executed(tool, role);
        }
    }

    /// Report suspicious but accepted policy entries
    ///
    /// Purely advisory: nothing is rejected or changed.
    pub fn validate(&self) -> Vec<PolicyWarning> {
        let policy = self.store.read();
        let universe: HashSet<&str> = self.known_operations.iter().map(String::as_str).collect();
        let mut warnings = Vec::new();

        for (key, definition) in policy.roles() {
            if let PermittedOperations::Only(tools) = &definition.tools {
                warnings.extend(
                    tools
                        .iter()
                        .filter(|tool| !universe.contains(tool.as_str()))
                        .map(|tool| PolicyWarning::UnknownTool {
                            role: key.to_string(),
                            tool: tool.clone(),
                        }),
                );
            }
        }

        let mut reported = HashSet::new();
        for (_, role) in policy.credential_mappings() {
            if !policy.contains_role(role) && reported.insert(role) {
                warnings.push(PolicyWarning::UnregisteredMappedRole {
                    role: role.to_string(),
                });
            }
        }

        if !policy.contains_role(self.resolver.default_role()) {
            warnings.push(PolicyWarning::UnregisteredDefaultRole {
                role: self.resolver.default_role().to_string(),
            });
        }

        warnings
    }

    fn role_or_resolved(&self, policy: &crate::policy::Policy, role: Option<&str>) -> String {
        match role {
            Some(role) => role.to_string(),
            None => self.resolver.resolve(policy, self.ambient.as_ref()).role,
        }
    }

    fn observers_snapshot(&self) -> Vec<Arc<dyn AccessObserver>> {
        self.observers.read().clone()
    }
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("store", &self.store)
            .field("resolver", &self.resolver)
            .field("known_operations", &self.known_operations.len())
            .field("observers", &self.observers.read().len())
            .finish()
    }
}

impl Default for Authorizer {
    fn default() -> Self {
        Self::new(AuthzConfig::default())
    }
}
