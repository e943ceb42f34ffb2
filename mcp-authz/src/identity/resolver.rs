//! Effective role resolution
//!
//! Precedence, each step falling through only when the previous one yields
//! nothing usable:
//!
//! 1. a direct role claim naming a registered role
//! 2. a credential, mapped through the credential-prefix table
//! 3. the configured default role, registered or not
//!
//! Resolution never fails and is never cached; every call re-reads the
//! ambient source.

use super::ambient::AmbientSource;
use crate::policy::Policy;
use serde::Serialize;
use tracing::debug;

/// Length of the credential prefix used for the fast-path lookup and the digest
pub const CREDENTIAL_PREFIX_LEN: usize = 14;

/// Default name of the role-claim variable
pub const DEFAULT_ROLE_ENV_VAR: &str = "AGENT_ROLE";

/// Default name of the credential variable
pub const DEFAULT_API_KEY_ENV_VAR: &str = "AGENT_API_KEY";

/// First [`CREDENTIAL_PREFIX_LEN`] characters of a credential, or all of it
/// when shorter
pub fn credential_digest(credential: &str) -> String {
    credential.chars().take(CREDENTIAL_PREFIX_LEN).collect()
}

/// Log-safe rendering of a credential
pub(crate) fn masked(credential: &str) -> String {
    let visible: String = credential.chars().take(6).collect();
    format!("{visible}…")
}

/// Which input produced the effective role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// A registered role named directly
    RoleClaim,
    /// A credential mapped through the prefix table
    Credential,
    /// Nothing usable, so the default role
    Default,
}

/// Outcome of one resolution pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Effective role key
    pub role: String,
    /// Input the role came from
    pub source: ResolutionSource,
    /// Present only when a credential was consulted
    pub credential_digest: Option<String>,
}

impl Resolution {
    /// The identity this resolution yields
    pub fn identity(&self) -> EffectiveIdentity {
        EffectiveIdentity {
            role: self.role.clone(),
            credential_digest: self.credential_digest.clone(),
        }
    }
}

/// The identity in effect for the current call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveIdentity {
    /// Effective role key
    pub role: String,
    /// Credential digest when a credential was consulted
    pub credential_digest: Option<String>,
}

/// Resolves the effective role from ambient inputs
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    role_var: String,
    credential_var: String,
    default_role: String,
}

impl IdentityResolver {
    /// Create a resolver from variable names and a default role
    pub fn new(
        role_var: impl Into<String>,
        credential_var: impl Into<String>,
        default_role: impl Into<String>,
    ) -> Self {
        Self {
            role_var: role_var.into(),
            credential_var: credential_var.into(),
            default_role: default_role.into(),
        }
    }

    /// Name of the role-claim variable
    pub fn role_var(&self) -> &str {
        &self.role_var
    }

    /// Name of the credential variable
    pub fn credential_var(&self) -> &str {
        &self.credential_var
    }

    /// Role used when nothing else resolves
    pub fn default_role(&self) -> &str {
        &self.default_role
    }

    /// Resolve the effective role with the fixed precedence
    pub fn resolve(&self, policy: &Policy, ambient: &dyn AmbientSource) -> Resolution {
        if let Some(claim) = ambient.var(&self.role_var) {
            if policy.contains_role(&claim) {
                debug!(role = %claim, "Resolved role from role claim");
                return Resolution {
                    role: claim,
                    source: ResolutionSource::RoleClaim,
                    credential_digest: None,
                };
            }
            debug!(claim = %claim, "Ignoring role claim for unregistered role");
        }

        if let Some(credential) = ambient.var(&self.credential_var) {
            let role = self.resolve_from_credential(policy, &credential);
            return Resolution {
                role,
                source: ResolutionSource::Credential,
                credential_digest: Some(credential_digest(&credential)),
            };
        }

        debug!(role = %self.default_role, "No identity inputs, using default role");
        Resolution {
            role: self.default_role.clone(),
            source: ResolutionSource::Default,
            credential_digest: None,
        }
    }

    /// Derive a role from a credential string
    ///
    /// Exact lookup of the 14-character prefix first, then a first-match scan
    /// of every registered prefix against the full credential, then the
    /// default role.
    pub fn resolve_from_credential(&self, policy: &Policy, credential: &str) -> String {
        let key = credential_digest(credential);
        if let Some(role) = policy.credential_role(&key) {
            debug!(credential = %masked(credential), role = %role, "Credential matched exact prefix");
            return role.to_string();
        }

        if let Some((prefix, role)) = policy.first_prefix_match(credential) {
            debug!(
                credential = %masked(credential),
                prefix_len = prefix.chars().count(),
                role = %role,
                "Credential matched registered prefix"
            );
            return role.to_string();
        }

        debug!(credential = %masked(credential), role = %self.default_role, "Credential matched no prefix");
        self.default_role.clone()
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(
            DEFAULT_ROLE_ENV_VAR,
            DEFAULT_API_KEY_ENV_VAR,
            crate::policy::DEFAULT_ROLE,
        )
    }
}
