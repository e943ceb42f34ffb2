//! Policy store
//!
//! Holds role definitions and credential-prefix mappings. Both tables keep
//! insertion order: role listings are deterministic and the credential
//! prefix scan is first-match in registration order. Mutation is additive
//! only; nothing is ever removed.

use super::role::{CredentialMapping, RoleDefinition};
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::HashMap;
use tracing::{debug, info};

/// Insertion-ordered string-keyed table
///
/// Re-inserting an existing key replaces the value in place and keeps the
/// key's original position.
#[derive(Debug, Clone)]
struct OrderedTable<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> OrderedTable<V> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn insert(&mut self, key: String, value: V) -> Option<V> {
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A consistent view of the policy tables
#[derive(Debug, Clone)]
pub struct Policy {
    roles: OrderedTable<RoleDefinition>,
    credential_prefixes: OrderedTable<String>,
}

impl Policy {
    fn empty() -> Self {
        Self {
            roles: OrderedTable::new(),
            credential_prefixes: OrderedTable::new(),
        }
    }

    /// Definition for `key`
    pub fn role(&self, key: &str) -> Option<&RoleDefinition> {
        self.roles.get(key)
    }

    /// Whether `key` is registered
    pub fn contains_role(&self, key: &str) -> bool {
        self.roles.contains(key)
    }

    /// Registered roles in registration order
    pub fn roles(&self) -> impl Iterator<Item = (&str, &RoleDefinition)> {
        self.roles.iter()
    }

    /// Number of registered roles
    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    /// Exact lookup of a credential prefix
    pub fn credential_role(&self, prefix: &str) -> Option<&str> {
        self.credential_prefixes.get(prefix).map(String::as_str)
    }

    /// First registered mapping whose prefix is a literal prefix of `credential`
    ///
    /// This is first-match, not longest-match: when `"ab"` was registered
    /// before `"abc"`, `"abcdef"` resolves through `"ab"`.
    pub fn first_prefix_match(&self, credential: &str) -> Option<(&str, &str)> {
        self.credential_prefixes
            .iter()
            .find(|(prefix, _)| credential.starts_with(prefix))
            .map(|(prefix, role)| (prefix, role.as_str()))
    }

    /// Credential mappings in registration order
    pub fn credential_mappings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.credential_prefixes
            .iter()
            .map(|(prefix, role)| (prefix, role.as_str()))
    }
}

/// Thread-safe policy store
///
/// Readers take a shared lock for the duration of one decision; writers
/// (`register_role`, `map_credential_prefix`) take it exclusively.
#[derive(Debug)]
pub struct PolicyStore {
    inner: RwLock<Policy>,
}

impl PolicyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Policy::empty()),
        }
    }

    /// Create a store seeded with `defaults`, then `overrides` on top
    ///
    /// Overrides replace defaults wholesale on key collision; fields are
    /// never merged.
    pub fn seeded<D, O, M>(defaults: D, overrides: O, mappings: M) -> Self
    where
        D: IntoIterator<Item = (String, RoleDefinition)>,
        O: IntoIterator<Item = (String, RoleDefinition)>,
        M: IntoIterator<Item = CredentialMapping>,
    {
        let mut policy = Policy::empty();
        for (key, definition) in defaults.into_iter().chain(overrides) {
            policy.roles.insert(key, definition);
        }
        for mapping in mappings {
            policy
                .credential_prefixes
                .insert(mapping.prefix, mapping.role);
        }
        debug!(
            roles = policy.roles.len(),
            credential_prefixes = policy.credential_prefixes.len(),
            "Seeded policy store"
        );
        Self {
            inner: RwLock::new(policy),
        }
    }

    /// Shared read access to the policy tables
    pub fn read(&self) -> RwLockReadGuard<'_, Policy> {
        self.inner.read()
    }

    /// Insert or overwrite a role, returning the definition it replaced
    ///
    /// The tool list is not checked against any universe.
    pub fn register_role(
        &self,
        key: impl Into<String>,
        definition: RoleDefinition,
    ) -> Option<RoleDefinition> {
        let key = key.into();
        let previous = self.inner.write().roles.insert(key.clone(), definition);
        info!(role = %key, replaced = previous.is_some(), "Registered role");
        previous
    }

    /// Insert or overwrite a credential prefix mapping, returning the role it
    /// previously pointed at
    ///
    /// The target role does not need to exist yet.
    pub fn map_credential_prefix(
        &self,
        prefix: impl Into<String>,
        role: impl Into<String>,
    ) -> Option<String> {
        let prefix = prefix.into();
        let role = role.into();
        info!(role = %role, prefix_len = prefix.chars().count(), "Mapped credential prefix");
        self.inner.write().credential_prefixes.insert(prefix, role)
    }

    /// Cloned definition for `key`
    pub fn role(&self, key: &str) -> Option<RoleDefinition> {
        self.inner.read().role(key).cloned()
    }

    /// Whether `key` is registered
    pub fn contains_role(&self, key: &str) -> bool {
        self.inner.read().contains_role(key)
    }

    /// Role keys in registration order
    pub fn role_keys(&self) -> Vec<String> {
        self.inner
            .read()
            .roles()
            .map(|(key, _)| key.to_string())
            .collect()
    }

    /// Snapshot of every credential mapping in registration order
    pub fn credential_mappings(&self) -> Vec<CredentialMapping> {
        self.inner
            .read()
            .credential_mappings()
            .map(|(prefix, role)| CredentialMapping::new(prefix, role))
            .collect()
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new()
    }
}
