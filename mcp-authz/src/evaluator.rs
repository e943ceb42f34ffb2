//! Permission evaluation
//!
//! Pure functions of the current policy: an unregistered role is denied
//! everything, a wildcard role is allowed everything, an explicit role is
//! allowed exactly its listed tools.

use crate::policy::{Policy, PermittedOperations};
use std::collections::BTreeSet;
use tracing::debug;

/// Evaluates tool permissions against a borrowed policy view
#[derive(Debug, Clone, Copy)]
pub struct PermissionEvaluator<'a> {
    policy: &'a Policy,
    known_operations: &'a [String],
}

impl<'a> PermissionEvaluator<'a> {
    /// Create an evaluator over `policy` with the given tool universe
    ///
    /// The universe is expected to be free of duplicates.
    pub fn new(policy: &'a Policy, known_operations: &'a [String]) -> Self {
        Self {
            policy,
            known_operations,
        }
    }

    /// Whether `role` may use `tool`
    pub fn is_allowed(&self, role: &str, tool: &str) -> bool {
        let allowed = match self.policy.role(role) {
            None => false,
            Some(definition) => definition.tools.permits(tool),
        };
        debug!(role = %role, tool = %tool, allowed, "Evaluated tool permission");
        allowed
    }

    /// Tools `role` may use
    ///
    /// The wildcard expands to the known-tool universe. Explicit lists are
    /// returned verbatim, including names the universe does not know.
    pub fn allowed_operations(&self, role: &str) -> BTreeSet<String> {
        match self.policy.role(role).map(|definition| &definition.tools) {
            None => BTreeSet::new(),
            Some(PermittedOperations::All) => self.known_operations.iter().cloned().collect(),
            Some(PermittedOperations::Only(tools)) => tools.clone(),
        }
    }

    /// Tools documented as blocked for `role`
    ///
    /// This is the author-supplied list only, never the complement of
    /// [`allowed_operations`](Self::allowed_operations). Wildcard and
    /// unregistered roles have none.
    pub fn blocked_operations(&self, role: &str) -> BTreeSet<String> {
        match self.policy.role(role) {
            Some(definition) if !definition.is_wildcard() => {
                definition.blocked_tools.clone().unwrap_or_default()
            }
            _ => BTreeSet::new(),
        }
    }

    /// Number of tools `role` may use; universe size for the wildcard
    pub fn tool_count(&self, role: &str) -> usize {
        match self.policy.role(role).map(|definition| &definition.tools) {
            None => 0,
            Some(PermittedOperations::All) => self.known_operations.len(),
            Some(PermittedOperations::Only(tools)) => tools.len(),
        }
    }

    /// Number of documented-blocked tools for `role`
    pub fn blocked_count(&self, role: &str) -> usize {
        match self.policy.role(role) {
            Some(definition) if !definition.is_wildcard() => {
                definition.blocked_tools.as_ref().map_or(0, BTreeSet::len)
            }
            _ => 0,
        }
    }
}
