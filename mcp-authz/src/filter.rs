//! Tool collection filtering
//!
//! Filters any keyed collection down to the entries a role may use. The
//! filter never clones values: passing a borrowed map yields borrowed
//! entries, passing an owned map moves them. Input iteration order is kept.

use crate::policy::{Policy, PermittedOperations};
use tracing::debug;

/// Anything that carries a tool name
pub trait NamedOperation {
    /// Name checked against the role's permitted tools
    fn operation_name(&self) -> &str;
}

impl<T: NamedOperation + ?Sized> NamedOperation for &T {
    fn operation_name(&self) -> &str {
        (**self).operation_name()
    }
}

/// Filters collections against a borrowed policy view
#[derive(Debug, Clone, Copy)]
pub struct CollectionFilter<'a> {
    policy: &'a Policy,
}

impl<'a> CollectionFilter<'a> {
    /// Create a filter over `policy`
    pub fn new(policy: &'a Policy) -> Self {
        Self { policy }
    }

    /// Keep the `(name, entry)` pairs whose name `role` may use
    ///
    /// Unregistered roles get nothing; the wildcard passes every entry
    /// through untouched; explicit roles keep only listed names. Names the
    /// role lists but the collection lacks never appear.
    pub fn filter<K, V, I, B>(&self, collection: I, role: &str) -> B
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        B: FromIterator<(K, V)>,
    {
        match self.policy.role(role).map(|definition| &definition.tools) {
            None => {
                debug!(role = %role, "Filtering for unregistered role, nothing visible");
                std::iter::empty::<(K, V)>().collect()
            }
            Some(PermittedOperations::All) => collection.into_iter().collect(),
            Some(PermittedOperations::Only(tools)) => collection
                .into_iter()
                .filter(|(name, _)| tools.contains(name.as_ref()))
                .collect(),
        }
    }

    /// Keep the entries of a slice whose [`NamedOperation::operation_name`]
    /// `role` may use
    pub fn filter_named<'c, T: NamedOperation>(&self, entries: &'c [T], role: &str) -> Vec<&'c T> {
        match self.policy.role(role).map(|definition| &definition.tools) {
            None => Vec::new(),
            Some(tools) => entries
                .iter()
                .filter(|entry| tools.permits(entry.operation_name()))
                .collect(),
        }
    }
}
