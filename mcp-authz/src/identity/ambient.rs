//! Ambient identity inputs
//!
//! The resolver never reads the process environment directly; it asks an
//! [`AmbientSource`]. Hosts use [`ProcessEnvironment`], tests and embedded
//! hosts that juggle several identities use [`StaticEnvironment`].

use parking_lot::RwLock;
use std::collections::HashMap;

/// Source of named identity inputs such as `AGENT_ROLE`
pub trait AmbientSource: Send + Sync {
    /// Raw value for `name`, if set
    fn raw_var(&self, name: &str) -> Option<String>;

    /// Value for `name`; empty values count as absent
    fn var(&self, name: &str) -> Option<String> {
        self.raw_var(name).filter(|value| !value.is_empty())
    }
}

/// Reads variables from the process environment on every call
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl AmbientSource for ProcessEnvironment {
    fn raw_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory variables that can be changed between resolutions
#[derive(Debug, Default)]
pub struct StaticEnvironment {
    vars: RwLock<HashMap<String, String>>,
}

impl StaticEnvironment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set)
    pub fn with(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a variable
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.write().insert(name.into(), value.into());
    }

    /// Remove a variable, returning its value
    pub fn remove(&self, name: &str) -> Option<String> {
        self.vars.write().remove(name)
    }

    /// Remove every variable
    pub fn clear(&self) {
        self.vars.write().clear();
    }
}

impl<K, V> FromIterator<(K, V)> for StaticEnvironment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let vars = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            vars: RwLock::new(vars),
        }
    }
}

impl AmbientSource for StaticEnvironment {
    fn raw_var(&self, name: &str) -> Option<String> {
        self.vars.read().get(name).cloned()
    }
}
