//! Access decision observers
//!
//! Observers are called synchronously at the decision point and are never
//! awaited or retried. A panicking observer is the host's bug.

use std::fmt;
use tracing::{info, warn};

/// Receives access decisions for tool invocations
pub trait AccessObserver: Send + Sync {
    /// A tool invocation was refused
    fn on_access_denied(&self, tool: &str, role: &str) {
        let _ = (tool, role);
    }

    /// A permitted tool invocation was handed to the host
    fn on_operation_executed(&self, tool: &str, role: &str) {
        let _ = (tool, role);
    }
}

/// Records decisions through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AccessObserver for TracingObserver {
    fn on_access_denied(&self, tool: &str, role: &str) {
        warn!(tool = %tool, role = %role, "Tool access denied");
    }

    fn on_operation_executed(&self, tool: &str, role: &str) {
        info!(tool = %tool, role = %role, "Tool executed");
    }
}

type Callback = Box<dyn Fn(&str, &str) + Send + Sync>;

/// Observer built from closures
#[derive(Default)]
pub struct FnObserver {
    denied: Option<Callback>,
    executed: Option<Callback>,
}

impl FnObserver {
    /// Create an observer that ignores everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `callback` with (tool, role) on denials
    pub fn on_denied(mut self, callback: impl Fn(&str, &str) + Send + Sync + 'static) -> Self {
        self.denied = Some(Box::new(callback));
        self
    }

    /// Call `callback` with (tool, role) after executions
    pub fn on_executed(mut self, callback: impl Fn(&str, &str) + Send + Sync + 'static) -> Self {
        self.executed = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for FnObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnObserver")
            .field("denied", &self.denied.is_some())
            .field("executed", &self.executed.is_some())
            .finish()
    }
}

impl AccessObserver for FnObserver {
    fn on_access_denied(&self, tool: &str, role: &str) {
        if let Some(callback) = &self.denied {
            callback(tool, role);
        }
    }

    fn on_operation_executed(&self, tool: &str, role: &str) {
        if let Some(callback) = &self.executed {
            callback(tool, role);
        }
    }
}
