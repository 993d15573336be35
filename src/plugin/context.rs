//! Isolation Context Contract
//!
//! One isolation context hosts one loaded plugin module. The plugin manager
//! drives it exclusively through [`IsolationContext`]; how a context discovers
//! and instantiates the plugin types inside it is its own business.
//!
//! All operations take `&self`. A context behaves like a proxy onto its
//! boundary and must tolerate being queried (`defines_service_name`,
//! `get_service_if_exists`) while one of its own initialisation steps is
//! running, because plugins may resolve services during initialisation.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use super::contracts::ContractSnapshot;
use super::error::PluginResult;
use super::identity::ModuleIdentity;
use super::resolver::SharedResolver;
use super::service::{SharedAdapter, SharedService};

/// Lifecycle state of a context as driven by the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextState {
    Created,
    Loaded,
    ServicesInitialized,
    PluginsInitialized,
    Unloaded,
}

impl ContextState {
    /// Whether the context is still registered with its manager
    pub fn is_live(self) -> bool {
        !matches!(self, ContextState::Unloaded)
    }
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContextState::Created => "created",
            ContextState::Loaded => "loaded",
            ContextState::ServicesInitialized => "services-initialized",
            ContextState::PluginsInitialized => "plugins-initialized",
            ContextState::Unloaded => "unloaded",
        };
        f.write_str(label)
    }
}

/// The isolation technology behind a context (subprocess, sandbox, in-process registry)
pub trait IsolationBoundary: Send + Sync {
    /// Unique identifier of this boundary
    fn boundary_id(&self) -> &str;

    /// False once the boundary has been torn down
    fn is_active(&self) -> bool;

    /// Tear the boundary down; only the plugin manager calls this
    fn teardown(&self) -> PluginResult<()>;
}

/// Operation set the plugin manager relies on
pub trait IsolationContext: Send + Sync {
    /// Load the module, given the contracts it may use across the boundary
    fn load(&self, identity: &ModuleIdentity, shared_contracts: &ContractSnapshot) -> PluginResult<()>;

    fn set_adapter(&self, adapter: SharedAdapter);

    fn set_resolver(&self, resolver: SharedResolver);

    fn initialize_services(&self) -> PluginResult<()>;

    fn initialize_plugins(&self) -> PluginResult<()>;

    /// Whether the module defines a service type under this name
    fn defines_service_name(&self, name: &str) -> bool;

    /// The registered instance for this name, if one exists right now
    fn get_service_if_exists(&self, name: &str) -> Option<SharedService>;

    fn unload(&self) -> PluginResult<()>;

    /// Boundary handle used for teardown
    fn boundary(&self) -> Arc<dyn IsolationBoundary>;
}

/// Creates a fresh, empty isolation context for one module load
pub trait ContextFactory: Send + Sync {
    /// `base_directory` is where the new context resolves relative references
    fn create_context(
        &self,
        identity: &ModuleIdentity,
        base_directory: &Path,
    ) -> PluginResult<Box<dyn IsolationContext>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_state_liveness() {
        assert!(ContextState::Created.is_live());
        assert!(ContextState::PluginsInitialized.is_live());
        assert!(!ContextState::Unloaded.is_live());
    }

    #[test]
    fn test_context_state_display() {
        assert_eq!(ContextState::ServicesInitialized.to_string(), "services-initialized");
        assert_eq!(ContextState::Unloaded.to_string(), "unloaded");
    }
}
