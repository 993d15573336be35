//! Plugin Runtime Module
//!
//! Discovers plugin modules, creates one isolation context per module, seeds
//! each context with the shared contract set, drives contexts through their
//! lifecycle and resolves named services across them.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use plughost::plugin::{builtin, InProcessContextFactory, PluginManager, SharedAdapter};
//! # fn adapter() -> SharedAdapter { unimplemented!() }
//!
//! let factory = InProcessContextFactory::new(builtin::catalog()?);
//! let manager = PluginManager::with_plugin_directory(Arc::new(factory), "plugins");
//!
//! manager.discover_and_load_all(&adapter())?;
//! manager.initialize_all_services()?;
//! manager.initialize_all_plugins()?;
//!
//! if let Some(echo) = manager.resolve_service("echo") {
//!     echo.invoke("echo", serde_json::json!({"message": "hi"}))?;
//! }
//! manager.unload_all()?;
//! # Ok::<(), plughost::plugin::PluginError>(())
//! ```

pub mod error;
pub mod identity;
pub mod contracts;
pub mod compatibility;
pub mod service;
pub mod resolver;
pub mod context;
pub mod handle;
pub mod manager;
pub mod discovery;
pub mod inprocess;
pub mod builtin;

#[cfg(test)]
pub mod tests;

// Re-export core types for easier access
pub use error::{PluginError, PluginResult};
pub use identity::ModuleIdentity;
pub use contracts::{ContractSnapshot, SharedContractSet, HOST_CONTRACTS_NAME};
pub use service::{Adapter, Service, SharedAdapter, SharedService};
pub use resolver::{ServiceResolver, SharedResolver};
pub use context::{ContextFactory, ContextState, IsolationBoundary, IsolationContext};
pub use handle::ContextHandle;

// Lifecycle management
pub use manager::{default_plugin_directory, PluginManager};
pub use discovery::{ModuleDiscovery, ModuleManifest};
pub use compatibility::VersionCompatibilityChecker;
pub use inprocess::{InProcessContextFactory, ModuleCatalog, PluginModule};
