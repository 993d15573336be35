//! Plugin Manager
//!
//! Central coordinator for isolation context lifecycle. Owns the registered
//! context collection and the shared contract set, drives every context through
//! load → initialise services → initialise plugins → unload, and resolves
//! service names across the live contexts.
//!
//! # Synchronisation
//!
//! The collections sit behind read/write locks that keep them structurally
//! sound, and no lock is held while calling into a context, so a plugin may
//! resolve services from inside its own initialisation. Whole operations are
//! not serialised: concurrent `load_module`/`unload_module`/`resolve_service`
//! calls from several threads must still be ordered by the caller.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use log::{debug, info, warn};
use parking_lot::RwLock;
use super::compatibility::VersionCompatibilityChecker;
use super::context::{ContextFactory, ContextState};
use super::contracts::SharedContractSet;
use super::discovery::ModuleDiscovery;
use super::error::PluginResult;
use super::handle::ContextHandle;
use super::identity::ModuleIdentity;
use super::resolver::{ManagerResolver, ServiceResolver, SharedResolver};
use super::service::{SharedAdapter, SharedService};

/// Default plugin location: `plugins` beside the running executable
pub fn default_plugin_directory() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("plugins")))
        .unwrap_or_else(|| PathBuf::from("plugins"))
}

pub(crate) struct ManagerState {
    /// Live contexts in load order; this order is the resolution tie-break
    contexts: RwLock<Vec<ContextHandle>>,
    base_contracts: RwLock<SharedContractSet>,
    plugin_directory: RwLock<PathBuf>,
    factory: Arc<dyn ContextFactory>,
    compatibility: VersionCompatibilityChecker,
}

impl ManagerState {
    fn loaded_contexts(&self) -> Vec<ContextHandle> {
        self.contexts.read().clone()
    }

    /// First defining context wins, even when it has no instance to give.
    ///
    /// Later contexts are still asked whether they define the name, but
    /// never for an instance.
    pub(crate) fn resolve_service(&self, name: &str) -> Option<SharedService> {
        let mut matched: Option<&ContextHandle> = None;
        let mut service = None;
        let contexts = self.loaded_contexts();

        for handle in &contexts {
            if !handle.context().defines_service_name(name) {
                continue;
            }
            match matched {
                None => {
                    matched = Some(handle);
                    service = handle.context().get_service_if_exists(name);
                }
                Some(winner) => {
                    debug!(
                        "Service '{}' also defined by {}; {} takes precedence",
                        name, handle.identity(), winner.identity()
                    );
                }
            }
        }

        match (matched, &service) {
            (Some(winner), None) => {
                debug!("Service '{}' is defined by {} but has no instance", name, winner.identity())
            }
            (None, _) => debug!("Service '{}' is not defined by any loaded module", name),
            _ => {}
        }
        service
    }
}

/// Plugin lifecycle manager
pub struct PluginManager {
    state: Arc<ManagerState>,
}

impl PluginManager {
    /// Create a manager using the default plugin directory
    pub fn new(factory: Arc<dyn ContextFactory>) -> Self {
        Self::with_plugin_directory(factory, default_plugin_directory())
    }

    /// Create a manager scanning `plugin_directory`
    pub fn with_plugin_directory<P: Into<PathBuf>>(factory: Arc<dyn ContextFactory>, plugin_directory: P) -> Self {
        Self::with_contracts(factory, plugin_directory, SharedContractSet::default())
    }

    /// Create a manager with an explicit shared contract set
    pub fn with_contracts<P: Into<PathBuf>>(
        factory: Arc<dyn ContextFactory>,
        plugin_directory: P,
        base_contracts: SharedContractSet,
    ) -> Self {
        Self {
            state: Arc::new(ManagerState {
                contexts: RwLock::new(Vec::new()),
                base_contracts: RwLock::new(base_contracts),
                plugin_directory: RwLock::new(plugin_directory.into()),
                factory,
                compatibility: VersionCompatibilityChecker::host(),
            }),
        }
    }

    pub fn plugin_directory(&self) -> PathBuf {
        self.state.plugin_directory.read().clone()
    }

    /// Change where discovery scans and where new contexts resolve relative references
    pub fn set_plugin_directory<P: Into<PathBuf>>(&self, plugin_directory: P) {
        *self.state.plugin_directory.write() = plugin_directory.into();
    }

    /// Scan the plugin directory and load every module found.
    ///
    /// A missing directory is created and nothing is loaded. Loading stops at
    /// the first failure; modules loaded before it stay loaded.
    pub fn discover_and_load_all(&self, adapter: &SharedAdapter) -> PluginResult<Vec<ContextHandle>> {
        let directory = self.plugin_directory();

        if !directory.exists() {
            fs::create_dir_all(&directory)?;
            info!("Created plugin directory {}", directory.display());
            return Ok(Vec::new());
        }

        let identities = ModuleDiscovery::new(&directory).discover_modules()?;
        let mut handles = Vec::with_capacity(identities.len());
        for identity in identities {
            handles.push(self.load_module(adapter, identity)?);
        }

        info!("Loaded {} module(s) from {}", handles.len(), directory.display());
        Ok(handles)
    }

    /// Create a context for `identity` and register it.
    ///
    /// The context is seeded with a snapshot of the current shared contracts,
    /// the adapter and this manager's resolver. Nothing is registered if any
    /// step fails, and a context that fails to load has its boundary torn down.
    pub fn load_module(&self, adapter: &SharedAdapter, identity: ModuleIdentity) -> PluginResult<ContextHandle> {
        identity.validate()?;
        self.state.compatibility.check_module_compatibility(&identity)?;

        let directory = self.plugin_directory();
        let snapshot = self.state.base_contracts.read().snapshot();
        let context = self.state.factory.create_context(&identity, &directory)?;
        let handle = ContextHandle::new(identity, snapshot, context);

        if let Err(e) = handle.context().load(handle.identity(), handle.shared_contracts()) {
            if let Err(teardown) = handle.boundary().teardown() {
                warn!("Failed to tear down boundary for {}: {}", handle.identity(), teardown);
            }
            return Err(e);
        }
        handle.context().set_adapter(Arc::clone(adapter));
        handle.context().set_resolver(self.resolver());
        handle.set_state(ContextState::Loaded);

        self.state.contexts.write().push(handle.clone());
        info!(
            "Loaded module {} in boundary {}",
            handle.identity(),
            handle.boundary().boundary_id()
        );
        Ok(handle)
    }

    /// Run service initialisation on every live context in load order, stopping at the first failure
    pub fn initialize_all_services(&self) -> PluginResult<()> {
        for handle in self.loaded_contexts() {
            debug!("Initializing services for {}", handle.identity());
            handle.context().initialize_services()?;
            handle.set_state(ContextState::ServicesInitialized);
        }
        Ok(())
    }

    /// Run plugin initialisation on every live context in load order, stopping at the first failure
    pub fn initialize_all_plugins(&self) -> PluginResult<()> {
        for handle in self.loaded_contexts() {
            debug!("Initializing plugins for {}", handle.identity());
            handle.context().initialize_plugins()?;
            handle.set_state(ContextState::PluginsInitialized);
        }
        Ok(())
    }

    /// Remove a context and tear its boundary down.
    ///
    /// Unknown or already unloaded handles are ignored. The handle leaves the
    /// collection before teardown starts, so resolution never sees a context
    /// mid-teardown. The boundary is torn down even if the context's own
    /// unload step fails; the first error is returned.
    pub fn unload_module(&self, handle: &ContextHandle) -> PluginResult<()> {
        {
            let mut contexts = self.state.contexts.write();
            match contexts.iter().position(|h| h == handle) {
                Some(index) => {
                    contexts.remove(index);
                }
                None => return Ok(()),
            }
        }

        let unloaded = handle.context().unload();
        let torn_down = handle.boundary().teardown();
        handle.set_state(ContextState::Unloaded);

        if let Err(e) = &unloaded {
            warn!("Module {} failed to unload cleanly: {}", handle.identity(), e);
        }
        info!("Unloaded module {}", handle.identity());
        unloaded.and(torn_down)
    }

    /// Unload every context, most recently loaded first.
    ///
    /// Every context is attempted; the first error is returned.
    pub fn unload_all(&self) -> PluginResult<()> {
        let mut first_error = None;
        for handle in self.loaded_contexts().into_iter().rev() {
            if let Err(e) = self.unload_module(&handle) {
                warn!("Error unloading {}: {}", handle.identity(), e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Add a contract future contexts may share; false if already present
    pub fn add_base_contract(&self, identity: ModuleIdentity) -> bool {
        let added = self.state.base_contracts.write().add(identity.clone());
        if added {
            debug!("Added base contract {}", identity);
        }
        added
    }

    /// Remove a shared contract; the set's own identity is never removed
    pub fn remove_base_contract(&self, identity: &ModuleIdentity) -> bool {
        let removed = self.state.base_contracts.write().remove(identity);
        if removed {
            debug!("Removed base contract {}", identity);
        }
        removed
    }

    pub fn base_contracts(&self) -> Vec<ModuleIdentity> {
        self.state.base_contracts.read().to_vec()
    }

    /// Resolve a service name to at most one instance across live contexts.
    ///
    /// Only the first context (in load order) that defines the name is asked
    /// for an instance. If it has none, the result is `None` even when a later
    /// context could serve the name.
    pub fn resolve_service(&self, name: &str) -> Option<SharedService> {
        self.state.resolve_service(name)
    }

    /// Non-owning resolver handle, as injected into contexts
    pub fn resolver(&self) -> SharedResolver {
        Arc::new(ManagerResolver::new(&self.state))
    }

    /// Live contexts in load order
    pub fn loaded_contexts(&self) -> Vec<ContextHandle> {
        self.state.loaded_contexts()
    }

    pub fn context_count(&self) -> usize {
        self.state.contexts.read().len()
    }

    /// First live context loaded from a module with this name
    pub fn find_context(&self, module_name: &str) -> Option<ContextHandle> {
        self.state.contexts.read()
            .iter()
            .find(|h| h.identity().name == module_name)
            .cloned()
    }
}

impl ServiceResolver for PluginManager {
    fn resolve_service(&self, name: &str) -> Option<SharedService> {
        self.state.resolve_service(name)
    }
}
