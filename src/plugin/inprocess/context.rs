//! In-process isolation context.
//!
//! Hosts one module from a [`ModuleCatalog`] behind a narrowed surface: the
//! module only sees a [`ModuleHost`], and only services whose contract is in
//! the context's snapshot can be registered.
//!
//! Lock discipline: `defines_service_name` and `get_service_if_exists` only
//! touch `declared` and `services`, never the module lock, and no lock other
//! than the module lock is held while module code runs. Resolution therefore
//! stays reentrant while the module is initialising.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use log::debug;
use parking_lot::{Mutex, RwLock};
use crate::plugin::context::{IsolationBoundary, IsolationContext};
use crate::plugin::contracts::ContractSnapshot;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::identity::ModuleIdentity;
use crate::plugin::resolver::SharedResolver;
use crate::plugin::service::{SharedAdapter, SharedService};
use super::boundary::InProcessBoundary;
use super::catalog::{ModuleCatalog, ModuleEnvironment, PluginModule};
use super::host::{ModuleHost, ServiceRegistrar};

struct LoadedModule {
    identity: ModuleIdentity,
    contracts: ContractSnapshot,
}

pub struct InProcessContext {
    catalog: Arc<ModuleCatalog>,
    base_directory: PathBuf,
    boundary: Arc<InProcessBoundary>,
    loaded: RwLock<Option<LoadedModule>>,
    module: Mutex<Option<Box<dyn PluginModule>>>,
    declared: RwLock<HashSet<String>>,
    services: RwLock<HashMap<String, SharedService>>,
    adapter: RwLock<Option<SharedAdapter>>,
    resolver: RwLock<Option<SharedResolver>>,
}

impl InProcessContext {
    pub fn new(catalog: Arc<ModuleCatalog>, module_name: &str, base_directory: PathBuf) -> Self {
        Self {
            catalog,
            base_directory,
            boundary: Arc::new(InProcessBoundary::new(module_name)),
            loaded: RwLock::new(None),
            module: Mutex::new(None),
            declared: RwLock::new(HashSet::new()),
            services: RwLock::new(HashMap::new()),
            adapter: RwLock::new(None),
            resolver: RwLock::new(None),
        }
    }

    /// Host surface for a module call, plus the loaded identity
    fn host(&self) -> PluginResult<(ModuleHost, ModuleIdentity)> {
        self.boundary.ensure_active()?;
        let loaded = self.loaded.read();
        let loaded = loaded.as_ref()
            .ok_or_else(|| PluginError::invalid_state("No module has been loaded into this context"))?;

        let host = ModuleHost::new(
            self.adapter.read().clone(),
            self.resolver.read().clone(),
            loaded.contracts.clone(),
            self.base_directory.clone(),
        );
        Ok((host, loaded.identity.clone()))
    }
}

impl IsolationContext for InProcessContext {
    fn load(&self, identity: &ModuleIdentity, shared_contracts: &ContractSnapshot) -> PluginResult<()> {
        self.boundary.ensure_active()?;
        if self.loaded.read().is_some() {
            return Err(PluginError::invalid_state(format!(
                "Context {} already holds a module", self.boundary.boundary_id()
            )));
        }

        let factory = self.catalog.get(&identity.name)
            .ok_or_else(|| PluginError::module_not_found(&identity.name))?;
        let environment = ModuleEnvironment {
            identity: identity.clone(),
            base_directory: self.base_directory.clone(),
            contracts: shared_contracts.clone(),
        };
        let module = factory(&environment)
            .map_err(|e| PluginError::loading_failed(format!("Module {} failed to load: {}", identity, e)))?;

        let missing: Vec<String> = module.required_contracts()
            .into_iter()
            .filter(|name| !shared_contracts.permits_name(name))
            .collect();
        if !missing.is_empty() {
            return Err(PluginError::contract_violation(format!(
                "Module {} requires contracts that are not shared: {}",
                identity,
                missing.join(", ")
            )));
        }

        *self.declared.write() = module.service_names().into_iter().collect();
        *self.module.lock() = Some(module);
        *self.loaded.write() = Some(LoadedModule {
            identity: identity.clone(),
            contracts: shared_contracts.clone(),
        });
        debug!("Module {} loaded into {}", identity, self.boundary.boundary_id());
        Ok(())
    }

    fn set_adapter(&self, adapter: SharedAdapter) {
        *self.adapter.write() = Some(adapter);
    }

    fn set_resolver(&self, resolver: SharedResolver) {
        *self.resolver.write() = Some(resolver);
    }

    fn initialize_services(&self) -> PluginResult<()> {
        let (host, identity) = self.host()?;
        let declared = self.declared.read().clone();

        let registered = {
            let mut guard = self.module.lock();
            let module = guard.as_mut()
                .ok_or_else(|| PluginError::invalid_state(format!("Module {} is not loaded", identity)))?;
            let mut registrar = ServiceRegistrar::new(&identity.name, &declared, host.contracts());
            module.register_services(&mut registrar, &host)?;
            registrar.into_services()
        };

        let mut services = self.services.write();
        for service in registered {
            debug!("Module {} registered service '{}'", identity, service.service_name());
            services.insert(service.service_name().to_string(), service);
        }
        Ok(())
    }

    fn initialize_plugins(&self) -> PluginResult<()> {
        let (host, identity) = self.host()?;
        let mut guard = self.module.lock();
        let module = guard.as_mut()
            .ok_or_else(|| PluginError::invalid_state(format!("Module {} is not loaded", identity)))?;
        module.initialize_plugins(&host)
    }

    fn defines_service_name(&self, name: &str) -> bool {
        self.declared.read().contains(name)
    }

    fn get_service_if_exists(&self, name: &str) -> Option<SharedService> {
        self.services.read().get(name).cloned()
    }

    fn unload(&self) -> PluginResult<()> {
        let module = self.module.lock().take();
        self.services.write().clear();
        self.declared.write().clear();
        *self.adapter.write() = None;
        *self.resolver.write() = None;
        self.loaded.write().take();

        match module {
            Some(mut module) => module.shutdown(),
            None => Ok(()),
        }
    }

    fn boundary(&self) -> Arc<dyn IsolationBoundary> {
        self.boundary.clone()
    }
}
