//! Narrowed host surface seen by in-process modules.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use crate::plugin::contracts::ContractSnapshot;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::resolver::SharedResolver;
use crate::plugin::service::{SharedAdapter, SharedService};

/// Everything a module may reach outside its own boundary
#[derive(Clone)]
pub struct ModuleHost {
    adapter: Option<SharedAdapter>,
    resolver: Option<SharedResolver>,
    contracts: ContractSnapshot,
    base_directory: PathBuf,
}

impl ModuleHost {
    pub(crate) fn new(
        adapter: Option<SharedAdapter>,
        resolver: Option<SharedResolver>,
        contracts: ContractSnapshot,
        base_directory: PathBuf,
    ) -> Self {
        Self { adapter, resolver, contracts, base_directory }
    }

    /// The host application adapter
    pub fn adapter(&self) -> PluginResult<&SharedAdapter> {
        self.adapter.as_ref()
            .ok_or_else(|| PluginError::invalid_state("No adapter has been provided to this context"))
    }

    /// Resolve another module's service through the manager
    pub fn resolve_service(&self, name: &str) -> Option<SharedService> {
        self.resolver.as_ref()?.resolve_service(name)
    }

    pub fn contracts(&self) -> &ContractSnapshot {
        &self.contracts
    }

    /// Where relative references of this module resolve
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }
}

/// Collects services during `register_services`, checking each one at registration time
pub struct ServiceRegistrar<'a> {
    module_name: &'a str,
    declared: &'a HashSet<String>,
    contracts: &'a ContractSnapshot,
    registered: Vec<SharedService>,
}

impl<'a> ServiceRegistrar<'a> {
    pub(crate) fn new(
        module_name: &'a str,
        declared: &'a HashSet<String>,
        contracts: &'a ContractSnapshot,
    ) -> Self {
        Self { module_name, declared, contracts, registered: Vec::new() }
    }

    /// Register a service instance.
    ///
    /// The name must be one the module declared and the service's contract
    /// must be part of the context's shared contracts.
    pub fn register(&mut self, service: SharedService) -> PluginResult<()> {
        let name = service.service_name();

        if !self.declared.contains(name) {
            return Err(PluginError::initialization_failed(format!(
                "Module '{}' registered undeclared service '{}'",
                self.module_name, name
            )));
        }

        if !self.contracts.permits_name(service.contract()) {
            return Err(PluginError::contract_violation(format!(
                "Service '{}' of module '{}' uses contract '{}' which is not shared (shared: {})",
                name,
                self.module_name,
                service.contract(),
                self.contracts.names().join(", ")
            )));
        }

        if self.registered.iter().any(|s| s.service_name() == name) {
            return Err(PluginError::initialization_failed(format!(
                "Module '{}' registered service '{}' twice",
                self.module_name, name
            )));
        }

        self.registered.push(service);
        Ok(())
    }

    pub(crate) fn into_services(self) -> Vec<SharedService> {
        self.registered
    }
}
