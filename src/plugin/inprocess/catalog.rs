//! Module Catalog
//!
//! The in-process stand-in for loadable module files: a registry mapping module
//! names to factories that build the module's plugin code inside a context.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use crate::plugin::contracts::ContractSnapshot;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::identity::ModuleIdentity;
use super::host::{ModuleHost, ServiceRegistrar};

/// Plugin code hosted by one in-process context
pub trait PluginModule: Send {
    /// Names of shared contracts this module needs to cross its boundary
    fn required_contracts(&self) -> Vec<String> {
        Vec::new()
    }

    /// Service names this module defines, whether or not it registers an instance
    fn service_names(&self) -> Vec<String>;

    /// Register service instances
    fn register_services(&mut self, registrar: &mut ServiceRegistrar<'_>, host: &ModuleHost) -> PluginResult<()>;

    /// Bring the module's plugins up; other modules' services are resolvable here
    fn initialize_plugins(&mut self, _host: &ModuleHost) -> PluginResult<()> {
        Ok(())
    }

    /// Release resources before the boundary is torn down
    fn shutdown(&mut self) -> PluginResult<()> {
        Ok(())
    }
}

/// What a module factory gets to see when its module is loaded
#[derive(Debug, Clone)]
pub struct ModuleEnvironment {
    pub identity: ModuleIdentity,
    pub base_directory: PathBuf,
    pub contracts: ContractSnapshot,
}

pub type ModuleFactory =
    Arc<dyn Fn(&ModuleEnvironment) -> PluginResult<Box<dyn PluginModule>> + Send + Sync>;

/// Registry of module implementations available to in-process contexts
#[derive(Default, Clone)]
pub struct ModuleCatalog {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module factory under `name`
    pub fn register<N, F>(&mut self, name: N, factory: F) -> PluginResult<()>
    where
        N: Into<String>,
        F: Fn(&ModuleEnvironment) -> PluginResult<Box<dyn PluginModule>> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(PluginError::configuration_error(format!(
                "Module already registered in catalog: {}", name
            )));
        }
        self.factories.insert(name, Arc::new(factory));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<ModuleFactory> {
        self.factories.get(name).cloned()
    }

    /// Registered module names, sorted
    pub fn module_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ModuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCatalog")
            .field("modules", &self.module_names())
            .finish()
    }
}
