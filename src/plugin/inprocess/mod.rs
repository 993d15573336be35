//! In-Process Isolation
//!
//! An isolation technology for platforms that need no hard process boundary:
//! each context is an in-process module registry with a narrowed capability
//! surface. Module implementations come from a [`ModuleCatalog`].

pub mod boundary;
pub mod catalog;
pub mod context;
pub mod host;

use std::path::Path;
use std::sync::Arc;
use crate::plugin::context::{ContextFactory, IsolationContext};
use crate::plugin::error::PluginResult;
use crate::plugin::identity::ModuleIdentity;

pub use boundary::InProcessBoundary;
pub use catalog::{ModuleCatalog, ModuleEnvironment, ModuleFactory, PluginModule};
pub use context::InProcessContext;
pub use host::{ModuleHost, ServiceRegistrar};

/// Creates one [`InProcessContext`] per module load
#[derive(Debug, Clone)]
pub struct InProcessContextFactory {
    catalog: Arc<ModuleCatalog>,
}

impl InProcessContextFactory {
    pub fn new(catalog: ModuleCatalog) -> Self {
        Self { catalog: Arc::new(catalog) }
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }
}

impl ContextFactory for InProcessContextFactory {
    fn create_context(
        &self,
        identity: &ModuleIdentity,
        base_directory: &Path,
    ) -> PluginResult<Box<dyn IsolationContext>> {
        Ok(Box::new(InProcessContext::new(
            Arc::clone(&self.catalog),
            &identity.name,
            base_directory.to_path_buf(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use serde_json::{json, Value};
    use crate::plugin::compatibility::BASE_API_VERSION;
    use crate::plugin::contracts::{SharedContractSet, HOST_CONTRACTS_NAME};
    use crate::plugin::error::PluginError;
    use crate::plugin::service::{Service, SharedService};

    #[derive(Debug)]
    struct NamedService {
        name: String,
        contract: String,
    }

    impl Service for NamedService {
        fn service_name(&self) -> &str {
            &self.name
        }

        fn contract(&self) -> &str {
            &self.contract
        }

        fn invoke(&self, _operation: &str, args: Value) -> PluginResult<Value> {
            Ok(args)
        }
    }

    /// Declares `declared`, registers `registered` under `contract`
    struct ScriptedModule {
        declared: Vec<String>,
        registered: Vec<String>,
        contract: String,
        requires: Vec<String>,
        shutdowns: Arc<Mutex<u32>>,
    }

    impl PluginModule for ScriptedModule {
        fn required_contracts(&self) -> Vec<String> {
            self.requires.clone()
        }

        fn service_names(&self) -> Vec<String> {
            self.declared.clone()
        }

        fn register_services(&mut self, registrar: &mut ServiceRegistrar<'_>, _host: &ModuleHost) -> PluginResult<()> {
            for name in &self.registered {
                let service: SharedService = Arc::new(NamedService {
                    name: name.clone(),
                    contract: self.contract.clone(),
                });
                registrar.register(service)?;
            }
            Ok(())
        }

        fn shutdown(&mut self) -> PluginResult<()> {
            *self.shutdowns.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn catalog_with(
        declared: &[&str],
        registered: &[&str],
        contract: &str,
        requires: &[&str],
        shutdowns: Arc<Mutex<u32>>,
    ) -> ModuleCatalog {
        let declared: Vec<String> = declared.iter().map(|s| s.to_string()).collect();
        let registered: Vec<String> = registered.iter().map(|s| s.to_string()).collect();
        let requires: Vec<String> = requires.iter().map(|s| s.to_string()).collect();
        let contract = contract.to_string();

        let mut catalog = ModuleCatalog::new();
        catalog.register("scripted", move |_env: &ModuleEnvironment| {
            Ok(Box::new(ScriptedModule {
                declared: declared.clone(),
                registered: registered.clone(),
                contract: contract.clone(),
                requires: requires.clone(),
                shutdowns: Arc::clone(&shutdowns),
            }) as Box<dyn PluginModule>)
        }).unwrap();
        catalog
    }

    fn identity(name: &str) -> ModuleIdentity {
        ModuleIdentity::new(name, "1.0.0", BASE_API_VERSION)
    }

    fn create(catalog: ModuleCatalog, name: &str) -> Box<dyn IsolationContext> {
        let factory = InProcessContextFactory::new(catalog);
        factory.create_context(&identity(name), Path::new("/tmp/plugins")).unwrap()
    }

    #[test]
    fn test_declared_and_registered_services() {
        let shutdowns = Arc::new(Mutex::new(0));
        let catalog = catalog_with(&["a", "lazy"], &["a"], HOST_CONTRACTS_NAME, &[], shutdowns);
        let context = create(catalog, "scripted");

        context.load(&identity("scripted"), &SharedContractSet::default().snapshot()).unwrap();
        assert!(context.defines_service_name("a"));
        assert!(context.defines_service_name("lazy"));
        assert!(!context.defines_service_name("other"));
        assert!(context.get_service_if_exists("a").is_none());

        context.initialize_services().unwrap();
        let service = context.get_service_if_exists("a").unwrap();
        assert_eq!(service.invoke("echo", json!({"x": 1})).unwrap(), json!({"x": 1}));
        assert!(context.get_service_if_exists("lazy").is_none());
    }

    #[test]
    fn test_unknown_module_is_not_found() {
        let context = create(ModuleCatalog::new(), "missing");
        let err = context.load(&identity("missing"), &SharedContractSet::default().snapshot()).unwrap_err();
        assert_eq!(err, PluginError::module_not_found("missing"));
    }

    #[test]
    fn test_required_contract_must_be_shared() {
        let shutdowns = Arc::new(Mutex::new(0));
        let catalog = catalog_with(&["a"], &["a"], HOST_CONTRACTS_NAME, &["audio"], shutdowns);
        let context = create(catalog.clone(), "scripted");
        let err = context.load(&identity("scripted"), &SharedContractSet::default().snapshot()).unwrap_err();
        assert!(matches!(err, PluginError::ContractViolation { .. }));
        assert!(err.to_string().contains("audio"));

        let mut contracts = SharedContractSet::default();
        contracts.add(identity("audio"));
        let context = create(catalog, "scripted");
        assert!(context.load(&identity("scripted"), &contracts.snapshot()).is_ok());
    }

    #[test]
    fn test_service_contract_checked_at_registration() {
        let shutdowns = Arc::new(Mutex::new(0));
        let catalog = catalog_with(&["a"], &["a"], "private-types", &[], shutdowns);
        let context = create(catalog, "scripted");
        context.load(&identity("scripted"), &SharedContractSet::default().snapshot()).unwrap();

        let err = context.initialize_services().unwrap_err();
        assert!(matches!(err, PluginError::ContractViolation { .. }));
        assert!(context.get_service_if_exists("a").is_none());
    }

    #[test]
    fn test_undeclared_service_rejected() {
        let shutdowns = Arc::new(Mutex::new(0));
        let catalog = catalog_with(&["a"], &["b"], HOST_CONTRACTS_NAME, &[], shutdowns);
        let context = create(catalog, "scripted");
        context.load(&identity("scripted"), &SharedContractSet::default().snapshot()).unwrap();

        let err = context.initialize_services().unwrap_err();
        assert!(matches!(err, PluginError::InitializationFailed { .. }));
    }

    #[test]
    fn test_unload_shuts_module_down_and_forgets_services() {
        let shutdowns = Arc::new(Mutex::new(0));
        let catalog = catalog_with(&["a"], &["a"], HOST_CONTRACTS_NAME, &[], Arc::clone(&shutdowns));
        let context = create(catalog, "scripted");
        context.load(&identity("scripted"), &SharedContractSet::default().snapshot()).unwrap();
        context.initialize_services().unwrap();

        context.unload().unwrap();
        assert_eq!(*shutdowns.lock().unwrap(), 1);
        assert!(!context.defines_service_name("a"));
        assert!(context.get_service_if_exists("a").is_none());

        // a second unload finds nothing left to shut down
        context.unload().unwrap();
        assert_eq!(*shutdowns.lock().unwrap(), 1);
    }

    #[test]
    fn test_operations_fail_after_teardown() {
        let shutdowns = Arc::new(Mutex::new(0));
        let catalog = catalog_with(&["a"], &["a"], HOST_CONTRACTS_NAME, &[], shutdowns);
        let context = create(catalog, "scripted");
        context.load(&identity("scripted"), &SharedContractSet::default().snapshot()).unwrap();

        context.boundary().teardown().unwrap();
        assert!(matches!(context.initialize_services(), Err(PluginError::InvalidState { .. })));
        assert!(matches!(context.initialize_plugins(), Err(PluginError::InvalidState { .. })));
    }

    #[test]
    fn test_double_load_rejected() {
        let shutdowns = Arc::new(Mutex::new(0));
        let catalog = catalog_with(&["a"], &["a"], HOST_CONTRACTS_NAME, &[], shutdowns);
        let context = create(catalog, "scripted");
        let snapshot = SharedContractSet::default().snapshot();
        context.load(&identity("scripted"), &snapshot).unwrap();
        assert!(matches!(context.load(&identity("scripted"), &snapshot), Err(PluginError::InvalidState { .. })));
    }

    #[test]
    fn test_catalog_rejects_duplicate_names() {
        let mut catalog = ModuleCatalog::new();
        let factory = |_env: &ModuleEnvironment| -> PluginResult<Box<dyn PluginModule>> {
            Err(PluginError::generic("unused"))
        };
        catalog.register("one", factory).unwrap();
        assert!(catalog.register("one", factory).is_err());
        assert_eq!(catalog.module_names(), vec!["one".to_string()]);
    }
}
