//! Integration Tests for the Host Lifecycle
//!
//! Drives the plugin manager end to end through in-process contexts: manifests
//! on disk, discovery, both initialisation phases, cross-module resolution and
//! unloading.

use std::sync::{Arc, Mutex};
use serde_json::{json, Value};
use tempfile::TempDir;

use plughost::plugin::builtin::{self, echo, greeter};
use plughost::plugin::compatibility::BASE_API_VERSION;
use plughost::plugin::inprocess::{ModuleEnvironment, ModuleHost, ServiceRegistrar};
use plughost::plugin::{
    Adapter, ContextState, InProcessContextFactory, ModuleCatalog, ModuleIdentity, PluginError,
    PluginManager, PluginModule, PluginResult, Service, SharedAdapter, HOST_CONTRACTS_NAME,
};

#[derive(Default)]
struct RecordingAdapter {
    deliveries: Mutex<Vec<(String, Value)>>,
}

impl Adapter for RecordingAdapter {
    fn adapter_name(&self) -> &str {
        "recording"
    }

    fn deliver(&self, channel: &str, payload: &Value) -> PluginResult<()> {
        self.deliveries.lock().unwrap().push((channel.to_string(), payload.clone()));
        Ok(())
    }
}

#[derive(Debug)]
struct TaggedService {
    name: String,
    tag: String,
}

impl Service for TaggedService {
    fn service_name(&self) -> &str {
        &self.name
    }

    fn contract(&self) -> &str {
        HOST_CONTRACTS_NAME
    }

    fn invoke(&self, _operation: &str, _args: Value) -> PluginResult<Value> {
        Ok(json!({ "tag": self.tag }))
    }
}

/// Module defining `defines`, registering only `registers`, needing `requires`
struct CustomModule {
    tag: String,
    defines: Vec<String>,
    registers: Vec<String>,
    requires: Vec<String>,
}

impl PluginModule for CustomModule {
    fn required_contracts(&self) -> Vec<String> {
        self.requires.clone()
    }

    fn service_names(&self) -> Vec<String> {
        self.defines.clone()
    }

    fn register_services(&mut self, registrar: &mut ServiceRegistrar<'_>, _host: &ModuleHost) -> PluginResult<()> {
        for name in &self.registers {
            registrar.register(Arc::new(TaggedService { name: name.clone(), tag: self.tag.clone() }))?;
        }
        Ok(())
    }
}

fn custom(tag: &str, defines: &[&str], registers: &[&str], requires: &[&str]) -> impl Fn(&ModuleEnvironment) -> PluginResult<Box<dyn PluginModule>> + Send + Sync + 'static {
    let to_vec = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let (tag, defines, registers, requires) = (tag.to_string(), to_vec(defines), to_vec(registers), to_vec(requires));
    move |_env: &ModuleEnvironment| -> PluginResult<Box<dyn PluginModule>> {
        Ok(Box::new(CustomModule {
            tag: tag.clone(),
            defines: defines.clone(),
            registers: registers.clone(),
            requires: requires.clone(),
        }))
    }
}

fn identity(name: &str) -> ModuleIdentity {
    ModuleIdentity::new(name, "1.0.0", BASE_API_VERSION)
}

fn recording_adapter() -> (Arc<RecordingAdapter>, SharedAdapter) {
    let adapter = Arc::new(RecordingAdapter::default());
    let shared: SharedAdapter = adapter.clone();
    (adapter, shared)
}

fn manager_for(catalog: ModuleCatalog, dir: &TempDir) -> PluginManager {
    PluginManager::with_plugin_directory(Arc::new(InProcessContextFactory::new(catalog)), dir.path())
}

#[test]
fn test_builtin_modules_discovered_and_initialised() {
    let dir = TempDir::new().unwrap();
    for manifest in builtin::manifests() {
        manifest.write_to(dir.path()).unwrap();
    }
    let manager = manager_for(builtin::catalog().unwrap(), &dir);
    let (adapter, shared) = recording_adapter();

    let loaded = manager.discover_and_load_all(&shared).unwrap();
    let names: Vec<&str> = loaded.iter().map(|h| h.identity().name.as_str()).collect();
    assert_eq!(names, vec![echo::MODULE_NAME, greeter::MODULE_NAME]);

    manager.initialize_all_services().unwrap();
    manager.initialize_all_plugins().unwrap();
    assert!(loaded.iter().all(|h| h.state() == ContextState::PluginsInitialized));

    // greeter announced itself through echo during plugin initialisation
    let deliveries = adapter.deliveries.lock().unwrap().clone();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].0, greeter::ADAPTER_CHANNEL);
    assert_eq!(
        deliveries[0].1,
        json!({ "message": format!("greeter {} ready", env!("CARGO_PKG_VERSION")) })
    );

    let greeting = manager.resolve_service(greeter::SERVICE_NAME).unwrap()
        .invoke("greet", json!({ "name": "host" }))
        .unwrap();
    assert_eq!(greeting, json!({ "greeting": "Hello, host!" }));

    manager.unload_all().unwrap();
    assert_eq!(manager.context_count(), 0);
    assert!(loaded.iter().all(|h| !h.boundary().is_active()));
}

#[test]
fn test_greeter_without_echo_announces_directly() {
    let dir = TempDir::new().unwrap();
    let manager = manager_for(builtin::catalog().unwrap(), &dir);
    let (adapter, shared) = recording_adapter();

    manager.load_module(&shared, identity(greeter::MODULE_NAME)).unwrap();
    manager.initialize_all_services().unwrap();
    manager.initialize_all_plugins().unwrap();

    let deliveries = adapter.deliveries.lock().unwrap().clone();
    assert_eq!(deliveries, vec![(
        greeter::ADAPTER_CHANNEL.to_string(),
        json!({ "message": "greeter 1.0.0 ready" }),
    )]);
}

#[test]
fn test_unloaded_module_stops_resolving() {
    let dir = TempDir::new().unwrap();
    let manager = manager_for(builtin::catalog().unwrap(), &dir);
    let (_adapter, shared) = recording_adapter();

    let echo_handle = manager.load_module(&shared, identity(echo::MODULE_NAME)).unwrap();
    manager.initialize_all_services().unwrap();
    assert!(manager.resolve_service(echo::SERVICE_NAME).is_some());

    manager.unload_module(&echo_handle).unwrap();
    assert!(manager.resolve_service(echo::SERVICE_NAME).is_none());
    assert_eq!(echo_handle.state(), ContextState::Unloaded);

    // unloading again changes nothing
    manager.unload_module(&echo_handle).unwrap();

    let reloaded = manager.load_module(&shared, identity(echo::MODULE_NAME)).unwrap();
    assert_ne!(reloaded, echo_handle);
    assert!(reloaded.boundary().is_active());
}

#[test]
fn test_first_definer_shadows_later_modules() {
    let dir = TempDir::new().unwrap();
    let mut catalog = ModuleCatalog::new();
    catalog.register("declares", custom("declares", &["logger"], &[], &[])).unwrap();
    catalog.register("serves", custom("serves", &["logger"], &["logger"], &[])).unwrap();
    let manager = manager_for(catalog, &dir);
    let (_adapter, shared) = recording_adapter();

    manager.load_module(&shared, identity("declares")).unwrap();
    let serves = manager.load_module(&shared, identity("serves")).unwrap();
    manager.initialize_all_services().unwrap();

    assert!(manager.resolve_service("logger").is_none());

    let declares = manager.find_context("declares").unwrap();
    manager.unload_module(&declares).unwrap();
    let logger = manager.resolve_service("logger").unwrap();
    assert_eq!(logger.invoke("any", Value::Null).unwrap(), json!({ "tag": "serves" }));
    assert_eq!(manager.loaded_contexts(), vec![serves]);
}

#[test]
fn test_required_contract_must_be_shared_before_load() {
    let dir = TempDir::new().unwrap();
    let mut catalog = ModuleCatalog::new();
    catalog.register("player", custom("player", &["playback"], &["playback"], &["audio"])).unwrap();
    let manager = manager_for(catalog, &dir);
    let (_adapter, shared) = recording_adapter();

    let err = manager.load_module(&shared, identity("player")).unwrap_err();
    assert!(matches!(err, PluginError::ContractViolation { .. }));
    assert_eq!(manager.context_count(), 0);

    assert!(manager.add_base_contract(identity("audio")));
    let handle = manager.load_module(&shared, identity("player")).unwrap();
    assert!(handle.shared_contracts().permits_name("audio"));

    // removing the contract later does not reach the already loaded context
    assert!(manager.remove_base_contract(&identity("audio")));
    manager.initialize_all_services().unwrap();
    assert!(manager.resolve_service("playback").is_some());
}

#[test]
fn test_unknown_module_is_not_registered() {
    let dir = TempDir::new().unwrap();
    let manager = manager_for(builtin::catalog().unwrap(), &dir);
    let (_adapter, shared) = recording_adapter();

    let err = manager.load_module(&shared, identity("missing")).unwrap_err();
    assert!(matches!(err, PluginError::ModuleNotFound { .. }));
    assert_eq!(manager.context_count(), 0);
}

#[test]
fn test_missing_plugin_directory_created() {
    let root = TempDir::new().unwrap();
    let plugins = root.path().join("plugins");
    let manager = PluginManager::with_plugin_directory(
        Arc::new(InProcessContextFactory::new(builtin::catalog().unwrap())),
        &plugins,
    );
    let (_adapter, shared) = recording_adapter();

    assert!(manager.discover_and_load_all(&shared).unwrap().is_empty());
    assert!(plugins.is_dir());
    assert!(manager.discover_and_load_all(&shared).unwrap().is_empty());
}
