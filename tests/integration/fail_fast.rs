//! Integration Tests for Failure Handling
//!
//! Batch operations stop at the first failing context and leave earlier
//! contexts in their advanced state; nothing is rolled back.

use std::fs;
use std::sync::Arc;
use serde_json::Value;
use tempfile::TempDir;

use plughost::plugin::compatibility::BASE_API_VERSION;
use plughost::plugin::inprocess::{ModuleEnvironment, ModuleHost, ServiceRegistrar};
use plughost::plugin::{
    Adapter, ContextState, InProcessContextFactory, ModuleCatalog, ModuleIdentity, ModuleManifest,
    PluginError, PluginManager, PluginModule, PluginResult, SharedAdapter,
};

struct NullAdapter;

impl Adapter for NullAdapter {
    fn adapter_name(&self) -> &str {
        "null"
    }

    fn deliver(&self, _channel: &str, _payload: &Value) -> PluginResult<()> {
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq)]
enum FailAt {
    Nothing,
    Services,
    Plugins,
    Shutdown,
}

struct FlakyModule {
    fail_at: FailAt,
}

impl PluginModule for FlakyModule {
    fn service_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn register_services(&mut self, _registrar: &mut ServiceRegistrar<'_>, _host: &ModuleHost) -> PluginResult<()> {
        if self.fail_at == FailAt::Services {
            return Err(PluginError::initialization_failed("services refused"));
        }
        Ok(())
    }

    fn initialize_plugins(&mut self, _host: &ModuleHost) -> PluginResult<()> {
        if self.fail_at == FailAt::Plugins {
            return Err(PluginError::initialization_failed("plugins refused"));
        }
        Ok(())
    }

    fn shutdown(&mut self) -> PluginResult<()> {
        if self.fail_at == FailAt::Shutdown {
            return Err(PluginError::generic("shutdown refused"));
        }
        Ok(())
    }
}

/// Catalog with modules `m1`..`m5`; `failing` misbehaves at `fail_at`
fn catalog(failing: &str, fail_at: FailAt) -> ModuleCatalog {
    let mut catalog = ModuleCatalog::new();
    for i in 1..=5 {
        let name = format!("m{}", i);
        let mode = if name == failing { fail_at } else { FailAt::Nothing };
        catalog.register(name, move |_env: &ModuleEnvironment| -> PluginResult<Box<dyn PluginModule>> {
            Ok(Box::new(FlakyModule { fail_at: mode }))
        }).unwrap();
    }
    catalog
}

fn load_five(manager: &PluginManager) -> Vec<plughost::plugin::ContextHandle> {
    let adapter: SharedAdapter = Arc::new(NullAdapter);
    (1..=5)
        .map(|i| manager.load_module(&adapter, ModuleIdentity::new(format!("m{}", i), "1.0", BASE_API_VERSION)).unwrap())
        .collect()
}

fn manager_with(catalog: ModuleCatalog) -> PluginManager {
    PluginManager::with_plugin_directory(Arc::new(InProcessContextFactory::new(catalog)), std::env::temp_dir())
}

#[test]
fn test_service_initialisation_stops_at_third_context() {
    let manager = manager_with(catalog("m3", FailAt::Services));
    let handles = load_five(&manager);

    let err = manager.initialize_all_services().unwrap_err();
    assert!(err.is_lifecycle_error());

    let states: Vec<ContextState> = handles.iter().map(|h| h.state()).collect();
    assert_eq!(states, vec![
        ContextState::ServicesInitialized,
        ContextState::ServicesInitialized,
        ContextState::Loaded,
        ContextState::Loaded,
        ContextState::Loaded,
    ]);
    assert_eq!(manager.context_count(), 5);
}

#[test]
fn test_plugin_initialisation_stops_at_third_context() {
    let manager = manager_with(catalog("m3", FailAt::Plugins));
    let handles = load_five(&manager);
    manager.initialize_all_services().unwrap();

    assert!(manager.initialize_all_plugins().is_err());

    let states: Vec<ContextState> = handles.iter().map(|h| h.state()).collect();
    assert_eq!(states, vec![
        ContextState::PluginsInitialized,
        ContextState::PluginsInitialized,
        ContextState::ServicesInitialized,
        ContextState::ServicesInitialized,
        ContextState::ServicesInitialized,
    ]);
}

#[test]
fn test_unload_all_after_partial_initialisation() {
    let manager = manager_with(catalog("m3", FailAt::Services));
    let handles = load_five(&manager);
    let _ = manager.initialize_all_services();

    manager.unload_all().unwrap();

    assert_eq!(manager.context_count(), 0);
    assert!(handles.iter().all(|h| h.state() == ContextState::Unloaded));
    assert!(handles.iter().all(|h| !h.boundary().is_active()));
}

#[test]
fn test_failed_shutdown_still_tears_down() {
    let manager = manager_with(catalog("m2", FailAt::Shutdown));
    let handles = load_five(&manager);
    manager.initialize_all_services().unwrap();

    assert!(manager.unload_all().is_err());

    assert_eq!(manager.context_count(), 0);
    assert!(handles.iter().all(|h| !h.boundary().is_active()));
}

#[test]
fn test_bad_manifest_aborts_discovery_before_loading() {
    let dir = TempDir::new().unwrap();
    ModuleManifest::new(ModuleIdentity::new("m1", "1.0", BASE_API_VERSION)).write_to(dir.path()).unwrap();
    fs::write(dir.path().join("m2.yaml"), "name: m2\nversion: 1.0.0\n").unwrap();

    let manager = PluginManager::with_plugin_directory(
        Arc::new(InProcessContextFactory::new(catalog("none", FailAt::Nothing))),
        dir.path(),
    );
    let adapter: SharedAdapter = Arc::new(NullAdapter);

    let err = manager.discover_and_load_all(&adapter).unwrap_err();
    assert!(err.is_discovery_error());
    assert_eq!(manager.context_count(), 0);
}

#[test]
fn test_incompatible_api_rejected() {
    let manager = manager_with(catalog("none", FailAt::Nothing));
    let adapter: SharedAdapter = Arc::new(NullAdapter);

    let stale = ModuleIdentity::new("m1", "1.0", BASE_API_VERSION - 10000);
    let err = manager.load_module(&adapter, stale).unwrap_err();
    assert!(matches!(err, PluginError::VersionIncompatible { .. }));
    assert_eq!(manager.context_count(), 0);
}
