//! Built-in Modules
//!
//! Reference modules shipped with the host, available to in-process contexts
//! through [`catalog`].

pub mod echo;
pub mod greeter;

use crate::plugin::compatibility::BASE_API_VERSION;
use crate::plugin::discovery::ModuleManifest;
use crate::plugin::error::PluginResult;
use crate::plugin::identity::ModuleIdentity;
use crate::plugin::inprocess::ModuleCatalog;

pub use echo::{EchoModule, EchoService};
pub use greeter::{GreeterModule, GreeterService};

/// Names of all built-in modules
pub fn get_builtin_modules() -> Vec<&'static str> {
    vec![echo::MODULE_NAME, greeter::MODULE_NAME]
}

/// Catalog containing every built-in module
pub fn catalog() -> PluginResult<ModuleCatalog> {
    let mut catalog = ModuleCatalog::new();
    catalog.register(echo::MODULE_NAME, EchoModule::create)?;
    catalog.register(greeter::MODULE_NAME, GreeterModule::create)?;
    Ok(catalog)
}

/// Manifests that make the built-in modules discoverable from a plugin directory
pub fn manifests() -> Vec<ModuleManifest> {
    vec![
        ModuleManifest::new(ModuleIdentity::new(echo::MODULE_NAME, env!("CARGO_PKG_VERSION"), BASE_API_VERSION))
            .with_description("Returns the arguments it is given"),
        ModuleManifest::new(ModuleIdentity::new(greeter::MODULE_NAME, env!("CARGO_PKG_VERSION"), BASE_API_VERSION))
            .with_description("Greets by name and announces itself to the host"),
    ]
}
