//! Greeter module.
//!
//! Provides the `greeter` service and, once its plugins initialise, announces
//! itself to the host through the adapter, using the `echo` service of another
//! module when one is loaded.

use std::sync::Arc;
use log::debug;
use serde_json::{json, Value};
use crate::plugin::contracts::HOST_CONTRACTS_NAME;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::inprocess::{ModuleEnvironment, ModuleHost, PluginModule, ServiceRegistrar};
use crate::plugin::service::Service;
use super::echo;

pub const MODULE_NAME: &str = "greeter";
pub const SERVICE_NAME: &str = "greeter";
pub const ADAPTER_CHANNEL: &str = "greeter";

#[derive(Debug)]
pub struct GreeterService {
    salutation: String,
}

impl GreeterService {
    pub fn new<S: Into<String>>(salutation: S) -> Self {
        Self { salutation: salutation.into() }
    }

    fn greet(&self, args: &Value) -> Value {
        let name = args.get("name").and_then(Value::as_str).unwrap_or("world");
        json!({ "greeting": format!("{}, {}!", self.salutation, name) })
    }
}

impl Service for GreeterService {
    fn service_name(&self) -> &str {
        SERVICE_NAME
    }

    fn contract(&self) -> &str {
        HOST_CONTRACTS_NAME
    }

    fn invoke(&self, operation: &str, args: Value) -> PluginResult<Value> {
        match operation {
            "greet" => Ok(self.greet(&args)),
            other => Err(PluginError::service_failed(format!(
                "Unknown operation '{}' on service '{}'", other, SERVICE_NAME
            ))),
        }
    }
}

#[derive(Debug)]
pub struct GreeterModule {
    module_version: String,
}

impl GreeterModule {
    pub fn create(environment: &ModuleEnvironment) -> PluginResult<Box<dyn PluginModule>> {
        Ok(Box::new(GreeterModule {
            module_version: environment.identity.version.clone(),
        }))
    }
}

impl PluginModule for GreeterModule {
    fn required_contracts(&self) -> Vec<String> {
        vec![HOST_CONTRACTS_NAME.to_string()]
    }

    fn service_names(&self) -> Vec<String> {
        vec![SERVICE_NAME.to_string()]
    }

    fn register_services(&mut self, registrar: &mut ServiceRegistrar<'_>, _host: &ModuleHost) -> PluginResult<()> {
        registrar.register(Arc::new(GreeterService::new("Hello")))
    }

    fn initialize_plugins(&mut self, host: &ModuleHost) -> PluginResult<()> {
        let announcement = json!({
            "message": format!("greeter {} ready", self.module_version),
        });

        let payload = match host.resolve_service(echo::SERVICE_NAME) {
            Some(service) => service.invoke("echo", announcement)?,
            None => {
                debug!("No echo service available; announcing directly");
                announcement
            }
        };

        host.adapter()?.deliver(ADAPTER_CHANNEL, &payload)
    }
}
