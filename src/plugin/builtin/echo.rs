//! Echo module: a single service that hands its arguments back.

use std::sync::Arc;
use serde_json::Value;
use crate::plugin::contracts::HOST_CONTRACTS_NAME;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::inprocess::{ModuleEnvironment, ModuleHost, PluginModule, ServiceRegistrar};
use crate::plugin::service::Service;

pub const MODULE_NAME: &str = "echo";
pub const SERVICE_NAME: &str = "echo";

#[derive(Debug, Default)]
pub struct EchoService;

impl Service for EchoService {
    fn service_name(&self) -> &str {
        SERVICE_NAME
    }

    fn contract(&self) -> &str {
        HOST_CONTRACTS_NAME
    }

    fn invoke(&self, operation: &str, args: Value) -> PluginResult<Value> {
        match operation {
            "echo" => Ok(args),
            other => Err(PluginError::service_failed(format!(
                "Unknown operation '{}' on service '{}'", other, SERVICE_NAME
            ))),
        }
    }
}

#[derive(Debug, Default)]
pub struct EchoModule;

impl EchoModule {
    pub fn create(_environment: &ModuleEnvironment) -> PluginResult<Box<dyn PluginModule>> {
        Ok(Box::new(EchoModule))
    }
}

impl PluginModule for EchoModule {
    fn service_names(&self) -> Vec<String> {
        vec![SERVICE_NAME.to_string()]
    }

    fn register_services(&mut self, registrar: &mut ServiceRegistrar<'_>, _host: &ModuleHost) -> PluginResult<()> {
        registrar.register(Arc::new(EchoService))
    }
}
