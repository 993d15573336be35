//! Capability Contracts
//!
//! The only object shapes allowed to cross an isolation boundary. Arguments and
//! results are JSON values so every call through these traits is marshalable.

use std::fmt;
use std::sync::Arc;
use serde_json::Value;
use super::error::PluginResult;

/// A named capability a plugin exposes for lookup by name
pub trait Service: Send + Sync + fmt::Debug {
    /// Name the service is registered under
    fn service_name(&self) -> &str;

    /// Name of the shared contract this service's interface belongs to
    fn contract(&self) -> &str;

    /// Invoke an operation on the service
    fn invoke(&self, operation: &str, args: Value) -> PluginResult<Value>;
}

pub type SharedService = Arc<dyn Service>;

/// The host application object handed unchanged into every context.
///
/// The plugin manager only forwards it; plugins call back into it.
pub trait Adapter: Send + Sync {
    fn adapter_name(&self) -> &str;

    /// Deliver a payload from a plugin to the host on a named channel
    fn deliver(&self, channel: &str, payload: &Value) -> PluginResult<()>;
}

pub type SharedAdapter = Arc<dyn Adapter>;
