//! Console adapter handed to every loaded module

use log::info;
use serde_json::Value;
use crate::plugin::{Adapter, PluginResult};

/// Logs every delivery and, unless quiet, prints it on stdout
#[derive(Debug, Default)]
pub struct ConsoleAdapter {
    quiet: bool,
}

impl ConsoleAdapter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Adapter for ConsoleAdapter {
    fn adapter_name(&self) -> &str {
        "console"
    }

    fn deliver(&self, channel: &str, payload: &Value) -> PluginResult<()> {
        info!("[{}] {}", channel, payload);
        if !self.quiet {
            let text = match payload {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            println!("[{}] {}", channel, text);
        }
        Ok(())
    }
}
