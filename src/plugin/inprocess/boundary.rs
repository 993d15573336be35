use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;
use crate::plugin::context::IsolationBoundary;
use crate::plugin::error::{PluginError, PluginResult};

/// Boundary of an in-process context: an identity plus an active flag
#[derive(Debug)]
pub struct InProcessBoundary {
    id: String,
    active: AtomicBool,
}

impl InProcessBoundary {
    pub fn new(module_name: &str) -> Self {
        Self {
            id: format!("{}-{}", module_name, Uuid::new_v4().simple()),
            active: AtomicBool::new(true),
        }
    }

    pub(crate) fn ensure_active(&self) -> PluginResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(PluginError::invalid_state(format!("Boundary {} has been torn down", self.id)))
        }
    }
}

impl IsolationBoundary for InProcessBoundary {
    fn boundary_id(&self) -> &str {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn teardown(&self) -> PluginResult<()> {
        if self.active.swap(false, Ordering::AcqRel) {
            log::debug!("Tore down boundary {}", self.id);
            Ok(())
        } else {
            Err(PluginError::invalid_state(format!("Boundary {} already torn down", self.id)))
        }
    }
}
