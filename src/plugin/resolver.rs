//! Service Resolver
//!
//! The lookup capability injected into every context. The manager implements
//! it; contexts receive a non-owning handle so a context never keeps its
//! manager alive.

use std::sync::{Arc, Weak};
use super::manager::ManagerState;
use super::service::SharedService;

/// Looks up a service by name across all live contexts
pub trait ServiceResolver: Send + Sync {
    fn resolve_service(&self, name: &str) -> Option<SharedService>;
}

pub type SharedResolver = Arc<dyn ServiceResolver>;

/// Resolver handle given to contexts by the plugin manager
pub(crate) struct ManagerResolver {
    state: Weak<ManagerState>,
}

impl ManagerResolver {
    pub(crate) fn new(state: &Arc<ManagerState>) -> Self {
        Self { state: Arc::downgrade(state) }
    }
}

impl ServiceResolver for ManagerResolver {
    fn resolve_service(&self, name: &str) -> Option<SharedService> {
        // A dropped manager has no live contexts left to ask
        self.state.upgrade()?.resolve_service(name)
    }
}
