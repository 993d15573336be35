//! Context Handles
//!
//! A [`ContextHandle`] represents one loaded module. Clones share the same
//! underlying record; equality is identity of that record, so reloading the
//! same module produces a handle that compares unequal to the old one.

use std::fmt;
use std::sync::Arc;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use uuid::Uuid;
use super::context::{ContextState, IsolationBoundary, IsolationContext};
use super::contracts::ContractSnapshot;
use super::identity::ModuleIdentity;

struct ContextRecord {
    id: Uuid,
    identity: ModuleIdentity,
    shared_contracts: ContractSnapshot,
    context: Box<dyn IsolationContext>,
    state: Mutex<ContextState>,
    loaded_at: DateTime<Local>,
}

/// Handle to one isolation context owned by a plugin manager
#[derive(Clone)]
pub struct ContextHandle {
    record: Arc<ContextRecord>,
}

impl ContextHandle {
    pub(crate) fn new(
        identity: ModuleIdentity,
        shared_contracts: ContractSnapshot,
        context: Box<dyn IsolationContext>,
    ) -> Self {
        Self {
            record: Arc::new(ContextRecord {
                id: Uuid::now_v7(),
                identity,
                shared_contracts,
                context,
                state: Mutex::new(ContextState::Created),
                loaded_at: Local::now(),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.record.id
    }

    /// Identity the context was loaded from
    pub fn identity(&self) -> &ModuleIdentity {
        &self.record.identity
    }

    /// Contracts the context was seeded with at load time
    pub fn shared_contracts(&self) -> &ContractSnapshot {
        &self.record.shared_contracts
    }

    pub fn state(&self) -> ContextState {
        *self.record.state.lock()
    }

    pub fn is_live(&self) -> bool {
        self.state().is_live()
    }

    pub fn loaded_at(&self) -> DateTime<Local> {
        self.record.loaded_at
    }

    pub fn boundary(&self) -> Arc<dyn IsolationBoundary> {
        self.record.context.boundary()
    }

    pub(crate) fn context(&self) -> &dyn IsolationContext {
        self.record.context.as_ref()
    }

    pub(crate) fn set_state(&self, state: ContextState) {
        *self.record.state.lock() = state;
    }
}

impl PartialEq for ContextHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.record, &other.record)
    }
}

impl Eq for ContextHandle {}

impl fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextHandle")
            .field("id", &self.record.id)
            .field("identity", &self.record.identity)
            .field("state", &self.state())
            .finish()
    }
}
