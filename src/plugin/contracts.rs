//! Shared Contract Set
//!
//! The ordered list of module identities every isolation context may reference
//! when talking to the host or to other contexts. Element 0 is the identity of
//! the contract set itself and never changes after construction.

use std::ops::Deref;
use std::sync::Arc;
use crate::plugin::compatibility::BASE_API_VERSION;
use crate::plugin::identity::ModuleIdentity;

/// Name of the host's own contract module (index 0 of every default set)
pub const HOST_CONTRACTS_NAME: &str = "plughost-contracts";

/// Identity of the contract surface compiled into this host
pub fn host_contracts_identity() -> ModuleIdentity {
    ModuleIdentity::new(HOST_CONTRACTS_NAME, env!("CARGO_PKG_VERSION"), BASE_API_VERSION)
}

/// Ordered, duplicate-free set of shared contract identities
#[derive(Debug, Clone)]
pub struct SharedContractSet {
    contracts: Vec<ModuleIdentity>,
}

impl SharedContractSet {
    /// Create a set whose immutable first element is `root`
    pub fn new(root: ModuleIdentity) -> Self {
        Self { contracts: vec![root] }
    }

    /// The defining identity at index 0
    pub fn root(&self) -> &ModuleIdentity {
        &self.contracts[0]
    }

    /// Append a contract; returns false if it is already present
    pub fn add(&mut self, identity: ModuleIdentity) -> bool {
        if self.contracts.contains(&identity) {
            return false;
        }
        self.contracts.push(identity);
        true
    }

    /// Remove a contract; the root and unknown identities are left alone
    pub fn remove(&mut self, identity: &ModuleIdentity) -> bool {
        match self.contracts.iter().position(|c| c == identity) {
            Some(0) | None => false,
            Some(index) => {
                self.contracts.remove(index);
                true
            }
        }
    }

    pub fn contains(&self, identity: &ModuleIdentity) -> bool {
        self.contracts.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleIdentity> {
        self.contracts.iter()
    }

    pub fn to_vec(&self) -> Vec<ModuleIdentity> {
        self.contracts.clone()
    }

    /// Copy the current contents; later mutations of the set do not show through
    pub fn snapshot(&self) -> ContractSnapshot {
        ContractSnapshot(Arc::from(self.contracts.as_slice()))
    }
}

impl Default for SharedContractSet {
    fn default() -> Self {
        Self::new(host_contracts_identity())
    }
}

/// Immutable copy of the contract set taken when a context is loaded.
///
/// This is the authoritative list of identities allowed to cross that
/// context's boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSnapshot(Arc<[ModuleIdentity]>);

impl ContractSnapshot {
    pub fn permits(&self, identity: &ModuleIdentity) -> bool {
        self.0.contains(identity)
    }

    /// Whether any contract in the snapshot carries this name
    pub fn permits_name(&self, name: &str) -> bool {
        self.0.iter().any(|c| c.name == name)
    }

    pub fn root(&self) -> &ModuleIdentity {
        &self.0[0]
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|c| c.name.as_str()).collect()
    }
}

impl Deref for ContractSnapshot {
    type Target = [ModuleIdentity];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
