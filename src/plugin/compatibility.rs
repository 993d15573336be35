//! Contract API Compatibility
//!
//! The contract API version is read from Cargo.toml metadata at build time
//! (`package.metadata.plughost.api_version`, format YYYYMMDD). Modules built
//! against the same major version (year) are compatible.

use crate::plugin::identity::ModuleIdentity;
use crate::plugin::error::{PluginError, PluginResult};

include!(concat!(env!("OUT_DIR"), "/version_api.rs"));

/// Checker for module API compatibility
#[derive(Debug, Clone, Copy)]
pub struct VersionCompatibilityChecker {
    /// Current API version
    api_version: u32,
}

impl VersionCompatibilityChecker {
    /// Create a new version compatibility checker
    pub fn new(api_version: u32) -> Self {
        Self { api_version }
    }

    /// Checker for the API version this host was built with
    pub fn host() -> Self {
        Self::new(BASE_API_VERSION)
    }

    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    /// Same major version (year) is compatible
    pub fn is_api_compatible(&self, module_api_version: u32) -> bool {
        self.get_major_version(self.api_version) == self.get_major_version(module_api_version)
    }

    /// Get major version (year) from API version
    pub fn get_major_version(&self, api_version: u32) -> u32 {
        api_version / 10000
    }

    /// Check module compatibility
    pub fn check_module_compatibility(&self, identity: &ModuleIdentity) -> PluginResult<()> {
        if !self.is_api_compatible(identity.api_version) {
            return Err(PluginError::version_incompatible(format!(
                "Module '{}' requires API version {} but current version is {}",
                identity, identity.api_version, self.api_version
            )));
        }
        Ok(())
    }
}

impl Default for VersionCompatibilityChecker {
    fn default() -> Self {
        Self::host()
    }
}

/// Convert YYYYMMDD version to YYYY-MM-DD
pub fn api_version_to_date_string(version: u32) -> String {
    let year = version / 10000;
    let month = (version % 10000) / 100;
    let day = version % 100;
    format!("{year:04}-{month:02}-{day:02}")
}
