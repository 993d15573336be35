//! Module Identity
//!
//! Immutable descriptor of one loadable unit: name, version, the contract API
//! it targets and an optional strong identity (fingerprint).

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use super::error::{PluginError, PluginResult};

/// Descriptor identifying one loadable plugin module or shared contract
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleIdentity {
    /// Module name, also the key used to locate its implementation
    pub name: String,

    /// Module version (`major.minor` or `major.minor.patch`)
    pub version: String,

    /// Contract API version the module targets (YYYYMMDD)
    pub api_version: u32,

    /// Optional strong identity, e.g. a signing key token or content hash
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl ModuleIdentity {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, version: V, api_version: u32) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            api_version,
            fingerprint: None,
        }
    }

    /// Attach a strong identity
    pub fn with_fingerprint<S: Into<String>>(mut self, fingerprint: S) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    /// Reject malformed identities before anything is created for them
    pub fn validate(&self) -> PluginResult<()> {
        if self.name.trim().is_empty() {
            return Err(PluginError::loading_failed("Module name cannot be empty"));
        }

        if !is_valid_version(&self.version) {
            return Err(PluginError::loading_failed(format!(
                "Invalid version format for module '{}': {}",
                self.name, self.version
            )));
        }

        if self.api_version == 0 {
            return Err(PluginError::loading_failed(format!(
                "API version cannot be zero for module '{}'",
                self.name
            )));
        }

        Ok(())
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Parses `name@version`, stamping the host's contract API version.
impl FromStr for ModuleIdentity {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, version) = s.split_once('@').ok_or_else(|| {
            PluginError::configuration_error(format!(
                "Invalid module identity '{}': expected NAME@VERSION", s
            ))
        })?;

        let identity = ModuleIdentity::new(
            name.trim(),
            version.trim(),
            super::compatibility::BASE_API_VERSION,
        );
        identity.validate()
            .map_err(|e| PluginError::configuration_error(e.to_string()))?;
        Ok(identity)
    }
}

/// Basic version validation (simplified semver)
fn is_valid_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return false;
    }

    parts.iter().all(|part| part.parse::<u32>().is_ok())
}
