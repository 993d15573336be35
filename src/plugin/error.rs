//! Plugin Error Types
//!
//! Error handling for discovery, loading, initialisation and teardown of
//! isolation contexts.

use thiserror::Error;

/// Result type for plugin runtime operations
pub type PluginResult<T> = Result<T, PluginError>;

/// Error types raised by the plugin runtime and by isolation contexts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PluginError {
    /// The plugin location exists but could not be scanned
    #[error("Plugin discovery error: {message}")]
    DiscoveryFailed { message: String },

    /// A module manifest could not be parsed or failed validation
    #[error("Manifest parse error: {message}")]
    ManifestParseError { message: String },

    /// An isolation context could not be created or loaded
    #[error("Plugin loading error: {message}")]
    LoadingFailed { message: String },

    /// No module implementation is known for the requested identity
    #[error("Module not found: {module_name}")]
    ModuleNotFound { module_name: String },

    /// The module targets an incompatible contract API
    #[error("Version compatibility error: {message}")]
    VersionIncompatible { message: String },

    /// A value or requirement outside the shared contract set tried to cross a boundary
    #[error("Contract violation: {message}")]
    ContractViolation { message: String },

    /// Service or plugin initialisation failed inside a context
    #[error("Plugin initialization failed: {message}")]
    InitializationFailed { message: String },

    /// A service invocation failed
    #[error("Service error: {message}")]
    ServiceFailed { message: String },

    /// Operation attempted on a context in the wrong state
    #[error("Invalid plugin state: {message}")]
    InvalidState { message: String },

    /// Configuration error
    #[error("Plugin configuration error: {message}")]
    ConfigurationError { message: String },

    /// Generic plugin error
    #[error("Plugin error: {message}")]
    Generic { message: String },
}

impl PluginError {
    /// Create a discovery error
    pub fn discovery_failed<S: Into<String>>(message: S) -> Self {
        Self::DiscoveryFailed { message: message.into() }
    }

    /// Create a manifest parse error
    pub fn manifest_parse_error<S: Into<String>>(message: S) -> Self {
        Self::ManifestParseError { message: message.into() }
    }

    /// Create a loading failed error
    pub fn loading_failed<S: Into<String>>(message: S) -> Self {
        Self::LoadingFailed { message: message.into() }
    }

    /// Create a module not found error
    pub fn module_not_found<S: Into<String>>(module_name: S) -> Self {
        Self::ModuleNotFound { module_name: module_name.into() }
    }

    /// Create a version incompatible error
    pub fn version_incompatible<S: Into<String>>(message: S) -> Self {
        Self::VersionIncompatible { message: message.into() }
    }

    /// Create a contract violation error
    pub fn contract_violation<S: Into<String>>(message: S) -> Self {
        Self::ContractViolation { message: message.into() }
    }

    /// Create an initialization error
    pub fn initialization_failed<S: Into<String>>(message: S) -> Self {
        Self::InitializationFailed { message: message.into() }
    }

    /// Create a service error
    pub fn service_failed<S: Into<String>>(message: S) -> Self {
        Self::ServiceFailed { message: message.into() }
    }

    /// Create an invalid state error
    pub fn invalid_state<S: Into<String>>(message: S) -> Self {
        Self::InvalidState { message: message.into() }
    }

    /// Create a configuration error
    pub fn configuration_error<S: Into<String>>(message: S) -> Self {
        Self::ConfigurationError { message: message.into() }
    }

    /// Create a generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic { message: message.into() }
    }

    /// Check if error was raised while locating modules
    pub fn is_discovery_error(&self) -> bool {
        matches!(self,
            PluginError::DiscoveryFailed { .. } |
            PluginError::ManifestParseError { .. }
        )
    }

    /// Check if error is a configuration issue
    pub fn is_configuration_error(&self) -> bool {
        matches!(self,
            PluginError::ConfigurationError { .. } |
            PluginError::VersionIncompatible { .. } |
            PluginError::ContractViolation { .. }
        )
    }

    /// Check if error is related to context lifecycle
    pub fn is_lifecycle_error(&self) -> bool {
        matches!(self,
            PluginError::LoadingFailed { .. } |
            PluginError::ModuleNotFound { .. } |
            PluginError::InitializationFailed { .. } |
            PluginError::InvalidState { .. }
        )
    }
}

impl From<std::io::Error> for PluginError {
    fn from(err: std::io::Error) -> Self {
        PluginError::generic(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for PluginError {
    fn from(err: serde_json::Error) -> Self {
        PluginError::service_failed(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for PluginError {
    fn from(err: serde_yaml::Error) -> Self {
        PluginError::manifest_parse_error(format!("YAML error: {}", err))
    }
}
