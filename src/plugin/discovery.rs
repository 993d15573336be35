//! Module Discovery
//!
//! Scans the plugin directory for module manifests. A manifest is a YAML file
//! (`.yaml` / `.yml`) in the top level of the directory describing one module
//! identity; other files are ignored. Identities are returned in file-name
//! order so load order is reproducible.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use super::error::{PluginError, PluginResult};
use super::identity::ModuleIdentity;

const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// On-disk description of one loadable module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleManifest {
    #[serde(flatten)]
    pub identity: ModuleIdentity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ModuleManifest {
    pub fn new(identity: ModuleIdentity) -> Self {
        Self { identity, description: None }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Write this manifest as `<directory>/<name>.yaml`
    pub fn write_to(&self, directory: &Path) -> PluginResult<PathBuf> {
        let path = directory.join(format!("{}.yaml", self.identity.name));
        let content = serde_yaml::to_string(self)?;
        fs::write(&path, content)?;
        Ok(path)
    }
}

/// Parser for module manifest files
#[derive(Debug, Default)]
pub struct ModuleManifestParser;

impl ModuleManifestParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a YAML string into a module manifest
    pub fn parse_yaml(&self, yaml_content: &str) -> PluginResult<ModuleManifest> {
        serde_yaml::from_str(yaml_content)
            .map_err(|e| PluginError::manifest_parse_error(format!("Failed to parse YAML: {}", e)))
    }

    /// Validate the identity carried by a manifest
    pub fn validate_manifest(&self, manifest: &ModuleManifest) -> PluginResult<()> {
        manifest.identity.validate()
            .map_err(|e| PluginError::manifest_parse_error(e.to_string()))
    }
}

/// File-based discovery over a single plugin directory
#[derive(Debug)]
pub struct ModuleDiscovery {
    plugin_directory: PathBuf,
    parser: ModuleManifestParser,
}

impl ModuleDiscovery {
    pub fn new<P: AsRef<Path>>(plugin_directory: P) -> Self {
        Self {
            plugin_directory: plugin_directory.as_ref().to_path_buf(),
            parser: ModuleManifestParser::new(),
        }
    }

    pub fn plugin_directory(&self) -> &Path {
        &self.plugin_directory
    }

    /// Find every manifest file in the plugin directory
    pub fn manifest_paths(&self) -> PluginResult<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.plugin_directory).map_err(|e| {
            PluginError::discovery_failed(format!(
                "Failed to read directory {}: {}",
                self.plugin_directory.display(), e
            ))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                PluginError::discovery_failed(format!("Failed to read directory entry: {}", e))
            })?;
            let path = entry.path();
            if path.is_file() && is_manifest(&path) {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Discover all module identities, failing on the first unreadable manifest
    pub fn discover_modules(&self) -> PluginResult<Vec<ModuleIdentity>> {
        let mut identities = Vec::new();

        for path in self.manifest_paths()? {
            let manifest = self.parse_manifest_file(&path)?;
            log::debug!("Discovered module {} in {}", manifest.identity, path.display());
            identities.push(manifest.identity);
        }

        log::debug!(
            "Discovered {} module(s) in {}",
            identities.len(),
            self.plugin_directory.display()
        );
        Ok(identities)
    }

    /// Parse and validate a single manifest file
    pub fn parse_manifest_file(&self, file_path: &Path) -> PluginResult<ModuleManifest> {
        let content = fs::read_to_string(file_path).map_err(|e| {
            PluginError::discovery_failed(format!("Failed to read file {}: {}", file_path.display(), e))
        })?;

        let manifest = self.parser.parse_yaml(&content).map_err(|e| {
            PluginError::manifest_parse_error(format!("{}: {}", file_path.display(), e))
        })?;
        self.parser.validate_manifest(&manifest)?;

        Ok(manifest)
    }
}

fn is_manifest(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| MANIFEST_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}
