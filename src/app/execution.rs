//! Host run: load, initialise, report, unload

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use log::{debug, info, warn};
use serde_json::Value;
use crate::{cli, config, output, plugin};
use crate::output::{ColourManager, ResolutionReport};
use crate::plugin::{InProcessContextFactory, PluginManager, SharedAdapter};
use super::adapter::ConsoleAdapter;

/// Manager backed by in-process contexts over the built-in module catalog
pub fn build_manager(plugin_directory: PathBuf) -> Result<PluginManager> {
    let catalog = plugin::builtin::catalog()?;
    debug!("Module catalog: {:?}", catalog.module_names());
    let factory = InProcessContextFactory::new(catalog);
    Ok(PluginManager::with_plugin_directory(Arc::new(factory), plugin_directory))
}

/// Write a manifest for every built-in module not already present
pub fn install_builtin_manifests(plugin_directory: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(plugin_directory)
        .with_context(|| format!("Failed to create plugin directory {}", plugin_directory.display()))?;

    let mut written = Vec::new();
    for manifest in plugin::builtin::manifests() {
        let existing = ["yaml", "yml"].iter()
            .map(|ext| plugin_directory.join(format!("{}.{}", manifest.identity.name, ext)))
            .find(|path| path.exists());
        if let Some(path) = existing {
            debug!("Keeping existing manifest {}", path.display());
            continue;
        }
        let path = manifest.write_to(plugin_directory)?;
        info!("Installed manifest {}", path.display());
        written.push(path);
    }
    Ok(written)
}

pub fn run_host(args: &cli::Args, config: &config::ConfigManager) -> Result<()> {
    let colours = ColourManager::from_args(args.no_color);
    let plugin_directory = super::initialization::resolve_plugin_directory(args, config);
    info!("Plugin directory: {}", plugin_directory.display());

    if args.install_builtins {
        for path in install_builtin_manifests(&plugin_directory)? {
            println!("Installed {}", path.display());
        }
    }

    let manager = build_manager(plugin_directory)?;
    for contract in config.get_base_contracts()?.into_iter().chain(args.base_contracts()?) {
        if !manager.add_base_contract(contract.clone()) {
            warn!("Shared contract {} listed more than once", contract);
        }
    }

    let adapter: SharedAdapter = Arc::new(ConsoleAdapter::new(args.quiet));
    let outcome = drive(&manager, &adapter, args, &colours);

    // contexts loaded before a failure still get torn down
    let unloaded = manager.unload_all().context("Failed to unload all modules");
    outcome.and(unloaded)
}

fn drive(manager: &PluginManager, adapter: &SharedAdapter, args: &cli::Args, colours: &ColourManager) -> Result<()> {
    let loaded = manager.discover_and_load_all(adapter)
        .context("Module discovery failed")?;
    if loaded.is_empty() {
        info!("No modules found in {}", manager.plugin_directory().display());
    }

    manager.initialize_all_services().context("Service initialisation failed")?;
    manager.initialize_all_plugins().context("Plugin initialisation failed")?;

    if args.list {
        print_listing(manager, colours);
    }

    if !args.resolve.is_empty() {
        let invoke_args = args.invoke_arguments()?;
        for name in &args.resolve {
            let report = resolve_report(manager, name, args.invoke.as_deref(), &invoke_args);
            println!("{}", output::format_resolution(name, &report, colours));
        }
    }

    Ok(())
}

fn print_listing(manager: &PluginManager, colours: &ColourManager) {
    let contexts = manager.loaded_contexts();

    println!("{}", colours.highlight(&format!("Loaded modules ({}):", contexts.len())));
    if contexts.is_empty() {
        println!("  none");
    } else {
        print!("{}", output::format_context_table(&contexts, colours));
    }

    println!();
    println!("{}", colours.highlight("Shared contracts:"));
    print!("{}", output::format_contract_list(&manager.base_contracts()));
}

/// Resolve `name` and optionally invoke `operation` on it
pub fn resolve_report(
    manager: &PluginManager,
    name: &str,
    operation: Option<&str>,
    invoke_args: &Value,
) -> ResolutionReport {
    let service = match manager.resolve_service(name) {
        Some(service) => service,
        None => return ResolutionReport::Unresolved,
    };
    let contract = service.contract().to_string();

    match operation {
        None => ResolutionReport::Resolved { contract },
        Some(operation) => match service.invoke(operation, invoke_args.clone()) {
            Ok(result) => ResolutionReport::Invoked { contract, result },
            Err(e) => ResolutionReport::Failed { contract, error: e.to_string() },
        },
    }
}
