//! Application initialization and configuration

use anyhow::Result;
use std::path::PathBuf;
use std::str::FromStr;
use log::{debug, LevelFilter};
use crate::{cli, config, logging, plugin};
use crate::config::HOST_SECTION;

pub fn load_configuration(args: &cli::Args) -> Result<config::ConfigManager> {
    let mut manager = if let Some(config_file) = &args.config_file {
        debug!("Loading configuration from explicit file: {}", config_file.display());
        config::ConfigManager::load_from_file(config_file.clone())?
    } else {
        config::ConfigManager::load()?
    };

    if let Some(section_name) = &args.config_name {
        manager.select_section(section_name.clone());
    }

    Ok(manager)
}

/// `--plugin-dir`, then configuration, then `plugins` beside the executable
pub fn resolve_plugin_directory(args: &cli::Args, config: &config::ConfigManager) -> PathBuf {
    if let Some(dir) = &args.plugin_dir {
        return dir.clone();
    }
    if let Some(dir) = config.get_plugin_directory() {
        debug!("Using plugin directory from config: {}", dir.display());
        return dir;
    }
    plugin::default_plugin_directory()
}

pub fn configure_logging(args: &cli::Args, config: &config::ConfigManager) -> Result<logging::LogConfig> {
    let console_level = if args.debug {
        LevelFilter::Trace
    } else if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Error
    } else {
        config.get_log_level(HOST_SECTION, "console-level")?
            .unwrap_or(LevelFilter::Info)
    };

    let format = if !args.log_format.is_empty() && args.log_format != "text" {
        logging::LogFormat::from_str(&args.log_format)
            .map_err(|e| anyhow::anyhow!(e))?
    } else {
        match config.get_value(HOST_SECTION, "log-format") {
            Some(format_str) => logging::LogFormat::from_str(format_str)
                .map_err(|e| anyhow::anyhow!(e))?,
            None => logging::LogFormat::Text,
        }
    };

    let log_file_path = args.log_file.clone()
        .or_else(|| config.get_path(HOST_SECTION, "log-file"));

    let file_log_level = match &args.log_file_level {
        Some(level_str) => Some(logging::parse_log_level(level_str)?),
        None => config.get_log_level(HOST_SECTION, "file-log-level")?,
    };

    let (destination, file_level) = match (log_file_path, file_log_level) {
        (Some(file_path), level) => {
            (logging::LogDestination::Both(file_path), Some(level.unwrap_or(console_level)))
        }
        (None, None) => (logging::LogDestination::Console, None),
        (None, Some(_)) => {
            return Err(anyhow::anyhow!("Log file level specified without log file"));
        }
    };

    Ok(logging::LogConfig {
        console_level,
        file_level,
        format,
        destination,
    })
}
