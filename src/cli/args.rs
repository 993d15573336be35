use clap::{Parser, ArgAction};
use anyhow::Result;
use std::path::PathBuf;
use log::{debug, info};
use crate::plugin::ModuleIdentity;

/// Plugin Host
#[derive(Parser, Debug)]
#[command(name = "plughost")]
#[command(about = "Loads plugin modules into isolated contexts, initialises them and resolves services across them")]
#[command(version)]
pub struct Args {
    /// Directory scanned for module manifests (defaults to `plugins` beside the executable)
    #[arg(short = 'p', long = "plugin-dir", value_name = "PATH")]
    pub plugin_dir: Option<PathBuf>,

    /// Verbose output (debug level logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log file path for file output
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL")]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Configuration section name
    #[arg(long, value_name = "SECTION")]
    pub config_name: Option<String>,

    // ============ HOST ACTIONS ============

    /// List loaded modules after initialisation
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    /// Resolve a service by name and report which module serves it
    #[arg(short = 'r', long = "resolve", value_name = "SERVICE", action = ArgAction::Append)]
    pub resolve: Vec<String>,

    /// Operation to invoke on each resolved service
    #[arg(long = "invoke", value_name = "OPERATION", requires = "resolve")]
    pub invoke: Option<String>,

    /// JSON arguments passed with --invoke
    #[arg(long = "args", value_name = "JSON", requires = "invoke")]
    pub invoke_args: Option<String>,

    /// Extra shared contract (NAME@VERSION) visible to every module
    #[arg(short = 'c', long = "base-contract", value_name = "NAME@VERSION", action = ArgAction::Append)]
    pub base_contract: Vec<String>,

    /// Write manifests for the built-in modules into the plugin directory
    #[arg(long = "install-builtins")]
    pub install_builtins: bool,

    /// Disable coloured output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Args {
    /// Arguments for --invoke, `null` when none were given
    pub fn invoke_arguments(&self) -> Result<serde_json::Value> {
        match &self.invoke_args {
            Some(raw) => serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("Invalid JSON for --args: {}", e)),
            None => Ok(serde_json::Value::Null),
        }
    }

    /// Parsed --base-contract values
    pub fn base_contracts(&self) -> Result<Vec<ModuleIdentity>> {
        self.base_contract.iter()
            .map(|raw| raw.parse::<ModuleIdentity>().map_err(anyhow::Error::from))
            .collect()
    }
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    let args = Args::parse();
    debug!("Parsed CLI arguments: {:?}", args);
    args
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    match args.log_format.to_lowercase().as_str() {
        "text" | "json" => {},
        _ => return Err(anyhow::anyhow!(
            "Invalid log format '{}'. Valid options: text, json", args.log_format
        )),
    }

    if let Some(ref level) = args.log_file_level {
        match level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {},
            _ => return Err(anyhow::anyhow!(
                "Invalid log file level '{}'. Valid levels: error, warn, info, debug, trace", level
            )),
        }
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!(
            "--log-file-level requires --log-file to be specified"
        ));
    }

    args.invoke_arguments()?;
    args.base_contracts()?;

    info!("CLI arguments validated successfully");
    Ok(())
}
