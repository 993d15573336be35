//! Application orchestration module

pub mod adapter;
pub mod initialization;
pub mod execution;

pub use adapter::ConsoleAdapter;
pub use initialization::{
    load_configuration,
    configure_logging,
    resolve_plugin_directory
};
pub use execution::{
    build_manager,
    install_builtin_manifests,
    run_host
};
