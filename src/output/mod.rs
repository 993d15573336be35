//! Output formatting and display module

pub mod colours;
pub mod reports;

pub use colours::ColourManager;
pub use reports::{
    format_compact_table,
    format_context_table,
    format_contract_list,
    format_resolution,
    ResolutionReport
};
