//! Report generation and formatting

use prettytable::{Table, Row, Cell, format};
use serde_json::Value;
use crate::plugin::compatibility::api_version_to_date_string;
use crate::plugin::{ContextHandle, ModuleIdentity};
use super::colours::ColourManager;

/// Format a compact table with headers and rows using prettytable-rs clean format
pub fn format_compact_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);

    let header_cells: Vec<Cell> = headers.iter()
        .map(|header| Cell::new(header))
        .collect();
    table.add_row(Row::new(header_cells));

    for row in rows {
        let data_cells: Vec<Cell> = row.iter()
            .map(|cell| Cell::new(cell))
            .collect();
        table.add_row(Row::new(data_cells));
    }

    // 2-space indent under section headings
    let table_output = table.to_string();
    let mut result = String::new();
    for line in table_output.lines() {
        result.push_str("  ");
        result.push_str(line);
        result.push('\n');
    }

    result
}

/// Table of live contexts in load order
pub fn format_context_table(contexts: &[ContextHandle], colours: &ColourManager) -> String {
    let rows: Vec<Vec<String>> = contexts.iter()
        .map(|handle| vec![
            handle.identity().name.clone(),
            handle.identity().version.clone(),
            api_version_to_date_string(handle.identity().api_version),
            colours.state(handle.state()).to_string(),
            handle.boundary().boundary_id().to_string(),
            handle.loaded_at().format("%H:%M:%S").to_string(),
        ])
        .collect();

    format_compact_table(&["Module", "Version", "API", "State", "Boundary", "Loaded"], &rows)
}

/// One line per shared contract, root first
pub fn format_contract_list(contracts: &[ModuleIdentity]) -> String {
    contracts.iter()
        .map(|contract| format!("  {}\n", contract))
        .collect()
}

/// Outcome of resolving one service name from the command line
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionReport {
    Unresolved,
    Resolved { contract: String },
    Invoked { contract: String, result: Value },
    Failed { contract: String, error: String },
}

pub fn format_resolution(name: &str, report: &ResolutionReport, colours: &ColourManager) -> String {
    match report {
        ResolutionReport::Unresolved => {
            format!("{} {}: not resolved", colours.error("✗"), name)
        }
        ResolutionReport::Resolved { contract } => {
            format!("{} {} ({})", colours.success("✓"), name, contract)
        }
        ResolutionReport::Invoked { contract, result } => {
            let rendered = serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
            format!("{} {} ({}) -> {}", colours.success("✓"), name, contract, rendered)
        }
        ResolutionReport::Failed { contract, error } => {
            format!("{} {} ({}): {}", colours.warning("!"), name, contract, colours.error(error))
        }
    }
}
