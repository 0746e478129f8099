//! User interface module - terminal output of the `merge-up` binary.
//!
//! - `formatter` - Formatting and printing of plans, lookups and catalog reports
//! - This module - Machine-readable output

use anyhow::Result;
use serde::Serialize;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_catalog_problems, display_error, display_lockstepped, display_major_line,
    display_plan, display_plan_note, display_status, display_success, format_branch_chain,
    format_mapping,
};

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
