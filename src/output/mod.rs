//! Output formatting for pool listings.
//!
//! - [`terminal`] - plain text tables for the command line

mod terminal;

pub use terminal::{format_addresses, format_field, format_used_addresses};
