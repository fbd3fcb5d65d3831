//! Terminal output utilities.
//!
//! Provides formatting helpers for the `ip-pool` listings.

use crate::models::Ipv4;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
///
/// # Returns
/// A quoted, right-aligned string
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let quoted = format!("\"{}\"", value.to_string());
    format!("{quoted:>width$}")
}

/// One line per hostname: quoted hostname, padded to the longest one, then
/// its address in CIDR form.
pub fn format_used_addresses(used: &BTreeMap<String, Ipv4>) -> Vec<String> {
    let width = used.keys().map(|h| h.chars().count() + 2).max().unwrap_or(0);
    used.iter()
        .map(|(hostname, address)| format!("{} {address}", format_field(hostname, width)))
        .collect()
}

/// One line per address, in the order given, assigned ones followed by their
/// hostname. Expects the sorted unique list from `AddressPool::addresses`.
pub fn format_addresses(addresses: &[Ipv4Addr], used: &BTreeMap<String, Ipv4>) -> Vec<String> {
    let owners: BTreeMap<Ipv4Addr, &str> = used
        .iter()
        .map(|(hostname, address)| (address.addr, hostname.as_str()))
        .collect();
    addresses
        .iter()
        .map(|addr| match owners.get(addr) {
            Some(hostname) => format!("{:<15} {hostname}", addr.to_string()),
            None => format!("{:<15} -", addr.to_string()),
        })
        .collect()
}
