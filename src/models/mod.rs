//! Domain models for the address pool.
//!
//! - [`Ipv4`] - IPv4 interface address with CIDR notation support
//! - [`PoolFile`] and [`LegacyPoolFile`] - on-disk store layouts

mod ipv4;
mod pool_file;

// Re-export public types
pub use ipv4::{get_cidr_mask, Ipv4, MAX_LENGTH};
pub use pool_file::{LegacyPoolFile, PoolFile};
