//! # IP address pool
//!
//! Hands out the host addresses of one IPv4 network to named hosts, lowest
//! address first, and keeps the bindings in a JSON file.
//!
//! ```no_run
//! use ip_address_pool::AddressPool;
//!
//! let mut pool = AddressPool::open("pool.json")?;
//! if !pool.is_initialized() {
//!     pool.initialize("10.0.0.1/24")?;
//! }
//! let address = pool.new_address("web-1")?;
//! println!("{address}");
//! # Ok::<(), ip_address_pool::PoolError>(())
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod pool;
pub mod store;

pub use error::PoolError;
pub use models::Ipv4;
pub use pool::AddressPool;
