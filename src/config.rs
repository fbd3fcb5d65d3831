//! Defaults and environment lookups.

use std::path::PathBuf;

/// Only IPv4 pools are supported.
pub const IP_VERSION: u8 = 4;

/// Smallest accepted prefix length. Every host address of the pool is kept in
/// memory, a /8 is already ~16M entries.
pub const MIN_PREFIX_LEN: u8 = 8;

/// Env var holding the pool store path when none is given on the command line.
pub const ENV_POOL_DB: &str = "IP_POOL_DB";

/// Env var overriding the log4rs config file.
pub const ENV_LOG_CONFIG: &str = "IP_POOL_LOG_CONFIG";

pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";

/// Path of the log4rs config file, `IP_POOL_LOG_CONFIG` or `log4rs.yml`.
pub fn log_config_path() -> PathBuf {
    std::env::var_os(ENV_LOG_CONFIG)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_CONFIG))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_prefix_len_is_valid() {
        assert!(MIN_PREFIX_LEN <= crate::models::MAX_LENGTH);
    }
}
