//! Error taxonomy for the address pool.

use crate::models::Ipv4;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use thiserror::Error;

/// Every failure the pool can report to its caller.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("address pool already initialized with network {network}")]
    AlreadyInitialized { network: Ipv4 },

    #[error("address pool is not initialized")]
    PoolUninitialized,

    #[error("address pool {network} is exhausted, no free addresses left")]
    PoolExhausted { network: Ipv4 },

    #[error("hostname {hostname:?} already has address {address}")]
    HostnameAlreadyAssigned { hostname: String, address: Ipv4 },

    #[error("no such hostname {hostname:?}")]
    NoSuchHostname { hostname: String },

    #[error("address {address} is assigned to both {first:?} and {second:?}")]
    DuplicateAddressAssignment {
        address: Ipv4Addr,
        first: String,
        second: String,
    },

    #[error("address {address} of hostname {hostname:?} is not a usable host of {network}")]
    AddressOutsideNetwork {
        hostname: String,
        address: Ipv4Addr,
        network: Ipv4,
    },

    #[error("pool store lists hostnames but no network")]
    HostnamesWithoutNetwork,

    #[error("unsupported ip version {0}, only 4 is supported")]
    UnsupportedIpVersion(u8),

    #[error("invalid CIDR address {cidr:?}: {reason}")]
    InvalidCidr { cidr: String, reason: String },

    #[error("network {cidr} is too large, prefix length must be at least /{min_prefix_len}")]
    NetworkTooLarge { cidr: Ipv4, min_prefix_len: u8 },

    #[error("error accessing pool store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing pool store {path}: path={json_path} error={source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("error serializing pool store: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PoolError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PoolError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_cidr(cidr: &str, reason: impl ToString) -> Self {
        PoolError::InvalidCidr {
            cidr: cidr.trim().to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_readable() {
        let err = PoolError::DuplicateAddressAssignment {
            address: Ipv4Addr::new(10, 0, 0, 1),
            first: "alice".to_string(),
            second: "bob".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "address 10.0.0.1 is assigned to both \"alice\" and \"bob\""
        );

        let err = PoolError::NoSuchHostname {
            hostname: "carol".to_string(),
        };
        assert_eq!(err.to_string(), "no such hostname \"carol\"");
    }

    #[test]
    fn test_invalid_cidr_trims_input() {
        let err = PoolError::invalid_cidr("  10.0.0.1 ", "missing prefix");
        match err {
            PoolError::InvalidCidr { cidr, reason } => {
                assert_eq!(cidr, "10.0.0.1");
                assert_eq!(reason, "missing prefix");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
