//! On-disk layout of the pool store.
//!
//! [`PoolFile`] is what gets written. [`LegacyPoolFile`] is the earlier
//! address-keyed layout, still accepted on load and migrated on the next save.

use super::Ipv4;
use crate::error::PoolError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Current store layout.
///
/// The free list is not stored, it is derived from `network` minus `hostnames`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PoolFile {
    pub ip_version: u8,
    #[serde(default)]
    pub network: Option<Ipv4>,
    #[serde(default)]
    pub hostnames: BTreeMap<String, Ipv4Addr>,
}

/// Earlier store layout, keyed by address with `null` for free entries.
#[derive(Deserialize, Debug, Clone)]
pub struct LegacyPoolFile {
    pub ip_version: u8,
    pub network_prefix_len: u8,
    #[serde(default)]
    pub addresses: BTreeMap<String, Option<String>>,
}

impl LegacyPoolFile {
    /// Convert into the current layout.
    ///
    /// The network is derived from the lowest listed address. One hostname on
    /// two addresses cannot be represented in the current layout and is
    /// rejected.
    pub fn into_current(self) -> Result<PoolFile, PoolError> {
        let mut parsed = Vec::with_capacity(self.addresses.len());
        for (addr, hostname) in self.addresses {
            let ip: Ipv4Addr = addr
                .parse()
                .map_err(|e| PoolError::invalid_cidr(&addr, e))?;
            parsed.push((ip, hostname));
        }
        parsed.sort_by_key(|(ip, _)| *ip);

        let network = match parsed.first() {
            Some((lowest, _)) => {
                let iface = Ipv4::new(&format!("{lowest}/{}", self.network_prefix_len))
                    .map_err(|e| PoolError::invalid_cidr(&lowest.to_string(), e))?;
                Some(iface.network())
            }
            None => None,
        };

        let mut hostnames: BTreeMap<String, Ipv4Addr> = BTreeMap::new();
        for (ip, hostname) in parsed {
            let Some(hostname) = hostname else { continue };
            if let Some(previous) = hostnames.get(&hostname) {
                let mask = self.network_prefix_len;
                return Err(PoolError::HostnameAlreadyAssigned {
                    address: Ipv4 {
                        addr: *previous,
                        mask,
                    },
                    hostname,
                });
            }
            hostnames.insert(hostname, ip);
        }

        Ok(PoolFile {
            ip_version: self.ip_version,
            network,
            hostnames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pool_file_json_shape() {
        let mut hostnames = BTreeMap::new();
        hostnames.insert("alice".to_string(), Ipv4Addr::new(10, 0, 0, 1));
        let file = PoolFile {
            ip_version: 4,
            network: Some(Ipv4::new("10.0.0.0/24").unwrap()),
            hostnames,
        };
        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "ip_version": 4,
                "network": "10.0.0.0/24",
                "hostnames": { "alice": "10.0.0.1" }
            })
        );
    }

    #[test]
    fn test_pool_file_missing_optional_fields() {
        let file: PoolFile = serde_json::from_str(r#"{"ip_version": 4}"#).unwrap();
        assert_eq!(file.network, None);
        assert!(file.hostnames.is_empty());
    }

    #[test]
    fn test_legacy_into_current() {
        let legacy: LegacyPoolFile = serde_json::from_str(
            r#"{
                "ip_version": 4,
                "network_prefix_len": 29,
                "addresses": {
                    "10.0.0.1": "alice",
                    "10.0.0.2": null,
                    "10.0.0.3": "bob",
                    "10.0.0.4": null,
                    "10.0.0.5": null,
                    "10.0.0.6": null
                }
            }"#,
        )
        .unwrap();
        let current = legacy.into_current().unwrap();
        assert_eq!(current.network, Some(Ipv4::new("10.0.0.0/29").unwrap()));
        assert_eq!(current.hostnames.len(), 2);
        assert_eq!(current.hostnames["alice"], Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(current.hostnames["bob"], Ipv4Addr::new(10, 0, 0, 3));
    }

    #[test]
    fn test_legacy_empty_has_no_network() {
        let legacy: LegacyPoolFile =
            serde_json::from_str(r#"{"ip_version": 4, "network_prefix_len": 0, "addresses": {}}"#)
                .unwrap();
        let current = legacy.into_current().unwrap();
        assert_eq!(current.network, None);
    }

    #[test]
    fn test_legacy_hostname_on_two_addresses() {
        let legacy: LegacyPoolFile = serde_json::from_str(
            r#"{
                "ip_version": 4,
                "network_prefix_len": 29,
                "addresses": {
                    "10.0.0.1": "alice",
                    "10.0.0.2": null,
                    "10.0.0.4": "alice"
                }
            }"#,
        )
        .unwrap();
        match legacy.into_current() {
            Err(PoolError::HostnameAlreadyAssigned { hostname, address }) => {
                assert_eq!(hostname, "alice");
                assert_eq!(address, Ipv4::new("10.0.0.1/29").unwrap());
            }
            other => panic!("expected hostname already assigned, got {other:?}"),
        }
    }

    #[test]
    fn test_legacy_bad_address() {
        let legacy: LegacyPoolFile = serde_json::from_str(
            r#"{"ip_version": 4, "network_prefix_len": 24, "addresses": {"10.0.0.300": null}}"#,
        )
        .unwrap();
        assert!(matches!(
            legacy.into_current(),
            Err(PoolError::InvalidCidr { .. })
        ));
    }
}
