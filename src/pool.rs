//! The address pool.
//!
//! An [`AddressPool`] hands out the host addresses of one IPv4 network to
//! named hosts, lowest address first. Every usable address is either free or
//! bound to exactly one hostname, never both and never neither.
//!
//! A pool opened with [`AddressPool::open`] is flushed to its store after
//! every mutation. The store is owned by a single writer.

use crate::config;
use crate::error::PoolError;
use crate::models::{Ipv4, PoolFile};
use crate::store;
use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

/// Host address allocator for one IPv4 network.
#[derive(Debug, Clone)]
pub struct AddressPool {
    /// Backing store, `None` for an in-memory pool.
    path: Option<PathBuf>,
    ip_version: u8,
    /// Unset until [`AddressPool::initialize`] succeeds.
    network: Option<Ipv4>,
    /// Free usable hosts, ascending.
    free: BTreeSet<Ipv4Addr>,
    hostnames: BTreeMap<String, Ipv4Addr>,
}

impl AddressPool {
    /// Open the pool stored at `path`.
    ///
    /// A missing file gives an uninitialized pool. The free list is derived
    /// from the stored network minus the stored assignments.
    pub fn open(path: impl AsRef<Path>) -> Result<AddressPool, PoolError> {
        let path = path.as_ref();
        let mut pool = match store::read_pool_file(path)? {
            Some(pool_file) => AddressPool::from_pool_file(pool_file)?,
            None => AddressPool::in_memory(),
        };
        pool.path = Some(path.to_path_buf());
        log::info!(
            "Opened pool {} network={} used={} free={}",
            path.display(),
            pool.network
                .map(|n| n.to_string())
                .unwrap_or_else(|| "<uninitialized>".to_string()),
            pool.hostnames.len(),
            pool.free.len()
        );
        Ok(pool)
    }

    /// An uninitialized pool without a backing store.
    pub fn in_memory() -> AddressPool {
        AddressPool {
            path: None,
            ip_version: config::IP_VERSION,
            network: None,
            free: BTreeSet::new(),
            hostnames: BTreeMap::new(),
        }
    }

    /// Rebuild the in-memory state from a store document.
    pub fn from_pool_file(pool_file: PoolFile) -> Result<AddressPool, PoolError> {
        if pool_file.ip_version != config::IP_VERSION {
            return Err(PoolError::UnsupportedIpVersion(pool_file.ip_version));
        }

        let Some(network) = pool_file.network else {
            if !pool_file.hostnames.is_empty() {
                return Err(PoolError::HostnamesWithoutNetwork);
            }
            return Ok(AddressPool::in_memory());
        };
        let network = network.network();
        if network.mask < config::MIN_PREFIX_LEN {
            return Err(PoolError::NetworkTooLarge {
                cidr: network,
                min_prefix_len: config::MIN_PREFIX_LEN,
            });
        }

        let mut free: BTreeSet<Ipv4Addr> = network.hosts().collect();
        let mut owners: BTreeMap<Ipv4Addr, &str> = BTreeMap::new();
        for (hostname, address) in &pool_file.hostnames {
            if let Some(first) = owners.insert(*address, hostname) {
                return Err(PoolError::DuplicateAddressAssignment {
                    address: *address,
                    first: first.to_string(),
                    second: hostname.clone(),
                });
            }
            if !network.contains_host(*address) {
                return Err(PoolError::AddressOutsideNetwork {
                    hostname: hostname.clone(),
                    address: *address,
                    network,
                });
            }
            free.remove(address);
        }

        Ok(AddressPool {
            path: None,
            ip_version: pool_file.ip_version,
            network: Some(network),
            free,
            hostnames: pool_file.hostnames,
        })
    }

    /// Snapshot of the state in store layout. The free list is not part of it.
    pub fn to_pool_file(&self) -> PoolFile {
        PoolFile {
            ip_version: self.ip_version,
            network: self.network,
            hostnames: self.hostnames.clone(),
        }
    }

    /// Initialize the pool from a CIDR interface address, e.g. `10.0.0.1/24`.
    ///
    /// The containing network is used, so `10.0.0.1/24` and `10.0.0.0/24`
    /// give the same pool. Fails if the pool is already initialized.
    pub fn initialize(&mut self, cidr: &str) -> Result<(), PoolError> {
        if let Some(network) = self.network {
            return Err(PoolError::AlreadyInitialized { network });
        }

        let iface = Ipv4::new(cidr).map_err(|e| PoolError::invalid_cidr(cidr, e))?;
        let network = iface.network();
        if network.mask < config::MIN_PREFIX_LEN {
            return Err(PoolError::NetworkTooLarge {
                cidr: network,
                min_prefix_len: config::MIN_PREFIX_LEN,
            });
        }

        self.network = Some(network);
        self.free = network.hosts().collect();
        self.hostnames.clear();
        log::info!("Initialized pool network={network} hosts={}", self.free.len());

        if let Err(e) = self.save() {
            self.network = None;
            self.free.clear();
            return Err(e);
        }
        Ok(())
    }

    /// Bind the lowest free address to `hostname` and return it in CIDR form.
    pub fn new_address(&mut self, hostname: &str) -> Result<Ipv4, PoolError> {
        let network = self.network.ok_or(PoolError::PoolUninitialized)?;
        if let Some(address) = self.hostnames.get(hostname) {
            return Err(PoolError::HostnameAlreadyAssigned {
                hostname: hostname.to_string(),
                address: network.with_addr(*address),
            });
        }
        let address = self
            .free
            .pop_first()
            .ok_or(PoolError::PoolExhausted { network })?;
        self.hostnames.insert(hostname.to_string(), address);

        if let Err(e) = self.save() {
            self.hostnames.remove(hostname);
            self.free.insert(address);
            return Err(e);
        }

        log::info!("Allocated {address} to {hostname:?}, free={}", self.free.len());
        Ok(network.with_addr(address))
    }

    /// The address bound to `hostname`, in CIDR form.
    pub fn address_for(&self, hostname: &str) -> Result<Ipv4, PoolError> {
        match (self.network, self.hostnames.get(hostname)) {
            (Some(network), Some(address)) => Ok(network.with_addr(*address)),
            _ => Err(PoolError::NoSuchHostname {
                hostname: hostname.to_string(),
            }),
        }
    }

    /// Unbind `hostname` and return its address to the free list.
    pub fn release_address(&mut self, hostname: &str) -> Result<(), PoolError> {
        if self.network.is_none() {
            return Err(PoolError::PoolUninitialized);
        }
        let address = self
            .hostnames
            .remove(hostname)
            .ok_or_else(|| PoolError::NoSuchHostname {
                hostname: hostname.to_string(),
            })?;
        self.free.insert(address);

        if let Err(e) = self.save() {
            self.free.remove(&address);
            self.hostnames.insert(hostname.to_string(), address);
            return Err(e);
        }

        log::info!("Released {address} from {hostname:?}, free={}", self.free.len());
        Ok(())
    }

    /// Current bindings, ordered by hostname, addresses in CIDR form.
    pub fn used_addresses(&self) -> BTreeMap<String, Ipv4> {
        let Some(network) = self.network else {
            return BTreeMap::new();
        };
        self.hostnames
            .iter()
            .map(|(hostname, address)| (hostname.clone(), network.with_addr(*address)))
            .collect()
    }

    /// Every address of the pool, free and assigned, ascending.
    pub fn addresses(&self) -> Vec<Ipv4Addr> {
        let mut addresses: Vec<Ipv4Addr> = self
            .free
            .iter()
            .chain(self.hostnames.values())
            .copied()
            .collect();
        addresses.sort();
        addresses
    }

    /// Free addresses, ascending.
    pub fn free_addresses(&self) -> impl Iterator<Item = &Ipv4Addr> {
        self.free.iter()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn network(&self) -> Option<Ipv4> {
        self.network
    }

    pub fn prefix_len(&self) -> Option<u8> {
        self.network.map(|n| n.mask)
    }

    pub fn is_initialized(&self) -> bool {
        self.network.is_some()
    }

    pub fn ip_version(&self) -> u8 {
        self.ip_version
    }

    /// Backing store path, `None` for an in-memory pool.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn save(&self) -> Result<(), PoolError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        store::write_pool_file(path, &self.to_pool_file()).map_err(|e| {
            log::error!("Failed to save pool store {}: {e}", path.display());
            e
        })
    }
}
