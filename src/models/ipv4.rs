//! IPv4 address and CIDR notation utilities.
//!
//! Provides [`Ipv4`] for representing an IPv4 interface (address plus prefix
//! length), along with the bit-level helpers the pool uses to derive a
//! network and its usable host range.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use ip_address_pool::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, Box<dyn Error>> {
    if len > MAX_LENGTH {
        Err("Network length is too long".into())
    } else {
        let right_len = MAX_LENGTH - len;
        let all_bits = u32::MAX as u64;

        let mask = (all_bits >> right_len) << right_len;

        Ok(mask as u32)
    }
}

/// IPv4 interface address with CIDR notation support.
///
/// Used both for the pool network (`10.0.0.0/24`) and for the addresses
/// handed out to hosts (`10.0.0.7/24`).
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    /// The IPv4 address.
    pub addr: Ipv4Addr,
    /// The prefix length (0-32).
    pub mask: u8,
}

impl Serialize for Ipv4 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ipv4 {
    fn deserialize<D>(deserializer: D) -> Result<Ipv4, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ipv4::new(&s).map_err(|e| de::Error::custom(format!("invalid CIDR {s:?}: {e}")))
    }
}

impl Ipv4 {
    /// Create a new [`Ipv4`] from a CIDR string (e.g., "10.0.0.1/24").
    pub fn new(addr_cidr: &str) -> Result<Ipv4, Box<dyn Error>> {
        let addr_cidr = addr_cidr.trim();
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or("Invalid address/mask, expected <address>/<prefix length>")?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| format!("Invalid address {addr}"))?;
        let mask: u8 = mask
            .parse()
            .map_err(|_| format!("Invalid prefix length {mask}"))?;
        if mask > MAX_LENGTH {
            return Err("Network length is too long".into());
        }
        Ok(Ipv4 { addr, mask })
    }

    /// The containing network, with host bits cleared.
    pub fn network(&self) -> Ipv4 {
        Ipv4 {
            addr: self.lo(),
            mask: self.mask,
        }
    }

    /// Same prefix length, different address.
    pub fn with_addr(&self, addr: Ipv4Addr) -> Ipv4 {
        Ipv4 {
            addr,
            mask: self.mask,
        }
    }

    /// Get the lowest (network) address in the subnet.
    pub fn lo(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) & self.mask_bits())
    }

    /// Get the highest (broadcast) address in the subnet.
    pub fn hi(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) | !self.mask_bits())
    }

    /// Usable host addresses in ascending order.
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> {
        let first = u32::from(self.lo()).saturating_add(1);
        let last = u32::from(self.hi());
        (first..last).map(Ipv4Addr::from)
    }

    /// True if `addr` lies strictly between the network and broadcast address.
    pub fn contains_host(&self, addr: Ipv4Addr) -> bool {
        addr > self.lo() && addr < self.hi()
    }

    fn mask_bits(&self) -> u32 {
        // fields are public, clamp instead of failing
        get_cidr_mask(self.mask.min(MAX_LENGTH)).unwrap_or(u32::MAX)
    }
}

impl FromStr for Ipv4 {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ipv4::new(s)
    }
}

impl std::fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_cidr_mask() {
        assert_eq!(get_cidr_mask(0).unwrap(), 0x00000000);
        assert_eq!(get_cidr_mask(8).unwrap(), 0xFF000000);
        assert_eq!(get_cidr_mask(16).unwrap(), 0xFFFF0000);
        assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
        assert_eq!(get_cidr_mask(32).unwrap(), 0xFFFFFFFF);
        assert!(get_cidr_mask(33).is_err());
    }

    #[test]
    fn test_new_parses_interface() {
        let ip = Ipv4::new(" 10.0.0.1/24 ").unwrap();
        assert_eq!(ip.addr, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(ip.mask, 24);
        assert_eq!(ip.network(), Ipv4::new("10.0.0.0/24").unwrap());
        assert_eq!(ip.to_string(), "10.0.0.1/24");
    }

    #[test]
    fn test_new_rejects_garbage() {
        assert!(Ipv4::new("10.0.0.1").is_err());
        assert!(Ipv4::new("10.0.0.1/33").is_err());
        assert!(Ipv4::new("10.0.0/24").is_err());
        assert!(Ipv4::new("10.0.0.1/abc").is_err());
        assert!("::1/128".parse::<Ipv4>().is_err());
    }

    #[test]
    fn test_hosts_excludes_network_and_broadcast() {
        let net = Ipv4::new("10.0.0.0/29").unwrap();
        let hosts: Vec<Ipv4Addr> = net.hosts().collect();
        assert_eq!(hosts.len(), 6);
        assert_eq!(hosts[0], Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(hosts[5], Ipv4Addr::new(10, 0, 0, 6));
        assert!(!net.contains_host(Ipv4Addr::new(10, 0, 0, 0)));
        assert!(!net.contains_host(Ipv4Addr::new(10, 0, 0, 7)));
        assert!(net.contains_host(Ipv4Addr::new(10, 0, 0, 3)));
    }

    #[test]
    fn test_hosts_tiny_networks() {
        assert_eq!(Ipv4::new("10.0.0.0/31").unwrap().hosts().count(), 0);
        assert_eq!(Ipv4::new("10.0.0.5/32").unwrap().hosts().count(), 0);
        assert_eq!(
            Ipv4::new("255.255.255.255/32").unwrap().hosts().count(),
            0
        );
        assert_eq!(Ipv4::new("10.0.0.0/30").unwrap().hosts().count(), 2);
    }

    #[test]
    fn test_lo_hi() {
        let ip = Ipv4::new("10.0.10.77/8").unwrap();
        assert_eq!(ip.lo(), Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(ip.hi(), Ipv4Addr::new(10, 255, 255, 255));
        let all = Ipv4::new("1.2.3.4/0").unwrap();
        assert_eq!(all.lo(), Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(all.hi(), Ipv4Addr::new(255, 255, 255, 255));
    }

    #[test]
    fn test_serde_as_string() {
        let ip = Ipv4::new("10.0.0.0/24").unwrap();
        let json = serde_json::to_string(&ip).unwrap();
        assert_eq!(json, "\"10.0.0.0/24\"");
        let back: Ipv4 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ip);
        assert!(serde_json::from_str::<Ipv4>("\"10.0.0.0\"").is_err());
    }
}
