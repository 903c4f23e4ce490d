//! Network Interface Resolver
//!
//! Enumerates the IPv4 addresses configured on local interfaces. The
//! OS is queried directly; no traffic leaves the host.

use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::IpAddr;
use tracing::debug;

/// An interface name with its IPv4 address in dotted-decimal form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceAddress {
    pub interface_name: String,
    pub ipv4_address: String,
}

/// Resolves interface names to IPv4 addresses
#[derive(Debug, Clone, Default)]
pub struct NetworkInterfaceResolver {
    addresses: BTreeMap<String, String>,
}

impl NetworkInterfaceResolver {
    /// Snapshot the interfaces of the current host
    pub fn from_system() -> Result<Self> {
        let entries = local_ip_address::list_afinet_netifas().map_err(|e| {
            Error::HostResolution {
                interface: "*".into(),
                reason: format!("interface enumeration failed: {}", e),
            }
        })?;
        Ok(Self::from_entries(entries))
    }

    /// Build a resolver from (name, address) pairs. Non-IPv4 entries are
    /// skipped; when an interface has several IPv4 addresses the first wins.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, IpAddr)>) -> Self {
        let mut addresses = BTreeMap::new();
        for (name, ip) in entries {
            if let IpAddr::V4(v4) = ip {
                addresses.entry(name).or_insert_with(|| v4.to_string());
            }
        }
        debug!("Enumerated {} IPv4 interfaces", addresses.len());
        Self { addresses }
    }

    /// Mapping of interface name to address, loopback included
    pub fn addresses(&self) -> &BTreeMap<String, String> {
        &self.addresses
    }

    /// All interfaces as records
    pub fn interfaces(&self) -> Vec<InterfaceAddress> {
        self.addresses
            .iter()
            .map(|(name, addr)| InterfaceAddress {
                interface_name: name.clone(),
                ipv4_address: addr.clone(),
            })
            .collect()
    }

    /// Address of one interface
    pub fn resolve(&self, interface: &str) -> Result<String> {
        self.addresses
            .get(interface)
            .cloned()
            .ok_or_else(|| Error::HostResolution {
                interface: interface.to_string(),
                reason: format!(
                    "no IPv4 address on this interface (found: {})",
                    self.addresses.keys().cloned().collect::<Vec<_>>().join(", ")
                ),
            })
    }
}

/// Map every local interface to its IPv4 address
pub fn interface_addresses() -> Result<BTreeMap<String, String>> {
    Ok(NetworkInterfaceResolver::from_system()?.addresses)
}

/// IPv4 address of a named local interface
pub fn resolve_interface(interface: &str) -> Result<String> {
    NetworkInterfaceResolver::from_system()?.resolve(interface)
}
