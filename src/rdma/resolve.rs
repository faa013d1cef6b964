//! Network interface to RDMA device resolution.
//!
//! Ethernet (RoCE) interfaces are matched through the GID table: each GID
//! entry of a RoCE port names the netdev it was derived from. IPoIB
//! interfaces carry the port GID in their hardware address, whose trailing
//! EUI-64 equals the node GUID on the devices this library targets.
//!
//! The two paths report "no match" differently. Ethernet resolution returns
//! [`ResolveError::NotFound`], while InfiniBand resolution returns
//! `Ok(None)`. Existing callers rely on this distinction.

use std::io;

use thiserror::Error;

use super::guid::{self, NodeGuid, INFINIBAND_ADDR_LEN};
use super::link::{LinkEncap, LinkResolver, SysfsLinks};
use super::nic::{NodeGuidError, RdmaMap};

/// Resolution error type.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No RDMA device has the Ethernet interface in its GID table.
    #[error("rdma device not found for netdev {0}")]
    NotFound(String),

    /// The interface is neither Ethernet nor IPoIB.
    #[error("unsupported link encapsulation {0:?}")]
    UnsupportedEncap(String),

    /// The hardware address is too short to carry a port GID.
    #[error("hardware address too short ({0} bytes, need {min})", min = INFINIBAND_ADDR_LEN)]
    AddressTooShort(usize),

    /// The interface attributes could not be looked up.
    #[error("failed to look up link {netdev}")]
    Link {
        netdev: String,
        #[source]
        source: io::Error,
    },

    /// A device's node GUID could not be read or parsed.
    #[error("failed to get node GUID of {device}")]
    NodeGuid {
        device: String,
        #[source]
        source: NodeGuidError,
    },
}

impl RdmaMap {
    /// Find the RDMA device whose GID table references an Ethernet interface.
    ///
    /// Devices, ports and GID indices are scanned in directory order and the
    /// first match is returned. Entries that vanish mid-scan are skipped.
    pub fn resolve_for_ethernet(&self, netdev: &str) -> Result<String, ResolveError> {
        for dev in self.list_devices() {
            for port in self.list_ports(&dev) {
                for index in self.netdev_attachments(&dev, &port) {
                    match self.netdev_name_at(&dev, &port, &index) {
                        Ok(name) if name == netdev => return Ok(dev),
                        Ok(_) => {}
                        Err(e) => log::debug!("rdmamap: skipping gid index: {}", e),
                    }
                }
            }
        }
        Err(ResolveError::NotFound(netdev.to_owned()))
    }

    /// Find the RDMA device whose node GUID equals the EUI-64 of an IPoIB
    /// hardware address.
    ///
    /// Returns `Ok(None)` if no device matches. A device whose `node_guid`
    /// vanished after listing is skipped; any other read or parse failure
    /// aborts the scan.
    pub fn resolve_for_infiniband(&self, hw_addr: &[u8]) -> Result<Option<String>, ResolveError> {
        let eui = guid::hardware_eui(hw_addr).ok_or(ResolveError::AddressTooShort(hw_addr.len()))?;
        let eui = NodeGuid::from(eui);

        for dev in self.list_devices() {
            let node_guid = match self.node_guid(&dev) {
                Ok(node_guid) => node_guid,
                Err(e) if e.is_not_found() => {
                    log::debug!("rdmamap: {} vanished during scan", dev);
                    continue;
                }
                Err(source) => {
                    return Err(ResolveError::NodeGuid {
                        device: dev,
                        source,
                    })
                }
            };
            if node_guid == eui {
                return Ok(Some(dev));
            }
        }
        Ok(None)
    }

    /// Find the RDMA device behind a network interface, looking up the
    /// interface with a custom [`LinkResolver`].
    ///
    /// Returns `Ok(None)` only for an unmatched IPoIB interface.
    pub fn resolve_for_netdev_with(
        &self,
        links: impl LinkResolver,
        netdev: &str,
    ) -> Result<Option<String>, ResolveError> {
        let attrs = links
            .link_attrs(netdev)
            .map_err(|source| ResolveError::Link {
                netdev: netdev.to_owned(),
                source,
            })?;

        match attrs.encap {
            LinkEncap::Ether => self.resolve_for_ethernet(netdev).map(Some),
            LinkEncap::Infiniband => self.resolve_for_infiniband(&attrs.hw_addr),
            LinkEncap::Other(encap) => Err(ResolveError::UnsupportedEncap(encap)),
        }
    }

    /// Find the RDMA device behind a network interface.
    #[inline]
    pub fn resolve_for_netdev(&self, netdev: &str) -> Result<Option<String>, ResolveError> {
        self.resolve_for_netdev_with(SysfsLinks::new(self.layout()), netdev)
    }

    /// Whether a network interface is backed by an RDMA device, looking up
    /// the interface with a custom [`LinkResolver`]. Errors count as "no".
    pub fn has_rdma_device_with(&self, links: impl LinkResolver, netdev: &str) -> bool {
        matches!(
            self.resolve_for_netdev_with(links, netdev),
            Ok(Some(dev)) if !dev.is_empty()
        )
    }

    /// Whether a network interface is backed by an RDMA device.
    #[inline]
    pub fn has_rdma_device(&self, netdev: &str) -> bool {
        self.has_rdma_device_with(SysfsLinks::new(self.layout()), netdev)
    }
}
