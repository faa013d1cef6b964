use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use super::RdmaMap;
use crate::rdma::guid::{GuidParseError, NodeGuid};
use crate::rdma::sysfs::{self, SysfsError};

const NODE_GUID_FILE: &str = "node_guid";

/// Node GUID query error type.
#[derive(Debug, Error)]
pub enum NodeGuidError {
    /// The `node_guid` file could not be read.
    #[error("cannot read node GUID")]
    Read(#[from] SysfsError),

    /// The `node_guid` file content is malformed.
    #[error("malformed node GUID")]
    Parse(#[from] GuidParseError),
}

impl NodeGuidError {
    /// Whether the device vanished before its GUID could be read.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Read(e) if e.is_not_found())
    }
}

fn pci_addr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([0-9a-f]{4}:[0-9a-f]{2}:[0-9a-f]{2}\.[0-9])").expect("invalid regex pattern")
    })
}

impl RdmaMap {
    /// Read and parse the node GUID of a device.
    pub fn node_guid(&self, dev_name: &str) -> Result<NodeGuid, NodeGuidError> {
        let path = self.device_dir(dev_name).join(NODE_GUID_FILE);
        let data = sysfs::read_file(&path)?;
        Ok(NodeGuid::parse(&String::from_utf8_lossy(&data))?)
    }

    /// Get the NUMA node of a device.
    ///
    /// Returns `None` if the device has no NUMA affinity, which the kernel
    /// reports as `-1`.
    pub fn numa_node(&self, dev_name: &str) -> Result<Option<u8>, SysfsError> {
        let path = self.device_dir(dev_name).join("device/numa_node");
        let text = sysfs::read_line(&path)?;
        match text.trim().parse::<i32>() {
            Ok(node) => Ok(u8::try_from(node).ok()),
            Err(e) => {
                log::debug!(
                    "rdmamap: invalid NUMA node {:?} in {}: {}",
                    text,
                    path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    /// Get the PCI address (e.g. `0000:05:00.0`) of the function backing a
    /// device.
    ///
    /// The `device` link of an RDMA device points into the PCI hierarchy;
    /// the last PCI address on that path is the function itself. Returns
    /// `None` for devices not on the PCI bus, such as software RDMA devices.
    pub fn pci_address(&self, dev_name: &str) -> Option<String> {
        let target = sysfs::read_link(&self.device_dir(dev_name).join("device")).ok()?;
        let target = target.to_string_lossy();
        pci_addr_regex()
            .find_iter(&target)
            .last()
            .map(|m| m.as_str().to_owned())
    }
}
