//! RDMA hardware resource discovery.
//!
//! [`RdmaMap`] walks the sysfs RDMA class and the bus directories to answer
//! which devices exist, which ports and character devices they expose, and
//! which network interfaces sit on top of them. Every method re-reads the
//! filesystem; no state survives between calls.

mod chardev;
mod device;
mod port;

use std::path::{Path, PathBuf};

pub use self::chardev::*;
pub use self::device::*;
pub use self::port::*;
use super::sysfs::{self, SysfsLayout};

/// Name of the RDMA class subdirectory under a bus device directory.
pub(crate) const RDMA_CLASS_NAME: &str = "infiniband";

/// Sysfs-backed view of the RDMA devices on this host.
#[derive(Debug, Clone, Default)]
pub struct RdmaMap {
    layout: SysfsLayout,
}

impl RdmaMap {
    /// Create a map over the live system sysfs.
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// Create a map over a custom layout.
    #[inline]
    pub fn with_layout(layout: SysfsLayout) -> Self {
        Self { layout }
    }

    /// Get the layout this map reads from.
    #[inline]
    pub fn layout(&self) -> &SysfsLayout {
        &self.layout
    }

    /// Get the sysfs directory of an RDMA device.
    #[inline]
    pub(crate) fn device_dir(&self, dev_name: &str) -> PathBuf {
        self.layout.rdma_class_dir.join(dev_name)
    }

    /// List the names of all RDMA devices, in directory order.
    ///
    /// Class entries are symlinks, so only non-directory entries count.
    /// Returns an empty list if the RDMA class is absent.
    pub fn list_devices(&self) -> Vec<String> {
        sysfs::list_entries(&self.layout.rdma_class_dir)
            .into_iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.name)
            .collect()
    }

    /// List the RDMA devices attached to a bus device.
    ///
    /// `base_dir` is the bus device directory (e.g. `/sys/bus/pci/devices`)
    /// and `key` the bus-specific device id. Only directories under the
    /// device's `infiniband` subdirectory are reported.
    pub fn devices_for_bus_key(&self, base_dir: &Path, key: &str) -> Vec<String> {
        let dir = base_dir.join(key).join(RDMA_CLASS_NAME);
        sysfs::list_entries(&dir)
            .into_iter()
            .filter(|e| e.is_dir)
            .map(|e| e.name)
            .collect()
    }

    /// List the RDMA devices of a PCI device, e.g. `0000:05:00.0`.
    ///
    /// In switchdev mode there may be more than one, such as `mlx5_0` and
    /// `mlx5_10`.
    #[inline]
    pub fn devices_for_pci(&self, pci_addr: &str) -> Vec<String> {
        self.devices_for_bus_key(&self.layout.pci_dev_dir, pci_addr)
    }

    /// List the RDMA devices of an auxiliary device, e.g. `mlx5_core.sf.4`.
    #[inline]
    pub fn devices_for_aux(&self, device_id: &str) -> Vec<String> {
        self.devices_for_bus_key(&self.layout.aux_dev_dir, device_id)
    }
}
