//! Synthetic sysfs trees for unit tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::nic::RdmaMap;
use super::sysfs::SysfsLayout;

/// A throwaway directory laid out like `/sys` and `/dev`.
pub(crate) struct FakeSysfs {
    root: TempDir,
    layout: SysfsLayout,
}

impl FakeSysfs {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let layout = SysfsLayout::with_root(root.path());
        Self { root, layout }
    }

    pub fn layout(&self) -> &SysfsLayout {
        &self.layout
    }

    pub fn map(&self) -> RdmaMap {
        RdmaMap::with_layout(self.layout.clone())
    }

    pub fn file(&self, path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Create a device directory and link it into the RDMA class, the way
    /// the kernel does. Returns the class path.
    pub fn device(&self, name: &str) -> PathBuf {
        let real = self
            .root
            .path()
            .join("sys/devices/virtual/infiniband")
            .join(name);
        fs::create_dir_all(&real).unwrap();
        fs::create_dir_all(&self.layout.rdma_class_dir).unwrap();

        let link = self.layout.rdma_class_dir.join(name);
        std::os::unix::fs::symlink(&real, &link).unwrap();
        link
    }

    pub fn node_guid(&self, dev: &str, content: &str) {
        self.file(&self.layout.rdma_class_dir.join(dev).join("node_guid"), content);
    }

    pub fn ndev(&self, dev: &str, port: &str, index: &str, netdev: &str) {
        let path = self
            .layout
            .rdma_class_dir
            .join(dev)
            .join("ports")
            .join(port)
            .join("gid_attrs/ndevs")
            .join(index);
        self.file(&path, &format!("{}\n", netdev));
    }

    pub fn counter(&self, dev: &str, port: &str, dir: &str, name: &str, value: &str) {
        let path = self
            .layout
            .rdma_class_dir
            .join(dev)
            .join("ports")
            .join(port)
            .join(dir)
            .join(name);
        self.file(&path, value);
    }

    pub fn class_entry(&self, class_dir: &Path, entry: &str, ibdev: &str) {
        self.file(&class_dir.join(entry).join("ibdev"), &format!("{}\n", ibdev));
    }

    pub fn rdma_cm(&self) {
        self.file(&self.layout.rdma_cm_device, "");
    }

    pub fn pci_rdma_device(&self, pci_addr: &str, dev: &str) {
        let dir = self.layout.pci_dev_dir.join(pci_addr).join("infiniband").join(dev);
        fs::create_dir_all(dir).unwrap();
    }

    pub fn aux_rdma_device(&self, device_id: &str, dev: &str) {
        let dir = self.layout.aux_dev_dir.join(device_id).join("infiniband").join(dev);
        fs::create_dir_all(dir).unwrap();
    }

    /// Point `<dev>/device` at `target`, relative to the device directory.
    pub fn device_link(&self, dev: &str, target: &str) {
        let link = self.layout.rdma_class_dir.join(dev).join("device");
        std::os::unix::fs::symlink(target, link).unwrap();
    }
}
