use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::RdmaMap;
use crate::rdma::sysfs;

/// Back-reference file naming the RDMA device a class entry belongs to.
const IBDEV_FILE: &str = "ibdev";

/// Expected file name of the connection manager device.
const RDMA_CM_NAME: &str = "rdma_cm";

/// Role of an RDMA character device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CharDeviceRole {
    /// Userspace connection manager (`ucmN`).
    Ucm,

    /// InfiniBand subnet management signalling (`issmN`).
    Issm,

    /// Userspace management datagrams (`umadN`).
    Umad,

    /// Userspace verbs (`uverbsN`).
    Uverbs,

    /// RDMA connection manager (`rdma_cm`). Shared by all devices.
    RdmaCm,
}

impl CharDeviceRole {
    /// Roles that belong to a single RDMA device, in lookup order.
    pub const PER_DEVICE: [Self; 4] = [Self::Ucm, Self::Issm, Self::Umad, Self::Uverbs];

    /// Get the file name prefix of this role.
    #[inline]
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Ucm => "ucm",
            Self::Issm => "issm",
            Self::Umad => "umad",
            Self::Uverbs => "uverbs",
            Self::RdmaCm => RDMA_CM_NAME,
        }
    }

    /// Whether one device of this role serves every RDMA device.
    #[inline]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::RdmaCm)
    }
}

impl fmt::Display for CharDeviceRole {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// An RDMA character device node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharDevice {
    pub role: CharDeviceRole,
    pub path: PathBuf,
}

/// Whether a class entry refers back to the given RDMA device.
fn is_dir_for_device(dev_name: &str, entry_dir: &Path) -> bool {
    match sysfs::read_line(&entry_dir.join(IBDEV_FILE)) {
        Ok(ibdev) => ibdev.trim_matches('\n') == dev_name,
        Err(e) => {
            log::debug!("rdmamap: skipping {}: {}", entry_dir.display(), e);
            false
        }
    }
}

impl RdmaMap {
    fn class_dir_of(&self, role: CharDeviceRole) -> Option<&Path> {
        let dir = match role {
            CharDeviceRole::Ucm => &self.layout.ucm_class_dir,
            CharDeviceRole::Issm | CharDeviceRole::Umad => &self.layout.umad_class_dir,
            CharDeviceRole::Uverbs => &self.layout.uverbs_class_dir,
            CharDeviceRole::RdmaCm => return None,
        };
        Some(dir.as_path())
    }

    /// Find the character device of a given role for an RDMA device.
    ///
    /// Scans the role's class directory for entries whose name contains the
    /// role prefix and whose `ibdev` file names `dev_name`. The first match
    /// wins. Global roles always yield `None` here; see
    /// [`RdmaMap::global_char_devices`].
    pub fn char_device(&self, dev_name: &str, role: CharDeviceRole) -> Option<CharDevice> {
        let class_dir = self.class_dir_of(role)?;
        sysfs::list_names(class_dir)
            .into_iter()
            .filter(|name| name.contains(role.prefix()))
            .find(|name| is_dir_for_device(dev_name, &class_dir.join(name)))
            .map(|name| CharDevice {
                role,
                path: self.layout.char_dev_dir.join(name),
            })
    }

    /// List the character devices that belong to one RDMA device.
    ///
    /// At most one device per role; roles without a match are omitted.
    pub fn device_char_devices(&self, dev_name: &str) -> Vec<CharDevice> {
        CharDeviceRole::PER_DEVICE
            .iter()
            .filter_map(|&role| self.char_device(dev_name, role))
            .collect()
    }

    /// List the character devices shared by all RDMA devices.
    ///
    /// Currently only the RDMA connection manager, reported if it exists.
    pub fn global_char_devices(&self) -> Vec<CharDevice> {
        let path = &self.layout.rdma_cm_device;
        let exists = path.symlink_metadata().is_ok();
        let named_right = path.file_name().is_some_and(|n| n == RDMA_CM_NAME);
        if exists && named_right {
            vec![CharDevice {
                role: CharDeviceRole::RdmaCm,
                path: path.clone(),
            }]
        } else {
            Vec::new()
        }
    }

    /// List every character device a process needs to use an RDMA device:
    /// its own devices followed by the global ones.
    pub fn char_devices(&self, dev_name: &str) -> Vec<CharDevice> {
        let mut devs = self.device_char_devices(dev_name);
        devs.extend(self.global_char_devices());
        devs
    }

    /// Like [`RdmaMap::char_devices`], but only the absolute paths.
    pub fn char_device_paths(&self, dev_name: &str) -> Vec<PathBuf> {
        self.char_devices(dev_name)
            .into_iter()
            .map(|d| d.path)
            .collect()
    }
}
