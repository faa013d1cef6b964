use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Configuration load error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file")]
    IoError(#[from] io::Error),

    #[error("bad configuration format")]
    ParseError(#[from] toml::de::Error),

    #[error("rdmamap configuration not found")]
    MissingTable,
}

/// Locations of every sysfs and devfs path the library reads.
///
/// The default points at the live system. Tests and containerized callers
/// can relocate everything with [`SysfsLayout::with_root`] or a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SysfsLayout {
    /// One entry per RDMA device.
    pub rdma_class_dir: PathBuf,

    /// Userspace connection manager class (`ucm*` entries).
    pub ucm_class_dir: PathBuf,

    /// Management datagram class (`umad*` and `issm*` entries).
    pub umad_class_dir: PathBuf,

    /// Userspace verbs class (`uverbs*` entries).
    pub uverbs_class_dir: PathBuf,

    /// The global RDMA connection manager device.
    pub rdma_cm_device: PathBuf,

    /// Where the character device nodes live.
    pub char_dev_dir: PathBuf,

    /// PCI devices on the PCI bus.
    pub pci_dev_dir: PathBuf,

    /// Auxiliary bus devices (e.g. `mlx5_core.sf.4`).
    pub aux_dev_dir: PathBuf,

    /// Network interfaces.
    pub net_class_dir: PathBuf,
}

impl Default for SysfsLayout {
    fn default() -> Self {
        Self {
            rdma_class_dir: "/sys/class/infiniband".into(),
            ucm_class_dir: "/sys/class/infiniband_cm".into(),
            umad_class_dir: "/sys/class/infiniband_mad".into(),
            uverbs_class_dir: "/sys/class/infiniband_verbs".into(),
            rdma_cm_device: "/dev/infiniband/rdma_cm".into(),
            char_dev_dir: "/dev/infiniband".into(),
            pci_dev_dir: "/sys/bus/pci/devices".into(),
            aux_dev_dir: "/sys/bus/auxiliary/devices".into(),
            net_class_dir: "/sys/class/net".into(),
        }
    }
}

impl SysfsLayout {
    /// The system default layout relocated under `root`.
    ///
    /// `with_root("/host")` turns `/sys/class/infiniband` into
    /// `/host/sys/class/infiniband`, and so on for every path.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let rebase = |p: PathBuf| root.join(p.strip_prefix("/").unwrap_or(p.as_path()));

        let d = Self::default();
        Self {
            rdma_class_dir: rebase(d.rdma_class_dir),
            ucm_class_dir: rebase(d.ucm_class_dir),
            umad_class_dir: rebase(d.umad_class_dir),
            uverbs_class_dir: rebase(d.uverbs_class_dir),
            rdma_cm_device: rebase(d.rdma_cm_device),
            char_dev_dir: rebase(d.char_dev_dir),
            pci_dev_dir: rebase(d.pci_dev_dir),
            aux_dev_dir: rebase(d.aux_dev_dir),
            net_class_dir: rebase(d.net_class_dir),
        }
    }

    /// Parse a layout from the `[rdmamap]` table of a TOML document.
    /// Keys absent from the table keep their default value.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize)]
        struct ConfigFile {
            rdmamap: Option<SysfsLayout>,
        }

        let config: ConfigFile = toml::from_str(toml_str)?;
        config.rdmamap.ok_or(ConfigError::MissingTable)
    }

    /// Load a layout from a TOML configuration file.
    pub fn load_toml(config_file: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let toml_str = std::fs::read_to_string(config_file)?;
        Self::from_toml_str(&toml_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_root() {
        let layout = SysfsLayout::with_root("/host");
        assert_eq!(
            layout.rdma_class_dir,
            Path::new("/host/sys/class/infiniband")
        );
        assert_eq!(
            layout.rdma_cm_device,
            Path::new("/host/dev/infiniband/rdma_cm")
        );
    }

    #[test]
    fn test_partial_toml() {
        let layout = SysfsLayout::from_toml_str(
            r#"
            [rdmamap]
            pci_dev_dir = "/tmp/pci"
            "#,
        )
        .unwrap();
        assert_eq!(layout.pci_dev_dir, Path::new("/tmp/pci"));
        assert_eq!(layout.rdma_class_dir, SysfsLayout::default().rdma_class_dir);
    }

    #[test]
    fn test_missing_table() {
        let err = SysfsLayout::from_toml_str("[other]\nkey = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingTable));
    }

    #[test]
    fn test_load_toml_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rdmamap]").unwrap();
        writeln!(file, "char_dev_dir = \"/tmp/dev\"").unwrap();
        file.flush().unwrap();

        let layout = SysfsLayout::load_toml(file.path()).unwrap();
        assert_eq!(layout.char_dev_dir, Path::new("/tmp/dev"));
    }
}
